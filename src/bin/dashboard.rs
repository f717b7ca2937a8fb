//! Polls the telemetry API and prints the dashboard panels as they refresh.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use soil_telemetry::{config::DashboardConfig, dashboard};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let config = DashboardConfig::from_env()?;
    dashboard::run(config).await
}
