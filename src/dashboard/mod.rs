//! Terminal dashboard that polls the telemetry API.
//!
//! The latest-reading card and the two charts refresh on independent timers.
//! Each timer task owns its panel outright; nothing is shared between them.

pub mod client;
pub mod panel;
pub mod render;

use std::{future::Future, time::Duration};

use anyhow::{Context, Result};
use tokio::{
    signal,
    time::{self, MissedTickBehavior},
};
use tracing::info;

use crate::{
    api::dto::{LatestReadingDto, MoistureBucketDto, WeeklyRainDto},
    config::DashboardConfig,
};

pub use client::DashboardClient;
pub use panel::{Frame, Panel};

pub async fn run(config: DashboardConfig) -> Result<()> {
    let client = DashboardClient::new(&config.api_url);
    let offset = config.display_offset;

    info!(
        api_url = %config.api_url,
        latest_interval_secs = config.latest_interval.as_secs(),
        chart_interval_secs = config.chart_interval.as_secs(),
        "Dashboard started"
    );

    let latest = {
        let client = client.clone();
        tokio::spawn(poll(
            Panel::new("latest"),
            config.latest_interval,
            move || {
                let client = client.clone();
                async move { client.latest().await }
            },
            move |reading: &LatestReadingDto| render::latest_card(reading, offset),
        ))
    };

    let weekly_rain = {
        let client = client.clone();
        tokio::spawn(poll(
            Panel::new("weekly-rain"),
            config.chart_interval,
            move || {
                let client = client.clone();
                async move { client.weekly_rain().await }
            },
            |days: &Vec<WeeklyRainDto>| render::weekly_rain_chart(days),
        ))
    };

    let moisture_history = tokio::spawn(poll(
        Panel::new("moisture-history"),
        config.chart_interval,
        move || {
            let client = client.clone();
            async move { client.moisture_history().await }
        },
        |buckets: &Vec<MoistureBucketDto>| render::moisture_chart(buckets),
    ));

    tokio::select! {
        res = latest => res.context("latest card task stopped")?,
        res = weekly_rain => res.context("weekly rain task stopped")?,
        res = moisture_history => res.context("moisture history task stopped")?,
        res = signal::ctrl_c() => {
            res.context("failed to listen for Ctrl+C")?;
            info!("Shutdown signal received");
        }
    }

    Ok(())
}

/// Refresh `panel` every `every`, printing each newly rendered frame.
async fn poll<T, F, Fut, R>(mut panel: Panel, every: Duration, fetch: F, render: R)
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    R: Fn(&T) -> String,
{
    let name = panel.name();
    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Some(frame) = panel.apply(fetch().await, &render) {
            println!("[{name}]\n{frame}\n");
        }
    }
}
