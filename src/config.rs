use std::time::Duration;

use anyhow::{Context, Result};
use chrono::FixedOffset;

// ---------------------------------------------------------------------------
// Server config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL. Hosted databases need `?sslmode=require` appended.
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    /// Offset applied before grouping readings by weekday or hour-of-day.
    /// Format: `"+HH:MM"` / `"-HH:MM"` (e.g. `"-03:00"`).
    pub report_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "3000")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            db_max_connections: optional("DB_MAX_CONNECTIONS", "10")
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            report_offset: parse_offset(&optional("REPORT_UTC_OFFSET", "+00:00"))?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

// ---------------------------------------------------------------------------
// Dashboard config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the telemetry API, without a trailing slash.
    pub api_url: String,
    /// Refresh interval for the latest-reading card.
    pub latest_interval: Duration,
    /// Refresh interval for the weekly rain and moisture history charts.
    pub chart_interval: Duration,
    /// Offset used when printing reading times.
    pub display_offset: FixedOffset,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_url: optional("DASHBOARD_API_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_owned(),
            latest_interval: parse_interval("LATEST_POLL_SECS", &optional("LATEST_POLL_SECS", "60"))?,
            chart_interval: parse_interval("CHART_POLL_SECS", &optional("CHART_POLL_SECS", "300"))?,
            display_offset: parse_offset(&optional("REPORT_UTC_OFFSET", "+00:00"))?,
        })
    }
}

/// Parse a fixed UTC offset such as `"+00:00"` or `"-03:00"`.
fn parse_offset(raw: &str) -> Result<FixedOffset> {
    raw.trim()
        .parse::<FixedOffset>()
        .with_context(|| format!("REPORT_UTC_OFFSET must look like '+HH:MM', got: {raw:?}"))
}

/// Parse a polling interval in whole seconds. Zero is rejected because
/// `tokio::time::interval` panics on a zero period.
fn parse_interval(key: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a positive integer"))?;
    if secs == 0 {
        anyhow::bail!("{key} must be a positive integer");
    }
    Ok(Duration::from_secs(secs))
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required env var: {key}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_offset_utc() {
        assert_eq!(parse_offset("+00:00").unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn parse_offset_negative() {
        assert_eq!(parse_offset("-03:00").unwrap().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn parse_offset_garbage_errors() {
        let err = parse_offset("brasilia").unwrap_err();
        assert!(err.to_string().contains("REPORT_UTC_OFFSET"));
    }

    #[test]
    fn parse_interval_seconds() {
        assert_eq!(parse_interval("X", "60").unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn parse_interval_zero_errors() {
        let err = parse_interval("LATEST_POLL_SECS", "0").unwrap_err();
        assert!(err.to_string().contains("LATEST_POLL_SECS"));
    }

    #[test]
    fn parse_interval_not_a_number_errors() {
        assert!(parse_interval("CHART_POLL_SECS", "five").is_err());
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = Config {
            database_url: "postgres://localhost/soil".into(),
            server_host: "127.0.0.1".into(),
            server_port: 3000,
            db_max_connections: 10,
            report_offset: FixedOffset::east_opt(0).unwrap(),
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }
}
