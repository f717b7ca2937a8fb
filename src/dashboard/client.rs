use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::dto::{LatestReadingDto, MoistureBucketDto, WeeklyRainDto};

/// Thin HTTP client over the telemetry API's read endpoints.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: Client,
    base_url: String,
}

impl DashboardClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// `GET /readings/latest`. An empty store is reported as an error so the
    /// caller keeps whatever it rendered before.
    pub async fn latest(&self) -> Result<LatestReadingDto> {
        self.get_json("/readings/latest").await
    }

    /// `GET /readings/weekly-rain`.
    pub async fn weekly_rain(&self) -> Result<Vec<WeeklyRainDto>> {
        self.get_json("/readings/weekly-rain").await
    }

    /// `GET /readings/moisture-history`.
    pub async fn moisture_history(&self) -> Result<Vec<MoistureBucketDto>> {
        self.get_json("/readings/moisture-history").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Polling");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        if resp.status() == StatusCode::NOT_FOUND {
            anyhow::bail!("no readings recorded yet ({url} returned 404)");
        }

        resp.error_for_status()
            .with_context(|| format!("{url} returned an error status"))?
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode response from {url}"))
    }
}
