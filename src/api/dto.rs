use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::ApiError;
use crate::{
    aggregate::{DailyRain, MoistureBucket},
    db::models::{LatestReading, NewReading, Reading},
};

/// Request body for `POST /readings`, as sent by the field device.
///
/// Fields are optional at the type level so a missing one is reported by
/// name instead of as a generic deserialisation failure.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct IngestReadingRequest {
    /// Soil moisture percentage.
    pub moisture: Option<f64>,
    /// Soil condition label, e.g. `"dry"`.
    pub soil_state: Option<String>,
    /// Rain intensity label, e.g. `"light"`.
    pub rain_intensity: Option<String>,
    /// Millimetres of rain since the previous sample.
    pub rain_volume: Option<f64>,
}

impl IngestReadingRequest {
    /// Check that every field is present. Fails on the first absent one.
    pub fn validate(self) -> Result<NewReading, ApiError> {
        Ok(NewReading {
            soil_moisture: self.moisture.ok_or(ApiError::MissingField("moisture"))?,
            soil_state: self.soil_state.ok_or(ApiError::MissingField("soil_state"))?,
            rain_intensity: self
                .rain_intensity
                .ok_or(ApiError::MissingField("rain_intensity"))?,
            rain_volume_mm: self.rain_volume.ok_or(ApiError::MissingField("rain_volume"))?,
        })
    }
}

/// Response for `POST /readings`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestReadingResponse {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub message: String,
}

impl From<Reading> for IngestReadingResponse {
    fn from(r: Reading) -> Self {
        Self {
            id: r.id,
            recorded_at: r.recorded_at,
            message: "reading stored".to_owned(),
        }
    }
}

/// Response for `GET /readings/latest`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LatestReadingDto {
    pub soil_moisture: f64,
    pub soil_state: String,
    pub rain_intensity: String,
    /// Rain attributed to this sample alone.
    pub rain_volume_mm: f64,
    /// Rain summed over the trailing 24 hours, one decimal place.
    /// `0.0` when nothing fell in the window.
    pub rain_volume_24h: f64,
    pub recorded_at: DateTime<Utc>,
}

impl From<LatestReading> for LatestReadingDto {
    fn from(r: LatestReading) -> Self {
        Self {
            soil_moisture: r.soil_moisture,
            soil_state: r.soil_state,
            rain_intensity: r.rain_intensity,
            rain_volume_mm: r.rain_volume_mm,
            rain_volume_24h: r.rain_volume_24h,
            recorded_at: r.recorded_at,
        }
    }
}

/// One element of `GET /readings/weekly-rain`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeeklyRainDto {
    /// ISO weekday index: 1 = Monday … 7 = Sunday.
    pub weekday: u32,
    /// English short day name, e.g. `"Mon"`.
    pub day_label: String,
    /// Millimetres, one decimal place.
    pub rain_total: f64,
}

impl From<DailyRain> for WeeklyRainDto {
    fn from(d: DailyRain) -> Self {
        Self {
            weekday: d.weekday.number_from_monday(),
            day_label: d.weekday.to_string(),
            rain_total: d.total_mm,
        }
    }
}

/// One element of `GET /readings/moisture-history`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MoistureBucketDto {
    /// Bucket start as `"HH:MM"`.
    pub bucket_label: String,
    /// Mean soil moisture, whole percent.
    pub moisture_avg: i64,
}

impl From<MoistureBucket> for MoistureBucketDto {
    fn from(b: MoistureBucket) -> Self {
        Self {
            bucket_label: b.label(),
            moisture_avg: b.average,
        }
    }
}

/// Response for `GET /`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
}
