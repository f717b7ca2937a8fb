use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One immutable sensor sample, as stored in `readings`.
#[derive(Debug, Clone, FromRow)]
pub struct Reading {
    pub id: Uuid,
    /// Percentage, nominally 0–100.
    pub soil_moisture: f64,
    pub soil_state: String,
    pub rain_intensity: String,
    /// Millimetres attributed to this sample only, not a running total.
    pub rain_volume_mm: f64,
    pub recorded_at: DateTime<Utc>,
}

/// A sample that has passed presence validation and is ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub soil_moisture: f64,
    pub soil_state: String,
    pub rain_intensity: String,
    pub rain_volume_mm: f64,
}

/// The most recent reading together with the trailing 24h rain sum.
#[derive(Debug, Clone, FromRow)]
pub struct LatestReading {
    pub soil_moisture: f64,
    pub soil_state: String,
    pub rain_intensity: String,
    pub rain_volume_mm: f64,
    pub recorded_at: DateTime<Utc>,
    /// One decimal place; `0.0` when no rows fall in the window.
    pub rain_volume_24h: f64,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct RainSample {
    pub recorded_at: DateTime<Utc>,
    pub rain_volume_mm: f64,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct MoistureSample {
    pub recorded_at: DateTime<Utc>,
    pub soil_moisture: f64,
}
