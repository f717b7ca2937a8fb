//! Pure aggregation helpers behind the read endpoints.
//!
//! Window filtering happens in SQL; grouping, averaging and rounding happen
//! here so the bucketing rules do not depend on the store's date functions.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, TimeDelta, TimeZone, Timelike, Utc, Weekday};

use crate::db::models::{MoistureSample, RainSample};

/// Trailing window for the rolling rain sum and the moisture history.
pub const DAY_WINDOW_HOURS: i64 = 24;
/// Trailing window for the weekly rain chart.
pub const WEEK_WINDOW_DAYS: i64 = 7;
/// Width of a moisture history bucket.
pub const BUCKET_HOURS: u32 = 4;

/// Start of the trailing 24h window ending at `now`. Inclusive.
pub fn day_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - TimeDelta::hours(DAY_WINDOW_HOURS)
}

/// Start of the trailing 7 day window ending at `now`. Inclusive.
pub fn week_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - TimeDelta::days(WEEK_WINDOW_DAYS)
}

/// Truncate `ts` to the start of its 4-hour bucket: drop minutes and below,
/// then step back to the nearest hour-of-day divisible by [`BUCKET_HOURS`].
///
/// `13:47:12` → `12:00:00`, `15:00:00` → `12:00:00`, `16:00:00` → `16:00:00`.
pub fn bucket_start<Tz: TimeZone>(ts: DateTime<Tz>) -> DateTime<Tz> {
    let into_bucket = TimeDelta::hours(i64::from(ts.hour() % BUCKET_HOURS))
        + TimeDelta::minutes(i64::from(ts.minute()))
        + TimeDelta::seconds(i64::from(ts.second()))
        + TimeDelta::nanoseconds(i64::from(ts.nanosecond()));
    ts - into_bucket
}

/// Round a rain figure to one decimal place.
pub fn round_rain(mm: f64) -> f64 {
    (mm * 10.0).round() / 10.0
}

/// Round a moisture average to a whole percentage.
pub fn round_moisture(pct: f64) -> i64 {
    pct.round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRain {
    pub weekday: Weekday,
    /// Rounded to one decimal place.
    pub total_mm: f64,
}

/// Sum rain per ISO weekday in `offset`.
///
/// Only weekdays with at least one sample appear. The result is ordered
/// Monday first and never holds more than seven entries.
pub fn weekly_rain(samples: &[RainSample], offset: FixedOffset) -> Vec<DailyRain> {
    let mut by_day: BTreeMap<u32, (Weekday, f64)> = BTreeMap::new();
    for s in samples {
        let weekday = s.recorded_at.with_timezone(&offset).weekday();
        by_day
            .entry(weekday.number_from_monday())
            .or_insert((weekday, 0.0))
            .1 += s.rain_volume_mm;
    }

    by_day
        .into_values()
        .map(|(weekday, total)| DailyRain {
            weekday,
            total_mm: round_rain(total),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoistureBucket {
    /// Hour-of-day the bucket starts at; always a multiple of [`BUCKET_HOURS`].
    pub start_hour: u32,
    /// Mean soil moisture, rounded to a whole percentage.
    pub average: i64,
}

impl MoistureBucket {
    /// `"HH:MM"` label of the bucket start, e.g. `"12:00"`.
    pub fn label(&self) -> String {
        format!("{:02}:00", self.start_hour)
    }
}

/// Average moisture per 4-hour bucket of the day in `offset`.
///
/// Buckets are keyed by start hour-of-day, so a 24h window yields at most
/// six of them. Empty buckets are omitted. Ordered by start hour.
pub fn moisture_history(samples: &[MoistureSample], offset: FixedOffset) -> Vec<MoistureBucket> {
    let mut by_bucket: BTreeMap<u32, (f64, u32)> = BTreeMap::new();
    for s in samples {
        let start = bucket_start(s.recorded_at.with_timezone(&offset));
        let acc = by_bucket.entry(start.hour()).or_insert((0.0, 0));
        acc.0 += s.soil_moisture;
        acc.1 += 1;
    }

    by_bucket
        .into_iter()
        .map(|(start_hour, (sum, count))| MoistureBucket {
            start_hour,
            average: round_moisture(sum / f64::from(count)),
        })
        .collect()
}
