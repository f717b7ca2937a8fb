//! Plain-text rendering of the dashboard panels.

use std::fmt::Write;

use chrono::FixedOffset;

use crate::api::dto::{LatestReadingDto, MoistureBucketDto, WeeklyRainDto};

const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const BAR_WIDTH: usize = 30;

/// Current-values card.
pub fn latest_card(reading: &LatestReadingDto, offset: FixedOffset) -> String {
    let at = reading.recorded_at.with_timezone(&offset).format("%H:%M");
    format!(
        "Soil moisture   {} %\n\
         Rain (24 h)     {:.1} mm\n\
         Soil state      {}\n\
         Rain intensity  {}\n\
         Last reading    {at}",
        reading.soil_moisture, reading.rain_volume_24h, reading.soil_state, reading.rain_intensity,
    )
}

/// Bar chart of rain per weekday, Monday through Sunday. Days missing from
/// the response are drawn as zero.
pub fn weekly_rain_chart(days: &[WeeklyRainDto]) -> String {
    let totals = weekly_totals(days);
    let max = totals.iter().copied().fold(0.0, f64::max);

    let mut out = String::from("Rain, last 7 days (mm)\n");
    for (label, total) in DAY_LABELS.iter().zip(totals) {
        let _ = writeln!(out, "{label} |{:<width$} {total:.1}", bar(total, max), width = BAR_WIDTH);
    }
    out
}

/// Line of moisture averages per 4-hour bucket on a fixed 0–100 scale.
pub fn moisture_chart(buckets: &[MoistureBucketDto]) -> String {
    let mut out = String::from("Soil moisture, last 24 h (%)\n");
    if buckets.is_empty() {
        out.push_str("(no readings in the last 24 h)\n");
        return out;
    }
    for b in buckets {
        let pct = b.moisture_avg.clamp(0, 100) as f64;
        let _ = writeln!(
            out,
            "{} |{:<width$} {}",
            b.bucket_label,
            bar(pct, 100.0),
            b.moisture_avg,
            width = BAR_WIDTH,
        );
    }
    out
}

/// Expand the sparse weekly response into seven totals, Monday first.
fn weekly_totals(days: &[WeeklyRainDto]) -> [f64; 7] {
    let mut totals = [0.0; 7];
    for d in days {
        if let Some(slot) = (d.weekday as usize)
            .checked_sub(1)
            .and_then(|i| totals.get_mut(i))
        {
            *slot = d.rain_total;
        }
    }
    totals
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled.min(BAR_WIDTH))
}
