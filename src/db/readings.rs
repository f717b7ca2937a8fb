//! Queries against the append-only `readings` relation.
//!
//! Every read takes `now` explicitly so windows are a pure function of the
//! store contents and the caller's clock. Window bounds are inclusive.

use chrono::{DateTime, FixedOffset, Utc};
use sqlx::PgPool;

use super::models::{LatestReading, MoistureSample, NewReading, RainSample, Reading};
use crate::aggregate::{self, DailyRain, MoistureBucket};

/// Append one reading stamped with `recorded_at`.
pub async fn insert(
    pool: &PgPool,
    reading: &NewReading,
    recorded_at: DateTime<Utc>,
) -> Result<Reading, sqlx::Error> {
    sqlx::query_as::<_, Reading>(
        r#"
        INSERT INTO readings
            (soil_moisture, soil_state, rain_intensity, rain_volume_mm, recorded_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, soil_moisture, soil_state, rain_intensity, rain_volume_mm, recorded_at
        "#,
    )
    .bind(reading.soil_moisture)
    .bind(&reading.soil_state)
    .bind(&reading.rain_intensity)
    .bind(reading.rain_volume_mm)
    .bind(recorded_at)
    .fetch_one(pool)
    .await
}

/// Most recent reading plus the rain summed over the trailing 24h.
///
/// Returns `None` only when the store is empty. The sum is rounded to one
/// decimal place; an empty window sums to `0.0`.
pub async fn latest(pool: &PgPool, now: DateTime<Utc>) -> Result<Option<LatestReading>, sqlx::Error> {
    sqlx::query_as::<_, LatestReading>(
        r#"
        SELECT r.soil_moisture,
               r.soil_state,
               r.rain_intensity,
               r.rain_volume_mm,
               r.recorded_at,
               (SELECT COALESCE(SUM(w.rain_volume_mm), 0)::DOUBLE PRECISION
                FROM readings w
                WHERE w.recorded_at >= $1
                  AND w.recorded_at <= $2) AS rain_volume_24h
        FROM readings r
        ORDER BY r.recorded_at DESC
        LIMIT 1
        "#,
    )
    .bind(aggregate::day_window_start(now))
    .bind(now)
    .fetch_optional(pool)
    .await
    .map(|latest| {
        latest.map(|r| LatestReading {
            rain_volume_24h: aggregate::round_rain(r.rain_volume_24h),
            ..r
        })
    })
}

/// Rain per ISO weekday over the trailing 7 days.
pub async fn weekly_rain(
    pool: &PgPool,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<Vec<DailyRain>, sqlx::Error> {
    let samples = sqlx::query_as::<_, RainSample>(
        r#"
        SELECT recorded_at, rain_volume_mm
        FROM readings
        WHERE recorded_at >= $1
          AND recorded_at <= $2
        ORDER BY recorded_at ASC
        "#,
    )
    .bind(aggregate::week_window_start(now))
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(aggregate::weekly_rain(&samples, offset))
}

/// Average moisture per 4-hour bucket over the trailing 24h.
pub async fn moisture_history(
    pool: &PgPool,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Result<Vec<MoistureBucket>, sqlx::Error> {
    let samples = sqlx::query_as::<_, MoistureSample>(
        r#"
        SELECT recorded_at, soil_moisture
        FROM readings
        WHERE recorded_at >= $1
          AND recorded_at <= $2
        ORDER BY recorded_at ASC
        "#,
    )
    .bind(aggregate::day_window_start(now))
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(aggregate::moisture_history(&samples, offset))
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeDelta, TimeZone, Utc, Weekday};

    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    /// 2024-05-15 (a Wednesday) at 13:30 UTC.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 13, 30, 0).unwrap()
    }

    fn sample(moisture: f64, rain: f64) -> NewReading {
        NewReading {
            soil_moisture: moisture,
            soil_state: "moist".into(),
            rain_intensity: "light".into(),
            rain_volume_mm: rain,
        }
    }

    async fn count(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM readings")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // insert
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn insert_returns_stored_row(pool: PgPool) {
        let stored = insert(&pool, &sample(41.5, 0.2), now()).await.unwrap();
        assert_eq!(stored.soil_moisture, 41.5);
        assert_eq!(stored.soil_state, "moist");
        assert_eq!(stored.rain_intensity, "light");
        assert_eq!(stored.rain_volume_mm, 0.2);
        assert_eq!(stored.recorded_at, now());
        assert_eq!(count(&pool).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn identical_inserts_create_distinct_rows(pool: PgPool) {
        let a = insert(&pool, &sample(40.0, 1.0), now()).await.unwrap();
        let b = insert(&pool, &sample(40.0, 1.0), now()).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(count(&pool).await, 2);

        let latest = latest(&pool, now()).await.unwrap().unwrap();
        assert_eq!(latest.rain_volume_24h, 2.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn rows_cannot_be_updated_or_deleted(pool: PgPool) {
        insert(&pool, &sample(40.0, 1.0), now()).await.unwrap();

        let update = sqlx::query("UPDATE readings SET soil_moisture = 0")
            .execute(&pool)
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM readings").execute(&pool).await;
        assert!(delete.is_err());

        assert_eq!(count(&pool).await, 1);
    }

    // -----------------------------------------------------------------------
    // latest
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn latest_on_empty_store_is_none(pool: PgPool) {
        assert!(latest(&pool, now()).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn latest_picks_most_recent_and_sums_window(pool: PgPool) {
        insert(&pool, &sample(40.0, 0.0), now() - TimeDelta::hours(2)).await.unwrap();
        insert(&pool, &sample(45.0, 2.5), now() - TimeDelta::hours(1)).await.unwrap();

        let got = latest(&pool, now()).await.unwrap().unwrap();
        assert_eq!(got.soil_moisture, 45.0);
        assert_eq!(got.rain_volume_24h, 2.5);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn latest_window_includes_exact_boundary(pool: PgPool) {
        let boundary = now() - TimeDelta::hours(24);
        insert(&pool, &sample(30.0, 1.5), boundary).await.unwrap();
        insert(&pool, &sample(30.0, 4.0), boundary - TimeDelta::seconds(1)).await.unwrap();

        let got = latest(&pool, now()).await.unwrap().unwrap();
        assert_eq!(got.rain_volume_24h, 1.5);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn latest_with_empty_window_sums_to_zero(pool: PgPool) {
        insert(&pool, &sample(33.0, 7.0), now() - TimeDelta::days(3)).await.unwrap();

        let got = latest(&pool, now()).await.unwrap().unwrap();
        assert_eq!(got.soil_moisture, 33.0);
        assert_eq!(got.rain_volume_24h, 0.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn latest_rounds_rolling_rain_to_one_decimal(pool: PgPool) {
        insert(&pool, &sample(40.0, 0.1), now() - TimeDelta::hours(3)).await.unwrap();
        insert(&pool, &sample(40.0, 0.2), now() - TimeDelta::hours(2)).await.unwrap();
        insert(&pool, &sample(40.0, 1.04), now() - TimeDelta::hours(1)).await.unwrap();

        let got = latest(&pool, now()).await.unwrap().unwrap();
        assert_eq!(got.rain_volume_24h, 1.3);
    }

    // -----------------------------------------------------------------------
    // weekly_rain
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn weekly_rain_on_empty_store_is_empty(pool: PgPool) {
        assert!(weekly_rain(&pool, now(), utc()).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn weekly_rain_groups_window_by_weekday(pool: PgPool) {
        // Tuesday
        insert(&pool, &sample(40.0, 1.25), now() - TimeDelta::days(1)).await.unwrap();
        insert(&pool, &sample(40.0, 0.5), now() - TimeDelta::hours(25)).await.unwrap();
        // Sunday
        insert(&pool, &sample(40.0, 3.0), now() - TimeDelta::days(3)).await.unwrap();
        // Wednesday a week ago, exactly on the boundary
        insert(&pool, &sample(40.0, 0.4), now() - TimeDelta::days(7)).await.unwrap();
        // Outside the window
        insert(&pool, &sample(40.0, 9.0), now() - TimeDelta::days(8)).await.unwrap();

        let got = weekly_rain(&pool, now(), utc()).await.unwrap();
        let days: Vec<_> = got.iter().map(|d| (d.weekday, d.total_mm)).collect();
        assert_eq!(
            days,
            vec![(Weekday::Tue, 1.8), (Weekday::Wed, 0.4), (Weekday::Sun, 3.0)]
        );
    }

    // -----------------------------------------------------------------------
    // moisture_history
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn moisture_history_on_empty_store_is_empty(pool: PgPool) {
        assert!(moisture_history(&pool, now(), utc()).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn moisture_history_buckets_trailing_day(pool: PgPool) {
        let at = |h, m| Utc.with_ymd_and_hms(2024, 5, 15, h, m, 0).unwrap();
        insert(&pool, &sample(40.0, 0.0), at(12, 5)).await.unwrap();
        insert(&pool, &sample(46.0, 0.0), at(13, 10)).await.unwrap();
        insert(&pool, &sample(30.0, 0.0), at(9, 59)).await.unwrap();
        // Yesterday 15:00 is inside the window and shares the 12:00 bucket.
        insert(&pool, &sample(52.0, 0.0), at(15, 0) - TimeDelta::days(1)).await.unwrap();
        // Yesterday 10:00 is outside the window.
        insert(&pool, &sample(99.0, 0.0), at(10, 0) - TimeDelta::days(1)).await.unwrap();

        let got = moisture_history(&pool, now(), utc()).await.unwrap();
        let buckets: Vec<_> = got.iter().map(|b| (b.label(), b.average)).collect();
        assert_eq!(
            buckets,
            vec![("08:00".to_owned(), 30), ("12:00".to_owned(), 46)]
        );
    }
}
