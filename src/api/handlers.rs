use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use utoipa::OpenApi;

use super::{
    dto::{
        IngestReadingRequest, IngestReadingResponse, LatestReadingDto, MoistureBucketDto,
        ServiceInfo, WeeklyRainDto,
    },
    errors::ApiError,
    AppState,
};
use crate::db::readings;

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Store one sample from the field device.
///
/// Every accepted call appends a new row stamped with the server clock;
/// duplicates are not detected.
#[utoipa::path(
    post,
    path = "/readings",
    request_body = IngestReadingRequest,
    responses(
        (status = 201, description = "Reading stored", body = IngestReadingResponse),
        (status = 400, description = "Missing or malformed field"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn ingest_reading(
    State(state): State<AppState>,
    payload: Result<Json<IngestReadingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestReadingResponse>), ApiError> {
    let reading = payload
        .map_err(ApiError::from)
        .and_then(|Json(body)| body.validate())
        .inspect_err(|e| warn!(error = %e, "Rejected reading"))?;

    let stored = readings::insert(&state.pool, &reading, Utc::now()).await?;

    info!(
        reading_id = %stored.id,
        soil_moisture = stored.soil_moisture,
        soil_state = %stored.soil_state,
        rain_intensity = %stored.rain_intensity,
        rain_volume_mm = stored.rain_volume_mm,
        "Reading stored"
    );
    Ok((StatusCode::CREATED, Json(stored.into())))
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Most recent reading plus the rain that fell over the trailing 24 hours.
#[utoipa::path(
    get,
    path = "/readings/latest",
    responses(
        (status = 200, description = "Latest reading with rolling rain", body = LatestReadingDto),
        (status = 404, description = "No reading recorded yet"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn get_latest_reading(
    State(state): State<AppState>,
) -> Result<Json<LatestReadingDto>, ApiError> {
    let latest = readings::latest(&state.pool, Utc::now())
        .await?
        .ok_or(ApiError::NotFound("no readings recorded yet"))?;

    Ok(Json(latest.into()))
}

/// Rain per weekday over the trailing 7 days. Weekdays without readings are
/// omitted; results are ordered Monday first.
#[utoipa::path(
    get,
    path = "/readings/weekly-rain",
    responses(
        (status = 200, description = "Rain totals per weekday", body = Vec<WeeklyRainDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn get_weekly_rain(
    State(state): State<AppState>,
) -> Result<Json<Vec<WeeklyRainDto>>, ApiError> {
    let days = readings::weekly_rain(&state.pool, Utc::now(), state.report_offset).await?;
    Ok(Json(days.into_iter().map(Into::into).collect()))
}

/// Average soil moisture per 4-hour bucket over the trailing 24 hours.
#[utoipa::path(
    get,
    path = "/readings/moisture-history",
    responses(
        (status = 200, description = "Moisture averages per bucket", body = Vec<MoistureBucketDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn get_moisture_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<MoistureBucketDto>>, ApiError> {
    let buckets = readings::moisture_history(&state.pool, Utc::now(), state.report_offset).await?;
    Ok(Json(buckets.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Service identity / health
// ---------------------------------------------------------------------------

/// Identifies the service.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service identity", body = ServiceInfo),
    ),
    tag = "system"
)]
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: env!("CARGO_PKG_NAME").to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        status: "ok".to_owned(),
    })
}

/// Liveness plus a round trip to the store. Reports `503` with
/// `{"status":"degraded"}` when the database cannot be reached.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and store reachable"),
        (status = 503, description = "Store unreachable"),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok", "store": "ok" }))),
        Err(e) => {
            warn!(error = %e, "Health check could not reach the store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "store": "unreachable" })),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        ingest_reading,
        get_latest_reading,
        get_weekly_rain,
        get_moisture_history,
        service_info,
        health,
    ),
    components(schemas(
        IngestReadingRequest,
        IngestReadingResponse,
        LatestReadingDto,
        WeeklyRainDto,
        MoistureBucketDto,
        ServiceInfo,
    )),
    tags(
        (name = "readings", description = "Soil and rain telemetry"),
        (name = "system",   description = "System endpoints"),
    ),
    info(
        title = "Soil Telemetry API",
        version = "0.1.0",
        description = "Ingests soil moisture and rainfall samples and serves dashboard aggregates"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
