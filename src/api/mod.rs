pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::FixedOffset;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use handlers::ApiDoc;

/// Shared, read-only handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Offset used for weekday and hour-of-day grouping.
    pub report_offset: FixedOffset,
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/readings", post(handlers::ingest_reading))
        .route("/readings/latest", get(handlers::get_latest_reading))
        .route("/readings/weekly-rain", get(handlers::get_weekly_rain))
        .route(
            "/readings/moisture-history",
            get(handlers::get_moisture_history),
        )
        .route("/health", get(handlers::health))
        .with_state(state)
        .split_for_parts();

    router
        .route("/", get(handlers::service_info))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        .layer(CorsLayer::permissive())
}
