//! System API endpoints.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ready: bool,
    pub database: bool,
    pub anime_count: Option<u64>,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

/// `GET /api/system/health`
///
/// Readiness check. Answers 503 when the database is unreachable.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = state.store().ping().await.is_ok();
    let anime_count = if database {
        state.store().count_anime().await.ok()
    } else {
        None
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthResponse {
            ready: database,
            database,
            anime_count,
            uptime_seconds: state.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION"),
        })),
    )
        .into_response()
}
