//! Health and readiness probes. Both are public.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::AppState;
use crate::domain::timestamp_now;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct HealthReadinessChecks {
    pub database: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReadyResponse {
    pub ready: bool,
    pub uptime_seconds: u64,
    pub version: &'static str,
    pub checks: HealthReadinessChecks,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Reelhub API is running",
        timestamp: timestamp_now(),
    })
}

/// GET /health/ready
/// 503 until the database answers
pub async fn ready(State(state): State<Arc<AppState>>) -> Response {
    let database = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database readiness check failed");
            false
        }
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthReadyResponse {
            ready: database,
            uptime_seconds: state.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION"),
            checks: HealthReadinessChecks { database },
        }),
    )
        .into_response()
}
