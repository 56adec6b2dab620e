//! Health check endpoint handlers.
//!
//! Health checks round-trip to the catalog store so that load balancers
//! stop routing traffic when the database is unreachable.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{Router, extract::State, http::StatusCode, response::Json, routing::get};

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /ping` - Plain-text liveness check
/// - `GET /health` - Full health report
/// - `GET /health/ready` - Readiness probe
/// - `GET /health/live` - Liveness probe
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
}

/// Answers `pong` without touching the store.
#[utoipa::path(
    get,
    path = "/ping",
    responses(
        (status = 200, description = "Service is reachable", body = String, content_type = "text/plain")
    ),
    tag = HEALTH_TAG
)]
pub async fn ping() -> &'static str {
    "pong"
}

/// Full health report including store connectivity.
///
/// # Responses
/// - `200 OK` - Service is healthy
/// - `503 Service Unavailable` - Service is unhealthy
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = BTreeMap::new();
    checks.insert("store".to_string(), check_store(&state).await);

    let response = HealthResponse::new(crate::pkg_version(), checks);
    let status = match response.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };

    (status, Json(response))
}

/// Readiness probe endpoint.
///
/// # Responses
/// - `200 OK` - Service is ready
/// - `503 Service Unavailable` - Store is unreachable
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match check_store(&state).await.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded | HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Liveness probe endpoint. Does not test external dependencies.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_store(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let result = state.store.ping().await;
    let elapsed = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => ComponentHealth::healthy("Connected", elapsed),
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            ComponentHealth::unhealthy(e.to_string(), elapsed)
        }
    }
}
