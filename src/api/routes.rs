//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use std::time::Duration;

use axum::{Router, http::StatusCode, middleware, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePath;
use tower_http::timeout::TimeoutLayer;

use crate::api::doc::openapi_json;
use crate::api::handlers;
use crate::api::middleware::{global_error_handler, logging_middleware, request_id_middleware};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added runs first):
/// 1. Request ID middleware - generates/propagates request IDs
/// 2. Logging middleware - logs requests with request IDs
/// 3. CORS
/// 4. Error normalization - turns bare error statuses into `ErrorResponse`
/// 5. Timeout - answers 408 when a handler exceeds `request_timeout`
///
/// # Routes
/// - `/v1/...` - Catalog operations
/// - `/ping`, `/health/...` - Health checks
/// - `/api-docs/openapi.json` - OpenAPI document
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/v1", handlers::services::service_routes())
        .merge(handlers::health::health_routes())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(timeout_layer(request_timeout))
        .layer(middleware::from_fn(global_error_handler))
        .layer(CorsLayer::permissive())
        // Logging runs after request_id has set the ID
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

fn timeout_layer(request_timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout)
}

/// The router wrapped so that `/v1/services/` and `/v1/services` resolve to
/// the same route.
///
/// Trailing slashes have to be trimmed before routing, which a layer added
/// on the `Router` itself cannot do.
pub fn create_app(state: AppState, request_timeout: Duration) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(create_router(state, request_timeout))
}
