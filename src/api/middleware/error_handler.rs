//! Error handler for converting AppError to HTTP responses.
//!
//! Maps every catalog outcome to a status code and a structured
//! `ErrorResponse`. Store failures are logged here and reported to the
//! client without their underlying cause.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::ErrorResponse;
use crate::error::AppError;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        let code = error_to_code(&self);

        let error_response = match &self {
            AppError::ServiceNotFound { .. } | AppError::VersionNotFound { .. } => {
                ErrorResponse::new(code, self.to_string())
            }
            AppError::InvalidPage { page, total_pages } => {
                ErrorResponse::new(code, self.to_string()).with_details(json!({
                    "page": page,
                    "total_pages": total_pages,
                }))
            }
            AppError::DuplicateVersion { service, version } => {
                ErrorResponse::new(code, self.to_string()).with_details(json!({
                    "service": service,
                    "version": version,
                }))
            }
            AppError::Validation { field, reason } => {
                ErrorResponse::new(code, format!("Validation failed for {}", field)).with_details(
                    json!({
                        "field": field,
                        "reason": reason,
                    }),
                )
            }
            AppError::BadRequest { message } => ErrorResponse::new(code, message.as_str()),
            AppError::StoreFailure { operation, source } => {
                tracing::error!(operation = %operation, error = ?source, "Store operation failed");
                ErrorResponse::new(code, format!("Store operation failed: {}", operation))
            }
            AppError::Configuration { key, source } => {
                tracing::error!(key = %key, error = ?source, "Configuration error");
                ErrorResponse::new(code, format!("Configuration error: {}", key))
            }
            AppError::Internal { source } => {
                tracing::error!(error = ?source, "Internal error");
                ErrorResponse::new(code, "An internal error occurred")
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match &rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON body: {}", err.body_text()),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err.body_text()),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing or invalid Content-Type header, expected application/json".to_string()
            }
            other => other.body_text(),
        };
        AppError::BadRequest { message }
    }
}

/// Maps an AppError variant to its HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::ServiceNotFound { .. } => StatusCode::NOT_FOUND,
        AppError::VersionNotFound { .. } => StatusCode::NOT_FOUND,
        AppError::InvalidPage { .. } => StatusCode::BAD_REQUEST,
        AppError::DuplicateVersion { .. } => StatusCode::CONFLICT,
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::StoreFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::ServiceNotFound { .. } => "SERVICE_NOT_FOUND",
        AppError::VersionNotFound { .. } => "VERSION_NOT_FOUND",
        AppError::InvalidPage { .. } => "INVALID_PAGE",
        AppError::DuplicateVersion { .. } => "DUPLICATE_VERSION",
        AppError::Validation { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::StoreFailure { .. } => "STORE_ERROR",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

/// Rewrites error responses produced outside the handlers (unknown routes,
/// wrong methods, timeouts) into the standard `ErrorResponse` body.
pub async fn global_error_handler(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));
    if is_json {
        return response;
    }

    let (code, message) = match status {
        StatusCode::NOT_FOUND => ("NOT_FOUND", "The requested resource was not found"),
        StatusCode::METHOD_NOT_ALLOWED => (
            "METHOD_NOT_ALLOWED",
            "HTTP method not allowed for this endpoint",
        ),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::REQUEST_TIMEOUT => ("REQUEST_TIMEOUT", "Request timeout"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request payload too large"),
        s if s.is_server_error() => ("INTERNAL_SERVER_ERROR", "An internal server error occurred"),
        _ => ("BAD_REQUEST", "Bad request - invalid or malformed request"),
    };

    (status, Json(ErrorResponse::new(code, message))).into_response()
}
