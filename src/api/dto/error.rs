//! Error and acknowledgement response DTOs.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Standard error response format.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "code": "SERVICE_NOT_FOUND",
    "message": "service not found: name=payments"
}))]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Creates a new error response with code and message.
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
            request_id: None,
        }
    }

    /// Adds structured details to the error response.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Adds request ID to the error response for correlation.
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}

/// Plain acknowledgement returned by the mutation endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({ "message": "Service Created Successfully" }))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
