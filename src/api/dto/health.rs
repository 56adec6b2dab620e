//! Health check DTOs for API responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response structure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "timestamp": "2024-01-01T12:00:00Z",
    "checks": {
        "store": {
            "status": "healthy",
            "message": "Connected",
            "response_time_ms": 5
        }
    }
}))]
pub struct HealthResponse {
    /// Overall health status, the worst of all component checks
    pub status: HealthStatus,
    /// Application version
    pub version: String,
    /// Time of the check (RFC 3339)
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: String,
    /// Per-component checks keyed by component name
    pub checks: BTreeMap<String, ComponentHealth>,
}

impl HealthResponse {
    pub fn new(version: &str, checks: BTreeMap<String, ComponentHealth>) -> Self {
        let status = checks
            .values()
            .map(|check| check.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);

        Self {
            status,
            version: version.to_string(),
            timestamp: jiff::Timestamp::now().to_string(),
            checks,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Health status, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Individual component health information.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: Option<u64>,
}

impl ComponentHealth {
    pub fn healthy(message: &str, response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: Some(message.to_string()),
            response_time_ms: Some(response_time_ms),
        }
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            message: Some(message),
            response_time_ms: Some(response_time_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::Unhealthy).unwrap();
        assert_eq!(json, "\"unhealthy\"");
    }

    #[test]
    fn test_overall_status_is_worst_component() {
        let mut checks = BTreeMap::new();
        checks.insert("store".to_string(), ComponentHealth::healthy("Connected", 3));
        let response = HealthResponse::new("0.1.0", checks);
        assert!(response.is_healthy());

        let mut checks = BTreeMap::new();
        checks.insert("store".to_string(), ComponentHealth::healthy("Connected", 3));
        checks.insert(
            "replica".to_string(),
            ComponentHealth::unhealthy("Connection failed: timeout".to_string(), 5000),
        );
        let response = HealthResponse::new("0.1.0", checks);
        assert_eq!(response.status, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let response = HealthResponse::new("0.1.0", BTreeMap::new());
        assert!(response.timestamp.parse::<jiff::Timestamp>().is_ok());
    }
}
