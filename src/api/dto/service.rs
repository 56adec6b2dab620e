//! Catalog DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Service, ServiceChanges, ServicePage, ServiceVersionsPage, Version};

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for creating a new service.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateServiceRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    #[schema(min_length = 1, max_length = 255, example = "payments")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Payment gateway")]
    pub description: Option<String>,
}

/// Request body for adding a version to an existing service.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateVersionRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    #[schema(min_length = 1, max_length = 255, example = "v1.2.0")]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Service name must be between 1 and 255 characters"
    ))]
    #[schema(min_length = 1, max_length = 255, example = "payments")]
    pub service_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for a partial service update.
///
/// Missing or empty `name` and `description` leave the stored value as is.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateServiceRequest {
    #[schema(example = 1)]
    pub id: i32,
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateServiceRequest {
    /// Splits the request into the target id and the changeset to apply.
    pub fn into_changes(self) -> (i32, ServiceChanges) {
        (
            self.id,
            ServiceChanges::from_request(self.name, self.description),
        )
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// A service as shown in listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub version_count: i32,
    #[schema(value_type = String, format = DateTime, example = "2024-01-01T12:00:00Z")]
    pub created_at: String,
}

impl From<Service> for ServiceResponse {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            name: service.name,
            description: service.description,
            version_count: service.version_count,
            created_at: service.created_at.to_jiff().to_string(),
        }
    }
}

/// One version of a service.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceVersionResponse {
    pub name: String,
    pub description: String,
    #[schema(value_type = String, format = DateTime, example = "2024-01-01T12:00:00Z")]
    pub created_at: String,
}

impl From<Version> for ServiceVersionResponse {
    fn from(version: Version) -> Self {
        Self {
            name: version.name,
            description: version.description,
            created_at: version.created_at.to_jiff().to_string(),
        }
    }
}

/// A page of live services.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceListResponse {
    pub services: Vec<ServiceResponse>,
    #[schema(example = 2)]
    pub total_pages: i64,
    #[schema(example = 1)]
    pub current_page: i64,
    #[schema(example = 3)]
    pub total_records: i64,
}

impl From<ServicePage> for ServiceListResponse {
    fn from(page: ServicePage) -> Self {
        Self {
            services: page.services.into_iter().map(Into::into).collect(),
            total_pages: page.total_pages,
            current_page: page.current_page,
            total_records: page.total_records,
        }
    }
}

/// A live service with one page of its versions.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceDetailResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub version_count: i32,
    #[schema(value_type = String, format = DateTime, example = "2024-01-01T12:00:00Z")]
    pub created_at: String,
    pub versions: Vec<ServiceVersionResponse>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total_version_records: i64,
}

impl From<ServiceVersionsPage> for ServiceDetailResponse {
    fn from(page: ServiceVersionsPage) -> Self {
        let service = ServiceResponse::from(page.service);
        Self {
            id: service.id,
            name: service.name,
            description: service.description,
            version_count: service.version_count,
            created_at: service.created_at,
            versions: page.versions.into_iter().map(Into::into).collect(),
            total_pages: page.total_pages,
            current_page: page.current_page,
            total_version_records: page.total_version_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewService;

    fn stored_service() -> Service {
        let new = NewService::new("payments", "Payment gateway");
        Service {
            id: 7,
            name: new.name,
            description: new.description,
            version_count: 0,
            created_at: new.created_at,
            deleted_at: None,
        }
    }

    #[test]
    fn test_create_service_request_name_bounds() {
        let request: CreateServiceRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(request.validate().is_err());

        let request: CreateServiceRequest =
            serde_json::from_str(r#"{"name": "payments"}"#).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.description.is_none());

        let long = "x".repeat(256);
        let request = CreateServiceRequest {
            name: long,
            description: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_request_empty_fields_mean_unchanged() {
        let request: UpdateServiceRequest =
            serde_json::from_str(r#"{"id": 3, "name": "", "description": "new"}"#).unwrap();
        assert!(request.validate().is_ok());

        let (id, changes) = request.into_changes();
        assert_eq!(id, 3);
        assert!(changes.name.is_none());
        assert_eq!(changes.description.as_deref(), Some("new"));
    }

    #[test]
    fn test_service_response_shape() {
        let json = serde_json::to_value(ServiceResponse::from(stored_service())).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "payments");
        assert_eq!(json["version_count"], 0);
        assert!(json.get("deleted_at").is_none());

        let created_at = json["created_at"].as_str().unwrap();
        assert!(created_at.parse::<jiff::Timestamp>().is_ok());
    }

    #[test]
    fn test_detail_response_serializes_empty_versions_as_array() {
        let page = ServiceVersionsPage {
            service: stored_service(),
            versions: Vec::new(),
            total_version_records: 0,
            total_pages: 0,
            current_page: 1,
        };
        let json = serde_json::to_value(ServiceDetailResponse::from(page)).unwrap();
        assert_eq!(json["versions"], serde_json::json!([]));
        assert_eq!(json["total_version_records"], 0);
        assert_eq!(json["name"], "payments");
    }
}
