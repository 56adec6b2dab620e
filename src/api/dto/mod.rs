//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `service` - Catalog request/response DTOs
//! - `pagination` - Query-string parameters for paginated endpoints
//! - `health` - Health check responses
//! - `error` - Error and acknowledgement responses

mod error;
mod health;
mod pagination;
mod service;

pub use error::{ErrorResponse, MessageResponse};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use pagination::{ListServicesParams, PageParams};
pub use service::{
    CreateServiceRequest, CreateVersionRequest, ServiceDetailResponse, ServiceListResponse,
    ServiceResponse, ServiceVersionResponse, UpdateServiceRequest,
};
