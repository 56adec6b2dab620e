use axum::Json;
use utoipa::OpenApi;

pub const SERVICE_TAG: &str = "Service";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Service Catalog",
        description = "Catalog of services and their versions",
    ),
    paths(
        crate::api::handlers::services::list_services,
        crate::api::handlers::services::get_service,
        crate::api::handlers::services::create_service,
        crate::api::handlers::services::create_version,
        crate::api::handlers::services::update_service,
        crate::api::handlers::services::delete_service,
        crate::api::handlers::services::delete_version,
        crate::api::handlers::health::ping,
        crate::api::handlers::health::health_check,
        crate::api::handlers::health::readiness_check,
        crate::api::handlers::health::liveness_check,
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::api::dto::MessageResponse,
            crate::api::dto::ServiceResponse,
            crate::api::dto::ServiceVersionResponse,
        )
    ),
    tags(
        (name = SERVICE_TAG, description = "Service and version catalog endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
