//! Catalog request handlers.
//!
//! Thin adapters between HTTP and the catalog engines: they default the
//! query parameters, validate bodies and shape the engine results.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::api::doc::SERVICE_TAG;
use crate::api::dto::{
    CreateServiceRequest, CreateVersionRequest, ErrorResponse, ListServicesParams,
    MessageResponse, PageParams, ServiceDetailResponse, ServiceListResponse, UpdateServiceRequest,
};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::ValidatedJson;

/// Creates catalog routes.
///
/// Routes:
/// - GET    /services                                    - List services
/// - GET    /services/{serviceName}                      - Service with versions
/// - POST   /service                                     - Create a service
/// - PATCH  /service                                     - Update a service
/// - POST   /service/version                             - Create a version
/// - DELETE /service/{serviceName}                       - Delete a service
/// - DELETE /service/{serviceName}/version/{versionName} - Delete a version
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services))
        .route("/services/{serviceName}", get(get_service))
        .route("/service", post(create_service).patch(update_service))
        .route("/service/version", post(create_version))
        .route("/service/{serviceName}", delete(delete_service))
        .route(
            "/service/{serviceName}/version/{versionName}",
            delete(delete_version),
        )
}

/// GET /v1/services - List live services
#[utoipa::path(
    get,
    path = "/v1/services",
    params(ListServicesParams),
    responses(
        (status = 200, description = "One page of services", body = ServiceListResponse),
        (status = 400, description = "Page beyond the last page", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = SERVICE_TAG
)]
pub async fn list_services(
    State(state): State<AppState>,
    Query(params): Query<ListServicesParams>,
) -> Result<Json<ServiceListResponse>, AppError> {
    let page = state
        .services
        .query
        .list_services(params.page(), params.sort(), &params.filter())
        .await?;
    Ok(Json(ServiceListResponse::from(page)))
}

/// GET /v1/services/{serviceName} - Service with one page of its versions
#[utoipa::path(
    get,
    path = "/v1/services/{serviceName}",
    params(
        ("serviceName" = String, Path, description = "Service name"),
        PageParams
    ),
    responses(
        (status = 200, description = "Service and versions", body = ServiceDetailResponse),
        (status = 404, description = "Service not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = SERVICE_TAG
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(service_name): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<ServiceDetailResponse>, AppError> {
    let page = state
        .services
        .query
        .get_service_with_versions(params.page(), &service_name)
        .await?;
    Ok(Json(ServiceDetailResponse::from(page)))
}

/// POST /v1/service - Create a service
#[utoipa::path(
    post,
    path = "/v1/service",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = MessageResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Store failure, including a taken name", body = ErrorResponse)
    ),
    tag = SERVICE_TAG
)]
pub async fn create_service(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateServiceRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state
        .services
        .mutation
        .create_service(&payload.name, payload.description.as_deref().unwrap_or_default())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Service Created Successfully")),
    ))
}

/// POST /v1/service/version - Add a version to a service
#[utoipa::path(
    post,
    path = "/v1/service/version",
    request_body = CreateVersionRequest,
    responses(
        (status = 201, description = "Version created", body = MessageResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "Service not found", body = ErrorResponse),
        (status = 409, description = "Version already exists", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = SERVICE_TAG
)]
pub async fn create_version(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateVersionRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state
        .services
        .mutation
        .create_version(
            &payload.service_name,
            &payload.name,
            payload.description.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Version Created Successfully")),
    ))
}

/// PATCH /v1/service - Partially update a service
#[utoipa::path(
    patch,
    path = "/v1/service",
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Update accepted", body = MessageResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "Service not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = SERVICE_TAG
)]
pub async fn update_service(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateServiceRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (id, changes) = payload.into_changes();
    state.services.mutation.update_service(id, changes).await?;
    Ok(Json(MessageResponse::new("Accepted")))
}

/// DELETE /v1/service/{serviceName} - Delete a service and its versions
#[utoipa::path(
    delete,
    path = "/v1/service/{serviceName}",
    params(("serviceName" = String, Path, description = "Service name")),
    responses(
        (status = 200, description = "Service deleted", body = MessageResponse),
        (status = 404, description = "Service not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = SERVICE_TAG
)]
pub async fn delete_service(
    State(state): State<AppState>,
    Path(service_name): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.services.mutation.delete_service(&service_name).await?;
    Ok(Json(MessageResponse::new("Service Deleted Successfully")))
}

/// DELETE /v1/service/{serviceName}/version/{versionName} - Delete a version
#[utoipa::path(
    delete,
    path = "/v1/service/{serviceName}/version/{versionName}",
    params(
        ("serviceName" = String, Path, description = "Service name"),
        ("versionName" = String, Path, description = "Version name")
    ),
    responses(
        (status = 200, description = "Version deleted", body = MessageResponse),
        (status = 404, description = "Service or version not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = SERVICE_TAG
)]
pub async fn delete_version(
    State(state): State<AppState>,
    Path((service_name, version_name)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .services
        .mutation
        .delete_version(&service_name, &version_name)
        .await?;
    Ok(Json(MessageResponse::new(
        "Service Version Deleted Successfully",
    )))
}
