use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_database::BackendError;
use shared_models::error::AppError;

use crate::models::{CatalogError, CreateServiceRequest, Service, ServiceType};
use crate::services::CatalogService;

pub fn map_catalog_error(err: anyhow::Error) -> AppError {
    if let Some(catalog_err) = err.downcast_ref::<CatalogError>() {
        return match catalog_err {
            CatalogError::NotFound => AppError::NotFound(catalog_err.to_string()),
            _ => AppError::ValidationError(catalog_err.to_string()),
        };
    }
    if let Some(backend_err) = err.downcast_ref::<BackendError>() {
        if backend_err.is_not_found() {
            return AppError::NotFound(backend_err.message_or("Service not found"));
        }
        return AppError::ExternalService(backend_err.to_string());
    }
    AppError::Internal(err.to_string())
}

#[axum::debug_handler]
pub async fn list_services(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Vec<Service>>, AppError> {
    let service = CatalogService::new(&config);

    let services = service.list_services()
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(services))
}

#[axum::debug_handler]
pub async fn list_individual_services(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Vec<Service>>, AppError> {
    let service = CatalogService::new(&config);

    let services = service.list_by_type(ServiceType::Individual)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(services))
}

#[axum::debug_handler]
pub async fn list_group_services(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Vec<Service>>, AppError> {
    let service = CatalogService::new(&config);

    let services = service.list_by_type(ServiceType::Group)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(services))
}

#[axum::debug_handler]
pub async fn create_service(
    State(config): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(request): Json<CreateServiceRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&config);
    let token = auth.as_ref().map(|TypedHeader(a)| a.token());

    let created = service.create_service(request, token)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(json!({
        "success": true,
        "service": created,
        "message": "Servicio agregado exitosamente."
    })))
}

#[axum::debug_handler]
pub async fn delete_service(
    State(config): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(service_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&config);
    let token = auth.as_ref().map(|TypedHeader(a)| a.token());

    service.delete_service(&service_id, token)
        .await
        .map_err(map_catalog_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Servicio eliminado exitosamente."
    })))
}
