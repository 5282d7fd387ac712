use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get},
};

use shared_config::AppConfig;

use crate::handlers;

pub fn catalog_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_services).post(handlers::create_service))
        .route("/individual", get(handlers::list_individual_services))
        .route("/group", get(handlers::list_group_services))
        .route("/{service_id}", delete(handlers::delete_service))
        .with_state(state)
}
