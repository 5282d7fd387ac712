use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn chatbot_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::chat))
        .with_state(state)
}
