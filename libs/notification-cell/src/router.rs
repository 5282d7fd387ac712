use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn email_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::send_email))
        .with_state(state)
}
