use std::sync::Arc;

use axum::{
    Router,
    middleware,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use auth_cell::middleware::session_token_middleware;
use auth_cell::router::auth_routes;
use auth_cell::SharedSession;
use catalog_cell::router::catalog_routes;
use chatbot_cell::router::chatbot_routes;
use notification_cell::router::email_routes;
use shared_config::AppConfig;

/// Requests without their own bearer token get the stored session's token.
pub fn create_router(state: Arc<AppConfig>, session: SharedSession) -> Router {
    Router::new()
        .route("/", get(|| async { "Spa Sentirse Bien API is running!" }))
        .nest("/api/chatbot", chatbot_routes(state.clone()))
        .nest("/api/email", email_routes(state.clone()))
        .nest("/api/turnos", appointment_routes(state.clone()))
        .nest("/api/services", catalog_routes(state.clone()))
        .nest("/api/auth", auth_routes(state, session.clone()))
        .layer(middleware::from_fn_with_state(session, session_token_middleware))
}
