use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers;
use crate::services::SharedSession;

#[derive(Clone, FromRef)]
pub struct AuthState {
    pub config: Arc<AppConfig>,
    pub session: SharedSession,
}

pub fn auth_routes(state: Arc<AppConfig>, session: SharedSession) -> Router {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/session", get(handlers::current_session))
        .route("/register", post(handlers::register))
        .route("/professionals", get(handlers::list_professionals))
        .route("/users/{email}", get(handlers::get_user_by_email))
        .with_state(AuthState { config: state, session })
}
