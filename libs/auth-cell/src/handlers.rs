use std::sync::Arc;

use axum::{
    extract::{Path, State, Json},
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AuthError, LoginRequest, RegisterRequest};
use crate::services::{SharedSession, UserDirectoryService};

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials | AuthError::MissingFields => {
                AppError::ValidationError(err.to_string())
            }
            AuthError::InvalidCredentials(msg) => AppError::Auth(msg),
            AuthError::Registration(msg) => AppError::BadRequest(msg),
            AuthError::UserNotFound(_) => AppError::NotFound(err.to_string()),
            AuthError::Storage(msg) => AppError::Internal(msg),
            AuthError::Backend(e) => AppError::ExternalService(e.to_string()),
        }
    }
}

/// Logs in against the backend and stores the user and token in the session.
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    State(session): State<SharedSession>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Login attempt for {}", request.email);

    let directory = UserDirectoryService::new(&config);
    let user = session.login(&directory, &request.email, &request.password).await?;
    let is_admin = user.role.has_admin_view();

    Ok(Json(json!({
        "user": user,
        "token": session.token(),
        "is_admin": is_admin
    })))
}

pub async fn logout(
    State(session): State<SharedSession>,
) -> Result<Json<Value>, AppError> {
    session.logout()?;

    Ok(Json(json!({
        "success": true,
        "message": "Sesión cerrada"
    })))
}

pub async fn current_session(
    State(session): State<SharedSession>,
) -> Json<Value> {
    let user = session.current_user();
    if let Some(user) = &user {
        debug!("Session active for {}", user.email);
    }

    Json(json!({
        "user": user,
        "is_admin": session.is_admin()
    }))
}

pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    let directory = UserDirectoryService::new(&config);
    let created = directory.register(&request).await?;

    Ok(Json(created))
}

pub async fn list_professionals(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Vec<User>>, AppError> {
    let directory = UserDirectoryService::new(&config);
    let professionals = directory.list_professionals().await?;

    Ok(Json(professionals))
}

pub async fn get_user_by_email(
    State(config): State<Arc<AppConfig>>,
    Path(email): Path<String>,
) -> Result<Json<User>, AppError> {
    let directory = UserDirectoryService::new(&config);
    let user = directory.find_by_email(&email).await?;

    Ok(Json(user))
}
