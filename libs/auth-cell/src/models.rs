use serde::{Deserialize, Serialize};

use shared_database::BackendError;
use shared_models::auth::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// The logged-in user as the login endpoint returns it and as the session
/// persists it under the `user` key. Missing names default to empty and a
/// missing role to `cliente`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: SessionUser,
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Ambos campos son obligatorios.")]
    MissingCredentials,

    #[error("Todos los campos son obligatorios.")]
    MissingFields,

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    Registration(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
