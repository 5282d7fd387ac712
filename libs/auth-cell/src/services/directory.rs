use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::backend::{path_segment, BackendClient};
use shared_models::auth::{Role, User};

use crate::models::{AuthError, LoginRequest, LoginResponse, RegisterRequest};

/// Read access to the users backend plus the login/register calls.
pub struct UserDirectoryService {
    backend: BackendClient,
    base_url: String,
}

impl UserDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(),
            base_url: config.api_user_url.clone(),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        debug!("Fetching users");

        let users: Vec<User> = self.backend
            .request_list(&self.base_url, None)
            .await?;

        Ok(users)
    }

    pub async fn list_professionals(&self) -> Result<Vec<User>, AuthError> {
        let users = self.list_users().await?;

        Ok(users
            .into_iter()
            .filter(|u| u.role == Role::Profesional)
            .collect())
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, AuthError> {
        let url = format!("{}/{}", self.base_url, path_segment(user_id));

        self.backend
            .request::<User>(Method::GET, &url, None, None)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    AuthError::UserNotFound(user_id.to_string())
                } else {
                    e.into()
                }
            })
    }

    /// Looks a user up by email. The backend answers either with the user
    /// object or with an array of matches.
    pub async fn find_by_email(&self, email: &str) -> Result<User, AuthError> {
        let url = format!("{}/correo/{}", self.base_url, path_segment(email));

        let value: Value = self.backend
            .request(Method::GET, &url, None, None)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    AuthError::UserNotFound(email.to_string())
                } else {
                    e.into()
                }
            })?;

        let candidate = match value {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            Value::Object(map) if !map.is_empty() => Value::Object(map),
            _ => return Err(AuthError::UserNotFound(email.to_string())),
        };

        let user: User = serde_json::from_value(candidate)
            .map_err(|e| AuthError::Backend(e.into()))?;

        if user.id.is_none() {
            warn!("User {} returned without an id", email);
            return Err(AuthError::UserNotFound(email.to_string()));
        }

        Ok(user)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let email = request.email.trim();
        let password = request.password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let url = format!("{}/login", self.base_url);
        let body = json!({ "email": email, "password": password });

        let response: LoginResponse = self.backend
            .request(Method::POST, &url, None, Some(body))
            .await
            .map_err(|e| match e.status() {
                Some(_) => AuthError::InvalidCredentials(e.body_or("Credenciales inválidas")),
                None => e.into(),
            })?;

        info!("User {} logged in as {}", response.user.email, response.user.role);
        Ok(response)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Value, AuthError> {
        if request.first_name.trim().is_empty()
            || request.last_name.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }

        let url = format!("{}/register", self.base_url);
        let body = json!({
            "first_name": request.first_name.trim(),
            "last_name": request.last_name.trim(),
            "email": request.email.trim(),
            "password": request.password,
        });

        let created: Value = self.backend
            .request(Method::POST, &url, None, Some(body))
            .await
            .map_err(|e| match e.status() {
                Some(_) => AuthError::Registration(e.message_or("Error al registrar usuario")),
                None => e.into(),
            })?;

        info!("Registered user {}", request.email.trim());
        Ok(created)
    }
}
