use std::sync::Arc;
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};

pub struct TestConfig {
    pub backend_url: String,
    pub mail_relay_url: String,
    pub email_user: String,
    pub email_pass: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:4000".to_string(),
            mail_relay_url: "http://localhost:4001/send".to_string(),
            email_user: "spa@example.com".to_string(),
            email_pass: "test-app-password".to_string(),
        }
    }
}

impl TestConfig {
    /// Points every backend collection at a single mock server.
    pub fn with_backend(uri: &str) -> Self {
        Self {
            backend_url: uri.to_string(),
            mail_relay_url: format!("{}/send", uri),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            api_turno_url: format!("{}/api/turno", self.backend_url),
            api_service_url: format!("{}/api/service", self.backend_url),
            api_user_url: format!("{}/api/user", self.backend_url),
            email_user: self.email_user.clone(),
            email_pass: self.email_pass.clone(),
            mail_relay_url: self.mail_relay_url.clone(),
            session_store_path: ".session.test.json".to_string(),
            port: 3000,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl TestUser {
    pub fn new(email: &str, first_name: &str, last_name: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            role,
        }
    }

    pub fn cliente(email: &str) -> Self {
        Self::new(email, "Ana", "Pérez", Role::Cliente)
    }

    pub fn profesional(email: &str) -> Self {
        Self::new(email, "Laura", "Gómez", Role::Profesional)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "Admin", "Spa", Role::Admin)
    }

    pub fn to_user(&self) -> User {
        User {
            id: Some(self.id.clone()),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
            especialidad: None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "_id": self.id,
            "email": self.email,
            "first_name": self.first_name,
            "last_name": self.last_name,
            "role": self.role.to_string()
        })
    }
}

pub struct MockSpaResponses;

impl MockSpaResponses {
    pub fn service_response(id: &str, nombre: &str, tipo: &str, precio: f64) -> serde_json::Value {
        json!({
            "_id": id,
            "nombre": nombre,
            "descripcion": format!("{} relajante", nombre),
            "Image": format!("https://cdn.example.com/{}.jpg", id),
            "precio": precio,
            "tipo": tipo
        })
    }

    pub fn turno_response(
        id: &str,
        cliente: &TestUser,
        servicio: &serde_json::Value,
        profesional_id: &str,
        fecha: &str,
        hora: &str,
        estado: &str,
    ) -> serde_json::Value {
        json!({
            "_id": id,
            "email": cliente.email,
            "cliente": cliente.to_json(),
            "servicio": servicio,
            "profesional": profesional_id,
            "fecha": fecha,
            "hora": hora,
            "estado": estado,
            "createdAt": "2025-06-01T12:00:00.000Z"
        })
    }

    pub fn login_response(user: &TestUser, token: &str) -> serde_json::Value {
        json!({
            "user": {
                "email": user.email,
                "first_name": user.first_name,
                "last_name": user.last_name,
                "is_admin": user.role.is_administrator(),
                "role": user.role.to_string()
            },
            "token": token
        })
    }

    pub fn error_response(message: &str) -> serde_json::Value {
        json!({ "message": message })
    }
}
