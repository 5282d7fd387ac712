use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailRequest {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// What the transport actually delivers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "messageId", skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl EmailResponse {
    pub fn sent(message_id: Option<String>) -> Self {
        Self {
            success: true,
            message: "Email enviado exitosamente".to_string(),
            message_id,
        }
    }

    pub fn failed(err: &MailError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            message_id: None,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MailError {
    #[error("Faltan campos requeridos: to, subject, y html o text")]
    MissingFields,

    #[error("Formato de email inválido")]
    InvalidEmail,

    #[error("Configuración de email no disponible")]
    NotConfigured,

    #[error("Error de autenticación. Verifica las credenciales de email.")]
    Auth(String),

    #[error("Error de conexión con el servidor de email.")]
    Connection(String),

    #[error("Error al enviar el email: {0}")]
    Other(String),
}

impl MailError {
    pub fn status(&self) -> StatusCode {
        match self {
            MailError::MissingFields | MailError::InvalidEmail => StatusCode::BAD_REQUEST,
            MailError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            MailError::Auth(_) => StatusCode::UNAUTHORIZED,
            MailError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            MailError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
