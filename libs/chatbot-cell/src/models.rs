use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub reply: String,
}

impl ChatResponse {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into() }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ChatbotError {
    #[error("No se pudieron cargar los servicios: {0}")]
    Catalog(String),

    #[error("No se pudieron cargar los usuarios: {0}")]
    Users(String),
}
