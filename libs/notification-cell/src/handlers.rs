use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::error;

use shared_config::AppConfig;

use crate::models::{EmailRequest, EmailResponse, MailError};
use crate::services::{EmailService, HttpMailRelay};

/// Responds with `{success, message[, messageId]}` and the status that
/// matches the failure. A body that is not a valid request is reported like
/// any other send failure.
#[axum::debug_handler]
pub async fn send_email(
    State(config): State<Arc<AppConfig>>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> (StatusCode, Json<EmailResponse>) {
    let result = match payload {
        Ok(Json(request)) => {
            EmailService::new(&config, HttpMailRelay::new(&config))
                .send_email(request)
                .await
        }
        Err(rejection) => Err(MailError::Other(rejection.body_text())),
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(err) => {
            error!("Error al enviar email: {:?}", err);
            (err.status(), Json(EmailResponse::failed(&err)))
        }
    }
}
