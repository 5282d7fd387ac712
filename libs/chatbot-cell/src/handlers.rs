use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use shared_config::AppConfig;

use crate::models::{ChatRequest, ChatResponse};
use crate::services::responder::PROCESSING_ERROR;
use crate::services::{ChatbotResponder, LiveKnowledge};

fn processing_error() -> (StatusCode, Json<ChatResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ChatResponse::new(PROCESSING_ERROR)),
    )
}

/// Any failure, an unreadable body included, answers 500 with a fixed reply
/// so the widget always has something to show.
#[axum::debug_handler]
pub async fn chat(
    State(config): State<Arc<AppConfig>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Unreadable chatbot request: {}", rejection.body_text());
            return processing_error();
        }
    };

    info!("Chatbot message received: {:?}", request.message);

    let responder = ChatbotResponder::new(LiveKnowledge::new(&config));

    match responder.reply(&request.message).await {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse::new(reply))),
        Err(_) => processing_error(),
    }
}
