use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::services::SharedSession;

/// Forwards the stored session token as `Authorization: Bearer` on requests
/// that arrive without one. Requests that carry their own header are left
/// untouched.
pub async fn session_token_middleware(
    State(session): State<SharedSession>,
    mut request: Request,
    next: Next,
) -> Response {
    if !request.headers().contains_key(AUTHORIZATION) {
        if let Some(token) = session.token() {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    debug!("Using stored session token for {}", request.uri().path());
                    request.headers_mut().insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored session token is not a valid header value"),
            }
        }
    }

    next.run(request).await
}
