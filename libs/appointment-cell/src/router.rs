// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Admin listing and raw creation
        .route("/", get(handlers::list_turnos).post(handlers::create_turno))

        // Reservation form
        .route("/book", post(handlers::book_turno))
        .route("/horarios", get(handlers::available_hours))
        .route("/quote", get(handlers::quote_turno))

        // Per-user views and printouts
        .route("/cliente/{email}", get(handlers::list_cliente_turnos))
        .route("/profesional/{email}", get(handlers::list_profesional_turnos))
        .route("/print", get(handlers::print_turnos))

        // Single turno management
        .route("/{turno_id}", put(handlers::update_turno).delete(handlers::cancel_turno))
        .route("/{turno_id}/confirm", put(handlers::confirm_turno))
        .route("/{turno_id}/print", get(handlers::print_turno))
        .with_state(state)
}
