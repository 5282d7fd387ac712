// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use axum_extra::TypedHeader;
use chrono::Local;
use headers::{Authorization, authorization::Bearer};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use auth_cell::{AuthError, UserDirectoryService};
use catalog_cell::handlers::map_catalog_error;
use catalog_cell::CatalogService;
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, BookingError, BookingRequest, CreateTurnoRequest, PriceQuote,
    PrintAudience, QuoteQuery, Turno, UpdateTurnoRequest,
};
use crate::services::booking::{BookingFlow, AVAILABLE_HOURS};
use crate::services::filter::TurnoFilter;
use crate::services::manager::TurnoManager;
use crate::services::pricing::PricingService;
use crate::services::print::{render_receipt, render_turno, render_turno_list};

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::ProfessionalNotFound(_) => AppError::NotFound(err.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::InvalidStatusTransition { .. } => AppError::Conflict(err.to_string()),
            AppointmentError::Backend(e) => AppError::ExternalService(e.to_string()),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidStep { .. } => AppError::Conflict(err.to_string()),
            BookingError::NotLoggedIn => AppError::Auth(err.to_string()),
            BookingError::Submission(inner) => inner.into(),
            _ => AppError::ValidationError(err.to_string()),
        }
    }
}

fn bearer(auth: &Option<TypedHeader<Authorization<Bearer>>>) -> Option<&str> {
    auth.as_ref().map(|TypedHeader(a)| a.token())
}

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct PrintQuery {
    pub email: String,
    #[serde(default)]
    pub audience: PrintAudience,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PrintTurnoQuery {
    #[serde(default)]
    pub audience: PrintAudience,
}

// ==============================================================================
// TURNO HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_turnos(
    State(config): State<Arc<AppConfig>>,
    Query(filter): Query<TurnoFilter>,
) -> Result<Json<Vec<Turno>>, AppError> {
    let manager = TurnoManager::new(&config);

    let turnos = manager.list_turnos().await?;
    let filtered = filter.apply(turnos);

    debug!("Returning {} turnos for filter {:?}", filtered.len(), filter);
    Ok(Json(filtered))
}

#[axum::debug_handler]
pub async fn create_turno(
    State(config): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(request): Json<CreateTurnoRequest>,
) -> Result<Json<Turno>, AppError> {
    let manager = TurnoManager::new(&config);

    let turno = manager.create_turno(&request, bearer(&auth)).await?;

    Ok(Json(turno))
}

/// Full reservation: service lookup, details, optional payment, submission.
#[axum::debug_handler]
pub async fn book_turno(
    State(config): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CatalogService::new(&config)
        .get_service(&request.servicio)
        .await
        .map_err(map_catalog_error)?;

    let cliente = UserDirectoryService::new(&config)
        .find_by_email(&request.cliente_email)
        .await
        .map_err(|e| match e {
            AuthError::UserNotFound(_) => AppError::from(BookingError::NotLoggedIn),
            other => AppError::from(other),
        })?;

    let mut flow = match request.payment {
        Some(_) => BookingFlow::start_premium(service),
        None => BookingFlow::start(service),
    };
    flow.enter_details(
        request.fecha,
        request.hora.as_deref(),
        request.profesional.as_deref(),
        request.detalles.as_deref(),
    )?;
    if let Some(payment) = request.payment {
        flow.enter_payment(payment)?;
    }

    let manager = TurnoManager::new(&config);
    let receipt = flow
        .submit(&manager, Some(&cliente), Local::now().naive_local(), bearer(&auth))
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "¡Reserva confirmada!",
        "receipt": receipt,
        "receipt_html": render_receipt(receipt),
    })))
}

pub async fn available_hours() -> Json<Value> {
    Json(json!({ "horarios": AVAILABLE_HOURS }))
}

#[axum::debug_handler]
pub async fn quote_turno(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<PriceQuote>, AppError> {
    let service = CatalogService::new(&config)
        .get_service(&query.servicio)
        .await
        .map_err(map_catalog_error)?;

    let quote = PricingService::new().quote_for(
        service.price,
        query.fecha,
        &query.hora,
        Local::now().naive_local(),
    )?;

    Ok(Json(quote))
}

#[axum::debug_handler]
pub async fn confirm_turno(
    State(config): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(turno_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let manager = TurnoManager::new(&config);

    manager.confirm_turno(&turno_id, bearer(&auth)).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Turno confirmado correctamente"
    })))
}

#[axum::debug_handler]
pub async fn update_turno(
    State(config): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(turno_id): Path<String>,
    Json(patch): Json<UpdateTurnoRequest>,
) -> Result<Json<Turno>, AppError> {
    let manager = TurnoManager::new(&config);

    let turno = manager.update_turno(&turno_id, &patch, bearer(&auth)).await?;

    Ok(Json(turno))
}

#[axum::debug_handler]
pub async fn cancel_turno(
    State(config): State<Arc<AppConfig>>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(turno_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let manager = TurnoManager::new(&config);

    manager.cancel_turno(&turno_id, bearer(&auth)).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Turno eliminado correctamente"
    })))
}

#[axum::debug_handler]
pub async fn list_cliente_turnos(
    State(config): State<Arc<AppConfig>>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Turno>>, AppError> {
    let manager = TurnoManager::new(&config);
    Ok(Json(manager.list_for_cliente(&email).await?))
}

#[axum::debug_handler]
pub async fn list_profesional_turnos(
    State(config): State<Arc<AppConfig>>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Turno>>, AppError> {
    let manager = TurnoManager::new(&config);
    Ok(Json(manager.list_for_profesional(&email).await?))
}

// ==============================================================================
// PRINT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn print_turnos(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<PrintQuery>,
) -> Result<Html<String>, AppError> {
    let manager = TurnoManager::new(&config);

    let (turnos, default_title) = match query.audience {
        PrintAudience::Cliente => (manager.list_for_cliente(&query.email).await?, "Mis Turnos"),
        PrintAudience::Profesional => {
            (manager.list_for_profesional(&query.email).await?, "Mis Turnos Asignados")
        }
    };
    let professionals = match query.audience {
        PrintAudience::Cliente => manager.professionals_for(&turnos).await,
        PrintAudience::Profesional => Default::default(),
    };

    let title = query.title.as_deref().unwrap_or(default_title);
    Ok(Html(render_turno_list(
        title,
        &turnos,
        query.audience,
        &professionals,
        Local::now().naive_local(),
    )))
}

#[axum::debug_handler]
pub async fn print_turno(
    State(config): State<Arc<AppConfig>>,
    Path(turno_id): Path<String>,
    Query(query): Query<PrintTurnoQuery>,
) -> Result<Html<String>, AppError> {
    let manager = TurnoManager::new(&config);

    let turno = manager.get_turno(&turno_id).await?;
    let professionals = manager.professionals_for(std::slice::from_ref(&turno)).await;
    let professional = turno.profesional_id().and_then(|id| professionals.get(id));

    Ok(Html(render_turno(
        &turno,
        query.audience,
        professional,
        Local::now().naive_local(),
    )))
}
