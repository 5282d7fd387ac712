// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Deserializer, Serialize};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use uuid::Uuid;

use catalog_cell::models::Service;
use shared_database::BackendError;
use shared_models::auth::User;

// ==============================================================================
// CORE TURNO MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TurnoEstado {
    #[default]
    Pendiente,
    Confirmado,
    Cancelado,
    /// Accepted when read back from the backend; nothing here produces it.
    Realizado,
}

impl fmt::Display for TurnoEstado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnoEstado::Pendiente => write!(f, "pendiente"),
            TurnoEstado::Confirmado => write!(f, "confirmado"),
            TurnoEstado::Cancelado => write!(f, "cancelado"),
            TurnoEstado::Realizado => write!(f, "realizado"),
        }
    }
}

/// A reference to a user inside a turno: the backend sends either the bare
/// id, the populated document, or a projection of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UserRef {
    User(User),
    Partial(UserSummary),
    Id(String),
}

/// Populated user without the fields a full `User` needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UserRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            UserRef::User(user) => user.id.as_deref(),
            UserRef::Partial(summary) => summary.id.as_deref(),
            UserRef::Id(id) => Some(id),
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            UserRef::User(user) => Some(user),
            _ => None,
        }
    }

    /// "First Last" from whatever name parts were populated.
    pub fn display_name(&self) -> Option<String> {
        match self {
            UserRef::User(user) => Some(user.full_name()),
            UserRef::Partial(summary) => {
                let parts: Vec<&str> = [summary.first_name.as_deref(), summary.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .filter(|p| !p.is_empty())
                    .collect();
                (!parts.is_empty()).then(|| parts.join(" "))
            }
            UserRef::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ServiceRef {
    Service(Box<Service>),
    Partial(ServiceSummary),
    Id(String),
}

/// Populated service carrying only some catalog fields, usually `_id` and
/// `nombre`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceSummary {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "nombre", alias = "name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ServiceRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            ServiceRef::Service(service) => service.id.as_deref(),
            ServiceRef::Partial(summary) => summary.id.as_deref(),
            ServiceRef::Id(id) => Some(id),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ServiceRef::Service(service) => Some(&service.name),
            ServiceRef::Partial(summary) => summary.name.as_deref(),
            ServiceRef::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turno {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub cliente: Option<UserRef>,
    #[serde(default)]
    pub servicio: Option<ServiceRef>,
    #[serde(default)]
    pub profesional: Option<UserRef>,
    #[serde(deserialize_with = "deserialize_fecha")]
    pub fecha: DateTime<Utc>,
    pub hora: String,
    #[serde(default)]
    pub estado: TurnoEstado,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detalles: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Turno {
    pub fn fecha_date(&self) -> NaiveDate {
        self.fecha.date_naive()
    }

    pub fn service_name(&self) -> Option<&str> {
        self.servicio.as_ref().and_then(ServiceRef::name)
    }

    pub fn profesional_id(&self) -> Option<&str> {
        self.profesional.as_ref().and_then(UserRef::id)
    }

    /// The client's email, from the populated client, the top-level `email`
    /// field, or a client reference that is itself the email.
    pub fn cliente_email(&self) -> Option<&str> {
        match &self.cliente {
            Some(UserRef::User(user)) => Some(user.email.as_str()),
            Some(UserRef::Id(raw)) if raw.contains('@') => Some(raw.as_str()),
            _ => self.email.as_deref(),
        }
    }
}

// `fecha` arrives as a bare date from forms and as a timestamp from storage.
fn deserialize_fecha<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_fecha(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid fecha {:?}", raw)))
}

pub fn parse_fecha(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTurnoRequest {
    /// Client id, or the client's email when the id is unknown.
    pub cliente: String,
    #[serde(default)]
    pub email: Option<String>,
    pub servicio: String,
    pub profesional: String,
    pub fecha: NaiveDate,
    pub hora: String,
    #[serde(default)]
    pub detalles: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTurnoRequest {
    pub estado: Option<TurnoEstado>,
    pub detalles: Option<String>,
    pub fecha: Option<NaiveDate>,
    pub hora: Option<String>,
}

impl UpdateTurnoRequest {
    pub fn is_empty(&self) -> bool {
        self.estado.is_none() && self.detalles.is_none() && self.fecha.is_none() && self.hora.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
    #[serde(default)]
    pub cardholder: Option<String>,
}

/// One-shot booking as posted by the reservation form. `payment` is present
/// only for the premium variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub servicio: String,
    pub cliente_email: String,
    pub fecha: Option<NaiveDate>,
    pub hora: Option<String>,
    pub profesional: Option<String>,
    #[serde(default)]
    pub detalles: Option<String>,
    #[serde(default)]
    pub payment: Option<PaymentDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteQuery {
    pub servicio: String,
    pub fecha: NaiveDate,
    pub hora: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceQuote {
    pub base_price: f64,
    pub final_price: f64,
    pub discount_applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub receipt_id: Uuid,
    pub turno: Turno,
    pub service_name: String,
    pub cliente_email: String,
    pub quote: PriceQuote,
    pub issued_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrintAudience {
    #[default]
    Cliente,
    Profesional,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Turno no encontrado")]
    NotFound,

    #[error("Professional not found: {0}")]
    ProfessionalNotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Turno cannot move from {from} to {to}")]
    InvalidStatusTransition { from: TurnoEstado, to: TurnoEstado },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Booking step out of order: expected {expected}, currently {actual}")]
    InvalidStep { expected: &'static str, actual: String },

    #[error("Falta completar: {0}")]
    MissingField(&'static str),

    #[error("Invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("El número de tarjeta debe tener 16 dígitos")]
    InvalidCardNumber,

    #[error("La fecha de vencimiento debe tener formato MM/YY")]
    InvalidExpiry,

    #[error("El CVV debe tener 3 dígitos")]
    InvalidCvv,

    #[error("Debes iniciar sesión para hacer una reserva")]
    NotLoggedIn,

    #[error("Error al crear la reserva: {0}")]
    Submission(#[from] AppointmentError),
}
