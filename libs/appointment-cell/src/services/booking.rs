// libs/appointment-cell/src/services/booking.rs
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use catalog_cell::models::Service;
use shared_models::auth::User;

use crate::models::{
    BookingError, BookingReceipt, CreateTurnoRequest, PaymentDetails, PriceQuote,
};
use crate::services::manager::TurnoManager;
use crate::services::pricing::{parse_hora, PricingService};

/// Slots offered by the reservation form.
pub const AVAILABLE_HOURS: [&str; 10] = [
    "08:00", "09:00", "10:00", "11:00", "12:00",
    "16:00", "17:00", "18:00", "19:00", "20:00",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    ServiceSelected,
    DetailsEntered,
    PaymentEntered,
    Submitted,
    Confirmed,
    Failed,
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingStep::ServiceSelected => "ServiceSelected",
            BookingStep::DetailsEntered => "DetailsEntered",
            BookingStep::PaymentEntered => "PaymentEntered",
            BookingStep::Submitted => "Submitted",
            BookingStep::Confirmed => "Confirmed",
            BookingStep::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetails {
    pub fecha: NaiveDate,
    pub hora: String,
    pub profesional: String,
    pub detalles: Option<String>,
}

/// The reservation form as a step machine:
/// `ServiceSelected -> DetailsEntered -> [PaymentEntered] -> Submitted -> Confirmed | Failed`.
/// The payment step exists only in the premium variant.
#[derive(Debug)]
pub struct BookingFlow {
    step: BookingStep,
    service: Service,
    premium: bool,
    details: Option<BookingDetails>,
    payment: Option<PaymentDetails>,
    receipt: Option<BookingReceipt>,
    last_error: Option<String>,
}

impl BookingFlow {
    pub fn start(service: Service) -> Self {
        Self::with_variant(service, false)
    }

    pub fn start_premium(service: Service) -> Self {
        Self::with_variant(service, true)
    }

    fn with_variant(service: Service, premium: bool) -> Self {
        debug!("Booking started for service {} (premium: {})", service.name, premium);
        Self {
            step: BookingStep::ServiceSelected,
            service,
            premium,
            details: None,
            payment: None,
            receipt: None,
            last_error: None,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn is_premium(&self) -> bool {
        self.premium
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn details(&self) -> Option<&BookingDetails> {
        self.details.as_ref()
    }

    pub fn receipt(&self) -> Option<&BookingReceipt> {
        self.receipt.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Record date, time and professional. May be repeated until submission.
    pub fn enter_details(
        &mut self,
        fecha: Option<NaiveDate>,
        hora: Option<&str>,
        profesional: Option<&str>,
        detalles: Option<&str>,
    ) -> Result<(), BookingError> {
        self.expect_step(&[BookingStep::ServiceSelected, BookingStep::DetailsEntered], "ServiceSelected")?;

        let fecha = fecha.ok_or(BookingError::MissingField("fecha"))?;
        let hora = hora
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(BookingError::MissingField("hora"))?;
        let profesional = profesional
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(BookingError::MissingField("profesional"))?;
        parse_hora(hora)?;

        self.details = Some(BookingDetails {
            fecha,
            hora: hora.to_string(),
            profesional: profesional.to_string(),
            detalles: detalles.map(str::to_string).filter(|d| !d.trim().is_empty()),
        });
        self.payment = None;
        self.step = BookingStep::DetailsEntered;
        Ok(())
    }

    /// Premium variant only: validate card data format. Nothing is charged.
    pub fn enter_payment(&mut self, payment: PaymentDetails) -> Result<(), BookingError> {
        if !self.premium {
            return Err(BookingError::InvalidStep {
                expected: "premium booking",
                actual: self.step.to_string(),
            });
        }
        self.expect_step(&[BookingStep::DetailsEntered, BookingStep::PaymentEntered], "DetailsEntered")?;

        validate_payment(&payment)?;

        self.payment = Some(payment);
        self.step = BookingStep::PaymentEntered;
        Ok(())
    }

    pub fn quote(&self, booked_at: NaiveDateTime) -> Result<PriceQuote, BookingError> {
        let details = self.details.as_ref().ok_or(BookingError::MissingField("fecha"))?;
        PricingService::new().quote_for(self.service.price, details.fecha, &details.hora, booked_at)
    }

    /// Create the turno for `cliente`. Ends in `Confirmed` with a receipt, or
    /// in `Failed` with the backend error kept for display.
    pub async fn submit(
        &mut self,
        manager: &TurnoManager,
        cliente: Option<&User>,
        booked_at: NaiveDateTime,
        auth_token: Option<&str>,
    ) -> Result<&BookingReceipt, BookingError> {
        let ready = if self.premium { BookingStep::PaymentEntered } else { BookingStep::DetailsEntered };
        self.expect_step(&[ready], if self.premium { "PaymentEntered" } else { "DetailsEntered" })?;

        let cliente = cliente.ok_or(BookingError::NotLoggedIn)?;
        let details = self.details.clone().ok_or(BookingError::MissingField("fecha"))?;
        let service_id = self.service.id.clone().ok_or(BookingError::MissingField("servicio"))?;
        let quote = self.quote(booked_at)?;

        self.step = BookingStep::Submitted;

        let request = CreateTurnoRequest {
            cliente: cliente.id.clone().unwrap_or_else(|| cliente.email.clone()),
            email: Some(cliente.email.clone()),
            servicio: service_id,
            profesional: details.profesional.clone(),
            fecha: details.fecha,
            hora: details.hora.clone(),
            detalles: details.detalles.clone(),
        };

        match manager.create_turno(&request, auth_token).await {
            Ok(turno) => {
                let receipt = BookingReceipt {
                    receipt_id: Uuid::new_v4(),
                    turno,
                    service_name: self.service.name.clone(),
                    cliente_email: cliente.email.clone(),
                    quote,
                    issued_at: booked_at,
                };
                info!(
                    "Booking confirmed: receipt {} for {} ({:.2})",
                    receipt.receipt_id, receipt.cliente_email, receipt.quote.final_price
                );
                self.step = BookingStep::Confirmed;
                self.last_error = None;
                Ok(self.receipt.insert(receipt))
            }
            Err(e) => {
                warn!("Booking failed for {}: {}", cliente.email, e);
                self.step = BookingStep::Failed;
                self.last_error = Some(e.to_string());
                Err(BookingError::Submission(e))
            }
        }
    }

    fn expect_step(&self, allowed: &[BookingStep], expected: &'static str) -> Result<(), BookingError> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(BookingError::InvalidStep {
                expected,
                actual: self.step.to_string(),
            })
        }
    }
}

pub fn validate_payment(payment: &PaymentDetails) -> Result<(), BookingError> {
    let digits: String = payment.card_number.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() != 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(BookingError::InvalidCardNumber);
    }

    let expiry_ok = match payment.expiry.trim().split_once('/') {
        Some((mm, yy)) => {
            mm.len() == 2
                && yy.len() == 2
                && yy.chars().all(|c| c.is_ascii_digit())
                && matches!(mm.parse::<u8>(), Ok(1..=12))
        }
        None => false,
    };
    if !expiry_ok {
        return Err(BookingError::InvalidExpiry);
    }

    let cvv = payment.cvv.trim();
    if cvv.len() != 3 || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(BookingError::InvalidCvv);
    }

    Ok(())
}
