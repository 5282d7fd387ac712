use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info};

use crate::models::{BookingError, PriceQuote};

/// Bookings made further ahead than this get the early-booking discount.
pub const EARLY_BOOKING_THRESHOLD_HOURS: i64 = 48;
pub const EARLY_BOOKING_FACTOR: f64 = 0.85;

pub struct PricingService;

impl PricingService {
    pub fn new() -> Self {
        Self
    }

    /// Price a slot relative to the moment of booking. The discount applies
    /// only when the slot is strictly more than 48 hours away.
    pub fn quote(&self, base_price: f64, slot: NaiveDateTime, booked_at: NaiveDateTime) -> PriceQuote {
        let lead_time = slot - booked_at;
        let discount_applied = lead_time > Duration::hours(EARLY_BOOKING_THRESHOLD_HOURS);

        debug!(
            "Quoting {:.2} for slot {} booked at {} (lead {} minutes)",
            base_price,
            slot,
            booked_at,
            lead_time.num_minutes()
        );

        let final_price = if discount_applied {
            (base_price * EARLY_BOOKING_FACTOR).round()
        } else {
            base_price
        };

        if discount_applied {
            info!("Early booking discount applied: {:.2} -> {:.2}", base_price, final_price);
        }

        PriceQuote {
            base_price,
            final_price,
            discount_applied,
        }
    }

    pub fn quote_for(
        &self,
        base_price: f64,
        fecha: NaiveDate,
        hora: &str,
        booked_at: NaiveDateTime,
    ) -> Result<PriceQuote, BookingError> {
        let slot = slot_datetime(fecha, hora)?;
        Ok(self.quote(base_price, slot, booked_at))
    }
}

impl Default for PricingService {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an `HH:MM` slot time.
pub fn parse_hora(hora: &str) -> Result<NaiveTime, BookingError> {
    let bytes = hora.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && bytes.iter().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !well_formed {
        return Err(BookingError::InvalidTime(hora.to_string()));
    }
    NaiveTime::parse_from_str(hora, "%H:%M").map_err(|_| BookingError::InvalidTime(hora.to_string()))
}

pub fn slot_datetime(fecha: NaiveDate, hora: &str) -> Result<NaiveDateTime, BookingError> {
    Ok(fecha.and_time(parse_hora(hora)?))
}
