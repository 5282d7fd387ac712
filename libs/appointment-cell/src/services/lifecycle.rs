// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, info, warn};

use crate::models::{AppointmentError, TurnoEstado};

pub struct TurnoLifecycleService;

impl TurnoLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that an estado change is allowed. Writing the current estado
    /// again is accepted.
    pub fn validate_status_transition(
        &self,
        current: TurnoEstado,
        next: TurnoEstado,
    ) -> Result<(), AppointmentError> {
        debug!("Validating estado transition from {} to {}", current, next);

        if current == next {
            return Ok(());
        }

        if !self.get_valid_transitions(current).contains(&next) {
            warn!("Invalid estado transition attempted: {} -> {}", current, next);
            return Err(AppointmentError::InvalidStatusTransition { from: current, to: next });
        }

        info!("Estado transition validated: {} -> {}", current, next);
        Ok(())
    }

    pub fn get_valid_transitions(&self, current: TurnoEstado) -> Vec<TurnoEstado> {
        match current {
            TurnoEstado::Pendiente => vec![TurnoEstado::Confirmado, TurnoEstado::Cancelado],
            TurnoEstado::Confirmado => vec![TurnoEstado::Cancelado],
            // Terminal states
            TurnoEstado::Cancelado => vec![],
            TurnoEstado::Realizado => vec![],
        }
    }

    pub fn is_terminal(&self, estado: TurnoEstado) -> bool {
        self.get_valid_transitions(estado).is_empty()
    }
}

impl Default for TurnoLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
