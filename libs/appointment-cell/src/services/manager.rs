use std::collections::{BTreeSet, HashMap};

use futures::future::join_all;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use auth_cell::{AuthError, UserDirectoryService};
use shared_config::AppConfig;
use shared_database::backend::{path_segment, BackendClient};
use shared_models::auth::User;

use crate::models::{
    AppointmentError, CreateTurnoRequest, Turno, TurnoEstado, UpdateTurnoRequest, UserRef,
};
use crate::services::lifecycle::TurnoLifecycleService;

/// Turno CRUD against the external backend. Filtering is done in-process over
/// the full list the backend returns.
pub struct TurnoManager {
    backend: BackendClient,
    base_url: String,
    directory: UserDirectoryService,
    lifecycle: TurnoLifecycleService,
}

impl TurnoManager {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(),
            base_url: config.api_turno_url.clone(),
            directory: UserDirectoryService::new(config),
            lifecycle: TurnoLifecycleService::new(),
        }
    }

    pub async fn list_turnos(&self) -> Result<Vec<Turno>, AppointmentError> {
        debug!("Fetching turnos");

        let turnos: Vec<Turno> = self.backend
            .request_list(&self.base_url, None)
            .await?;

        debug!("Fetched {} turnos", turnos.len());
        Ok(turnos)
    }

    pub async fn get_turno(&self, turno_id: &str) -> Result<Turno, AppointmentError> {
        self.list_turnos()
            .await?
            .into_iter()
            .find(|t| t.id == turno_id)
            .ok_or(AppointmentError::NotFound)
    }

    /// Create a turno in `pendiente`. Only presence of fields is checked; the
    /// slot is not checked for overlaps.
    pub async fn create_turno(
        &self,
        request: &CreateTurnoRequest,
        auth_token: Option<&str>,
    ) -> Result<Turno, AppointmentError> {
        for (field, value) in [
            ("cliente", &request.cliente),
            ("servicio", &request.servicio),
            ("profesional", &request.profesional),
            ("hora", &request.hora),
        ] {
            if value.trim().is_empty() {
                return Err(AppointmentError::ValidationError(format!("{} es obligatorio", field)));
            }
        }

        let email = request
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| request.cliente.clone());

        let mut body = json!({
            "cliente": request.cliente,
            "email": email,
            "servicio": request.servicio,
            "profesional": request.profesional,
            "fecha": request.fecha.format("%Y-%m-%d").to_string(),
            "hora": request.hora,
            "estado": TurnoEstado::Pendiente,
        });
        if let Some(detalles) = request.detalles.as_ref().filter(|d| !d.is_empty()) {
            body["detalles"] = json!(detalles);
        }

        let turno: Turno = self.backend
            .request(Method::POST, &self.base_url, auth_token, Some(body))
            .await?;

        info!("Turno {} created for {} on {} {}", turno.id, email, request.fecha, request.hora);
        Ok(turno)
    }

    /// Overwrites the estado with `confirmado` without looking at the current one.
    pub async fn confirm_turno(&self, turno_id: &str, auth_token: Option<&str>) -> Result<(), AppointmentError> {
        let url = self.edit_url(turno_id);
        let body = json!({ "estado": TurnoEstado::Confirmado });

        self.backend
            .send(Method::PUT, &url, auth_token, Some(body))
            .await
            .map_err(not_found_or_backend)?;

        info!("Turno {} confirmed", turno_id);
        Ok(())
    }

    /// Deletes the turno on the backend. There is no undo.
    pub async fn cancel_turno(&self, turno_id: &str, auth_token: Option<&str>) -> Result<(), AppointmentError> {
        let url = format!("{}/delete/{}", self.base_url, path_segment(turno_id));

        self.backend
            .send(Method::DELETE, &url, auth_token, None)
            .await
            .map_err(not_found_or_backend)?;

        info!("Turno {} cancelled", turno_id);
        Ok(())
    }

    /// Partial update. An estado change must be allowed by the lifecycle.
    pub async fn update_turno(
        &self,
        turno_id: &str,
        patch: &UpdateTurnoRequest,
        auth_token: Option<&str>,
    ) -> Result<Turno, AppointmentError> {
        if patch.is_empty() {
            return Err(AppointmentError::ValidationError("No hay cambios para aplicar".to_string()));
        }

        let mut turno = self.get_turno(turno_id).await?;

        if let Some(next) = patch.estado {
            self.lifecycle.validate_status_transition(turno.estado, next)?;
        }

        let mut body = Map::new();
        if let Some(estado) = patch.estado {
            body.insert("estado".to_string(), json!(estado));
            turno.estado = estado;
        }
        if let Some(detalles) = &patch.detalles {
            body.insert("detalles".to_string(), json!(detalles));
            turno.detalles = Some(detalles.clone());
        }
        if let Some(fecha) = patch.fecha {
            body.insert("fecha".to_string(), json!(fecha.format("%Y-%m-%d").to_string()));
            if let Some(midnight) = fecha.and_hms_opt(0, 0, 0) {
                turno.fecha = midnight.and_utc();
            }
        }
        if let Some(hora) = &patch.hora {
            crate::services::pricing::parse_hora(hora)
                .map_err(|e| AppointmentError::ValidationError(e.to_string()))?;
            body.insert("hora".to_string(), json!(hora));
            turno.hora = hora.clone();
        }

        self.backend
            .send(Method::PUT, &self.edit_url(turno_id), auth_token, Some(Value::Object(body)))
            .await
            .map_err(not_found_or_backend)?;

        info!("Turno {} updated", turno_id);
        Ok(turno)
    }

    /// Turnos booked by the client with this email.
    pub async fn list_for_cliente(&self, email: &str) -> Result<Vec<Turno>, AppointmentError> {
        let turnos = self.list_turnos().await?;

        Ok(turnos
            .into_iter()
            .filter(|t| match &t.cliente {
                Some(UserRef::User(user)) => user.email == email,
                Some(UserRef::Id(raw)) => raw == email,
                Some(UserRef::Partial(_)) => t.email.as_deref() == Some(email),
                None => false,
            })
            .collect())
    }

    /// Turnos assigned to the professional with this email.
    pub async fn list_for_profesional(&self, email: &str) -> Result<Vec<Turno>, AppointmentError> {
        let profesional = self.directory.find_by_email(email).await.map_err(|e| match e {
            AuthError::UserNotFound(_) => AppointmentError::ProfessionalNotFound(email.to_string()),
            AuthError::Backend(inner) => AppointmentError::Backend(inner),
            other => AppointmentError::ValidationError(other.to_string()),
        })?;

        let Some(profesional_id) = profesional.id else {
            return Err(AppointmentError::ProfessionalNotFound(email.to_string()));
        };

        let turnos = self.list_turnos().await?;
        let mine: Vec<Turno> = turnos
            .into_iter()
            .filter(|t| t.profesional_id() == Some(profesional_id.as_str()))
            .collect();

        debug!("Professional {} has {} turnos", email, mine.len());
        Ok(mine)
    }

    /// Fetch every distinct professional referenced by `turnos`, concurrently.
    /// Populated references are used as they are; failed lookups are skipped.
    pub async fn professionals_for(&self, turnos: &[Turno]) -> HashMap<String, User> {
        let mut found = HashMap::new();
        let mut pending = BTreeSet::new();

        for turno in turnos {
            match &turno.profesional {
                Some(UserRef::User(user)) => {
                    if let Some(id) = &user.id {
                        found.insert(id.clone(), user.clone());
                    }
                }
                Some(other) => {
                    if let Some(id) = other.id() {
                        pending.insert(id.to_string());
                    }
                }
                None => {}
            }
        }
        pending.retain(|id| !found.contains_key(id));

        let lookups = pending.iter().map(|id| async move {
            (id.clone(), self.directory.get_user(id).await)
        });

        for (id, result) in join_all(lookups).await {
            match result {
                Ok(user) => {
                    found.insert(id, user);
                }
                Err(e) => warn!("Could not load professional {}: {}", id, e),
            }
        }

        found
    }

    fn edit_url(&self, turno_id: &str) -> String {
        format!("{}/edit/{}", self.base_url, path_segment(turno_id))
    }
}

fn not_found_or_backend(e: shared_database::BackendError) -> AppointmentError {
    if e.is_not_found() {
        AppointmentError::NotFound
    } else {
        e.into()
    }
}
