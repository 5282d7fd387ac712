use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use crate::models::Turno;

/// Admin list filters. Unset filters match everything; set filters are
/// combined with AND and compared exactly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurnoFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub fecha: Option<NaiveDate>,
    /// Service id or service name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub servicio: Option<String>,
    /// Professional id or full name.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub profesional: Option<String>,
}

// The admin form sends unselected filters as empty query values.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl TurnoFilter {
    pub fn is_empty(&self) -> bool {
        self.fecha.is_none() && self.servicio.is_none() && self.profesional.is_none()
    }

    pub fn matches(&self, turno: &Turno) -> bool {
        if let Some(fecha) = self.fecha {
            if turno.fecha_date() != fecha {
                return false;
            }
        }

        if let Some(servicio) = self.servicio.as_deref() {
            let by_id = turno.servicio.as_ref().and_then(|s| s.id()) == Some(servicio);
            let by_name = turno.service_name() == Some(servicio);
            if !by_id && !by_name {
                return false;
            }
        }

        if let Some(profesional) = self.profesional.as_deref() {
            let matched = turno.profesional.as_ref().is_some_and(|p| {
                p.id() == Some(profesional) || p.display_name().as_deref() == Some(profesional)
            });
            if !matched {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, turnos: Vec<Turno>) -> Vec<Turno> {
        if self.is_empty() {
            return turnos;
        }
        turnos.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Partition into turnos on `today` and those strictly after it. Past turnos
/// are dropped.
pub fn split_today_and_upcoming(turnos: &[Turno], today: NaiveDate) -> (Vec<Turno>, Vec<Turno>) {
    let mut today_turnos = Vec::new();
    let mut upcoming = Vec::new();

    for turno in turnos {
        let fecha = turno.fecha_date();
        if fecha == today {
            today_turnos.push(turno.clone());
        } else if fecha > today {
            upcoming.push(turno.clone());
        }
    }

    upcoming.sort_by(|a, b| (a.fecha, &a.hora).cmp(&(b.fecha, &b.hora)));
    today_turnos.sort_by(|a, b| a.hora.cmp(&b.hora));

    (today_turnos, upcoming)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn turno(id: &str, fecha: &str, servicio: serde_json::Value, profesional: serde_json::Value) -> Turno {
        serde_json::from_value(json!({
            "_id": id,
            "cliente": "ana@example.com",
            "servicio": servicio,
            "profesional": profesional,
            "fecha": fecha,
            "hora": "10:00"
        }))
        .unwrap()
    }

    fn sample() -> Vec<Turno> {
        vec![
            turno(
                "t1",
                "2025-06-10",
                json!({"_id": "s1", "nombre": "Masaje", "precio": 100, "tipo": "Individual"}),
                json!({"_id": "p1", "email": "laura@example.com", "first_name": "Laura", "last_name": "Gómez", "role": "profesional"}),
            ),
            turno("t2", "2025-06-10", json!("s2"), json!("p2")),
            turno(
                "t3",
                "2025-06-11",
                json!({"_id": "s1", "nombre": "Masaje", "precio": 100, "tipo": "Individual"}),
                json!("p1"),
            ),
        ]
    }

    fn ids(turnos: &[Turno]) -> Vec<&str> {
        turnos.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filtered = TurnoFilter::default().apply(sample());
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_filters_combine_with_and() {
        let filter = TurnoFilter {
            fecha: NaiveDate::from_ymd_opt(2025, 6, 10),
            servicio: Some("Masaje".to_string()),
            profesional: None,
        };
        assert_eq!(ids(&filter.apply(sample())), vec!["t1"]);
    }

    #[test]
    fn test_profesional_by_id_or_full_name() {
        let by_id = TurnoFilter { profesional: Some("p1".to_string()), ..Default::default() };
        assert_eq!(ids(&by_id.apply(sample())), vec!["t1", "t3"]);

        let by_name = TurnoFilter { profesional: Some("Laura Gómez".to_string()), ..Default::default() };
        assert_eq!(ids(&by_name.apply(sample())), vec!["t1"]);
    }

    #[test]
    fn test_partially_populated_refs_still_match() {
        let partial = turno(
            "t4",
            "2025-06-12",
            json!({"_id": "s1", "nombre": "Masaje"}),
            json!({"_id": "p3", "first_name": "Sofía", "last_name": "Ruiz"}),
        );

        let by_service = TurnoFilter { servicio: Some("Masaje".to_string()), ..Default::default() };
        assert_eq!(ids(&by_service.apply(vec![partial.clone()])), vec!["t4"]);

        let by_name = TurnoFilter { profesional: Some("Sofía Ruiz".to_string()), ..Default::default() };
        assert_eq!(ids(&by_name.apply(vec![partial])), vec!["t4"]);
    }

    #[test]
    fn test_empty_query_values_are_unset() {
        let filter: TurnoFilter = serde_json::from_value(json!({
            "fecha": "",
            "servicio": "Masaje",
            "profesional": ""
        }))
        .unwrap();
        assert!(filter.fecha.is_none());
        assert!(filter.profesional.is_none());
        assert_eq!(filter.servicio.as_deref(), Some("Masaje"));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let filter = TurnoFilter { servicio: Some("masaje".to_string()), ..Default::default() };
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn test_split_today_and_upcoming() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let mut turnos = sample();
        turnos.push(turno("old", "2025-06-01", json!("s1"), json!("p1")));

        let (hoy, futuros) = split_today_and_upcoming(&turnos, today);
        assert_eq!(ids(&hoy), vec!["t1", "t2"]);
        assert_eq!(ids(&futuros), vec!["t3"]);
    }
}
