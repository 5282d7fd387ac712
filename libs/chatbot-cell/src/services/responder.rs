use tracing::{debug, error};

use crate::models::ChatbotError;
use crate::services::knowledge::KnowledgeSource;

pub const GREETING: &str = "¡Hola! Bienvenido al Spa Sentirse Bien 🌸 ¿En qué puedo ayudarte?";
pub const THANKS: &str = "¡De nada! Si tenés más preguntas, no dudes en preguntar.";
pub const GOODBYE: &str = "¡Hasta luego! Esperamos verte pronto 💆‍♀️";
pub const OPENING_HOURS: &str = "Nuestro horario es de lunes a sábado de 9:00 a 20:00 hs.";
pub const BOOKING_HINT: &str = "Podés reservar tu turno desde la sección 'Servicios' en nuestra página.";
pub const NO_SERVICES: &str = "En este momento no hay servicios disponibles para mostrar.";
pub const NO_PROFESSIONALS: &str = "No hay profesionales registrados actualmente.";
pub const FALLBACK: &str = "Lo siento, no entendí tu mensaje. ¿Podés repetirlo?";
pub const PROCESSING_ERROR: &str = "Hubo un error al procesar tu mensaje.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Thanks,
    Goodbye,
    OpeningHours,
    Booking,
    Services,
    Professionals,
    Unknown,
}

// Checked in order; the first rule with a matching keyword wins.
const RULES: &[(Intent, &[&str])] = &[
    (Intent::Greeting, &["hola"]),
    (Intent::Thanks, &["gracias"]),
    (Intent::Goodbye, &["chau", "adiós"]),
    (Intent::OpeningHours, &["horario", "atención"]),
    (Intent::Booking, &["turno", "reserva"]),
    (Intent::Services, &["servicio", "masaje"]),
    (Intent::Professionals, &["profesional", "terapeuta", "trabajan", "empleado", "masajista"]),
];

/// Lowercase substring match against the ordered rule list.
pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();

    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Unknown)
}

pub struct ChatbotResponder<K> {
    knowledge: K,
}

impl<K: KnowledgeSource> ChatbotResponder<K> {
    pub fn new(knowledge: K) -> Self {
        Self { knowledge }
    }

    pub async fn reply(&self, message: &str) -> Result<String, ChatbotError> {
        let intent = classify(message);
        debug!("Chatbot message classified as {:?}", intent);

        let reply = match intent {
            Intent::Greeting => GREETING.to_string(),
            Intent::Thanks => THANKS.to_string(),
            Intent::Goodbye => GOODBYE.to_string(),
            Intent::OpeningHours => OPENING_HOURS.to_string(),
            Intent::Booking => BOOKING_HINT.to_string(),
            Intent::Services => {
                let names = self.knowledge.service_names().await.inspect_err(|e| {
                    error!("Chatbot could not load services: {}", e);
                })?;
                if names.is_empty() {
                    NO_SERVICES.to_string()
                } else {
                    format!(
                        "Actualmente ofrecemos: {}. Podés consultarlos desde la sección 'Servicios'.",
                        names.join(", ")
                    )
                }
            }
            Intent::Professionals => {
                let names = self.knowledge.professional_names().await.inspect_err(|e| {
                    error!("Chatbot could not load professionals: {}", e);
                })?;
                if names.is_empty() {
                    NO_PROFESSIONALS.to_string()
                } else {
                    format!(
                        "Nuestros profesionales son: {}. Podés elegirlos al reservar un servicio.",
                        names.join(", ")
                    )
                }
            }
            Intent::Unknown => FALLBACK.to_string(),
        };

        Ok(reply)
    }
}
