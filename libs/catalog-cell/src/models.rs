use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ServiceType {
    #[serde(alias = "individual")]
    Individual,

    #[serde(rename = "Grupal", alias = "grupal", alias = "Group", alias = "group")]
    Group,

    /// Any other label the admin panel stored; kept as written.
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Individual => write!(f, "Individual"),
            ServiceType::Group => write!(f, "Grupal"),
            ServiceType::Other(label) => write!(f, "{}", label),
        }
    }
}

/// A bookable spa service as stored by the services backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    #[serde(rename = "descripcion", alias = "description", default)]
    pub description: String,
    #[serde(rename = "Image", alias = "image", default)]
    pub image: String,
    #[serde(rename = "precio", alias = "price", deserialize_with = "deserialize_price")]
    pub price: f64,
    #[serde(rename = "tipo", alias = "type")]
    pub service_type: ServiceType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
    pub service_type: ServiceType,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Service not found")]
    NotFound,

    #[error("Todos los campos son obligatorios.")]
    MissingFields,

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Tipo de servicio inválido: {0}")]
    InvalidType(String),
}

// The admin form posts the price as text, older records store a number.
fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    match RawPrice::deserialize(deserializer)? {
        RawPrice::Number(n) => Ok(n),
        RawPrice::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid price {:?}", s))),
    }
}
