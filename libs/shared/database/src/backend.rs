use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend URL not configured: {0:?}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer. The body is kept verbatim so callers can show it.
    #[error("{body}")]
    Status { status: u16, body: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid authorization token")]
    InvalidToken,
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The response text exactly as sent, or `fallback` when it was empty.
    pub fn body_or(&self, fallback: &str) -> String {
        match self {
            BackendError::Status { body, .. } if !body.trim().is_empty() => body.clone(),
            _ => fallback.to_string(),
        }
    }

    /// The backend's own message when it sent one, otherwise `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            BackendError::Status { body, .. } if !body.trim().is_empty() => {
                extract_message(body).unwrap_or_else(|| body.clone())
            }
            _ => fallback.to_string(),
        }
    }
}

// Error bodies come as `{"message": ...}`, `{"error": ...}` or plain text.
fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Percent-encodes a value used as a single URL path segment.
pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Thin JSON client for the spa's REST backend (users, services, turnos).
#[derive(Clone, Default)]
pub struct BackendClient {
    client: Client,
}

impl BackendClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, BackendError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| BackendError::InvalidToken)?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Sends a request and returns the raw response text of a 2xx answer.
    pub async fn send(&self, method: Method, url: &str,
                      auth_token: Option<&str>, body: Option<Value>)
                      -> Result<String, BackendError> {
        if !url.starts_with("http") {
            return Err(BackendError::NotConfigured(url.to_string()));
        }
        debug!("Making {} request to {}", method, url);

        let headers = self.get_headers(auth_token)?;

        let mut req = self.client.request(method, url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!("Backend error ({}): {}", status, text);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }

    pub async fn request<T>(&self, method: Method, url: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T, BackendError>
    where T: DeserializeOwned {
        let text = self.send(method, url, auth_token, body).await?;
        let data = serde_json::from_str::<T>(&text)?;
        Ok(data)
    }

    /// Fetches a JSON array and decodes each record on its own. Records that
    /// do not decode are logged and skipped so one bad document does not hide
    /// the rest of the collection.
    pub async fn request_list<T>(&self, url: &str, auth_token: Option<&str>)
                                 -> Result<Vec<T>, BackendError>
    where T: DeserializeOwned {
        let records: Vec<Value> = self.request(Method::GET, url, auth_token, None).await?;
        let total = records.len();

        let decoded: Vec<T> = records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<T>(record.clone()) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Skipping record from {} ({}): {}", url, e, record);
                    None
                }
            })
            .collect();

        if decoded.len() < total {
            warn!("Decoded {} of {} records from {}", decoded.len(), total, url);
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_request_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/service"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"nombre": "Masaje"}])))
            .mount(&server)
            .await;

        let client = BackendClient::new();
        let body: Vec<Value> = client
            .request(Method::GET, &format!("{}/api/service", server.uri()), None, None)
            .await
            .unwrap();

        assert_eq!(body[0]["nombre"], "Masaje");
    }

    #[tokio::test]
    async fn test_request_list_skips_undecodable_records() {
        #[derive(serde::Deserialize)]
        struct Named {
            nombre: String,
        }

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/service"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"nombre": "Masaje"},
                {"precio": 100},
                {"nombre": "Yoga"}
            ])))
            .mount(&server)
            .await;

        let client = BackendClient::new();
        let names: Vec<Named> = client
            .request_list(&format!("{}/api/service", server.uri()), None)
            .await
            .unwrap();

        let names: Vec<&str> = names.iter().map(|n| n.nombre.as_str()).collect();
        assert_eq!(names, vec!["Masaje", "Yoga"]);
    }

    #[tokio::test]
    async fn test_request_list_still_requires_an_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/service"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nombre": "Masaje"})))
            .mount(&server)
            .await;

        let client = BackendClient::new();
        let err = client
            .request_list::<Value>(&format!("{}/api/service", server.uri()), None)
            .await
            .unwrap_err();
        assert_matches!(err, BackendError::Decode(_));
    }

    #[tokio::test]
    async fn test_bearer_token_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/turno/delete/1"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new();
        let url = format!("{}/api/turno/delete/1", server.uri());
        client.send(Method::DELETE, &url, Some("abc"), None).await.unwrap();
    }

    #[tokio::test]
    async fn test_error_body_is_kept_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/user/login"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Contraseña incorrecta"))
            .mount(&server)
            .await;

        let client = BackendClient::new();
        let url = format!("{}/api/user/login", server.uri());
        let err = client
            .send(Method::POST, &url, None, Some(json!({})))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "Contraseña incorrecta");
        assert_eq!(err.message_or("fallback"), "Contraseña incorrecta");
    }

    #[tokio::test]
    async fn test_unconfigured_url_fails_fast() {
        let client = BackendClient::new();
        let err = client.send(Method::GET, "/edit/1", None, None).await.unwrap_err();
        assert_matches!(err, BackendError::NotConfigured(_));
    }

    #[test]
    fn test_body_or_keeps_json_bodies_verbatim() {
        let err = BackendError::Status {
            status: 401,
            body: r#"{"message":"Usuario no encontrado"}"#.to_string(),
        };
        assert_eq!(err.body_or("Credenciales inválidas"), r#"{"message":"Usuario no encontrado"}"#);

        let blank = BackendError::Status { status: 401, body: "  ".to_string() };
        assert_eq!(blank.body_or("Credenciales inválidas"), "Credenciales inválidas");
    }

    #[test]
    fn test_message_prefers_json_message_field() {
        let err = BackendError::Status {
            status: 400,
            body: r#"{"message":"El email ya existe"}"#.to_string(),
        };
        assert_eq!(err.message_or("Error al registrar usuario"), "El email ya existe");

        let empty = BackendError::Status { status: 500, body: String::new() };
        assert_eq!(empty.message_or("Error al registrar usuario"), "Error al registrar usuario");
    }

    #[test]
    fn test_path_segment_encodes_email() {
        assert_eq!(path_segment("ana@example.com"), "ana%40example.com");
    }
}
