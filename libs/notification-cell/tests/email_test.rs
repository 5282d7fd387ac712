use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{basic_auth, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notification_cell::router::email_routes;
use shared_utils::test_utils::TestConfig;

async fn post_email(config: &TestConfig, body: Value) -> (StatusCode, Value) {
    post_raw(config, &body.to_string()).await
}

async fn post_raw(config: &TestConfig, body: &str) -> (StatusCode, Value) {
    let response = email_routes(config.to_arc())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn confirmation() -> Value {
    json!({
        "to": "ana@example.com",
        "subject": "Turno confirmado",
        "html": "<h1>Hola Ana</h1><p>Tu turno fue confirmado.</p>"
    })
}

#[tokio::test]
async fn test_email_sent_through_relay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/send"))
        .and(basic_auth("spa@example.com", "test-app-password"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .and(basic_auth("spa@example.com", "test-app-password"))
        .and(body_partial_json(json!({
            "from": "\"Spa Sentirse Bien\" <spa@example.com>",
            "to": "ana@example.com",
            "subject": "Turno confirmado",
            "text": "Hola AnaTu turno fue confirmado."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messageId": "<abc@relay>" })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = post_email(&TestConfig::with_backend(&server.uri()), confirmation()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Email enviado exitosamente");
    assert_eq!(body["messageId"], "<abc@relay>");
}

#[tokio::test]
async fn test_missing_fields_and_bad_address() {
    let config = TestConfig::default();

    let (status, body) = post_email(&config, json!({ "to": "ana@example.com", "subject": "Hola" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Faltan campos requeridos: to, subject, y html o text");

    let (status, body) = post_email(&config, json!({ "to": "ana.example.com", "subject": "Hola", "text": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Formato de email inválido");
}

#[tokio::test]
async fn test_unconfigured_credentials() {
    let mut config = TestConfig::default();
    config.email_pass = String::new();

    let (status, body) = post_email(&config, confirmation()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Configuración de email no disponible");
}

#[tokio::test]
async fn test_relay_rejects_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(401).set_body_string("535 auth failed"))
        .mount(&server)
        .await;

    let (status, body) = post_email(&TestConfig::with_backend(&server.uri()), confirmation()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Error de autenticación. Verifica las credenciales de email.");
}

#[tokio::test]
async fn test_relay_unreachable() {
    let mut config = TestConfig::default();
    // Nothing listens on port 9; the connection is refused.
    config.mail_relay_url = "http://127.0.0.1:9/send".to_string();

    let (status, body) = post_email(&config, confirmation()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Error de conexión con el servidor de email.");
}

#[tokio::test]
async fn test_relay_other_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(422).set_body_string("mailbox full"))
        .mount(&server)
        .await;

    let (status, body) = post_email(&TestConfig::with_backend(&server.uri()), confirmation()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error al enviar el email: mailbox full");
}

#[tokio::test]
async fn test_unreadable_body_keeps_response_shape() {
    let config = TestConfig::default();

    let (status, body) = post_raw(&config, "{not json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().starts_with("Error al enviar el email: "));

    let (status, body) = post_email(&config, json!({ "to": 42, "subject": "Hola", "text": "x" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().starts_with("Error al enviar el email: "));
}
