use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use shared_utils::test_utils::{MockSpaResponses, TestConfig, TestUser};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn masaje() -> Value {
    MockSpaResponses::service_response("s1", "Masaje relajante", "Individual", 10000.0)
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/service"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            masaje(),
            MockSpaResponses::service_response("s2", "Yoga", "Grupal", 8000.0),
        ])))
        .mount(server)
        .await;
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_list_turnos_with_filters() {
    let server = MockServer::start().await;
    let ana = TestUser::cliente("ana@example.com");
    let yoga = MockSpaResponses::service_response("s2", "Yoga", "Grupal", 8000.0);

    Mock::given(method("GET"))
        .and(path("/api/turno"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSpaResponses::turno_response("t1", &ana, &masaje(), "p1", "2025-06-20", "10:00", "pendiente"),
            MockSpaResponses::turno_response("t2", &ana, &yoga, "p1", "2025-06-20", "11:00", "pendiente"),
            MockSpaResponses::turno_response("t3", &ana, &masaje(), "p2", "2025-06-21", "10:00", "pendiente"),
        ])))
        .mount(&server)
        .await;

    let app = appointment_routes(TestConfig::with_backend(&server.uri()).to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/?fecha=2025-06-20&servicio=Masaje%20relajante&profesional=")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let ids: Vec<&str> = body.as_array().unwrap().iter().map(|t| t["_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["t1"]);
}

#[tokio::test]
async fn test_available_hours() {
    let app = appointment_routes(TestConfig::default().to_arc());

    let response = app
        .oneshot(Request::builder().uri("/horarios").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["horarios"][0], "08:00");
    assert_eq!(body["horarios"][5], "16:00");
    assert_eq!(body["horarios"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_confirm_and_cancel() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/turno/edit/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/turno/delete/t2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Turno no encontrado" })))
        .mount(&server)
        .await;
    let config = TestConfig::with_backend(&server.uri()).to_arc();

    let confirmed = appointment_routes(config.clone())
        .oneshot(Request::builder().method("PUT").uri("/t1/confirm").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(confirmed.status(), StatusCode::OK);
    assert_eq!(body_json(confirmed).await["message"], "Turno confirmado correctamente");

    let cancelled = appointment_routes(config)
        .oneshot(Request::builder().method("DELETE").uri("/t2").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(cancelled.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_turno_returns_receipt() {
    let server = MockServer::start().await;
    let ana = TestUser::cliente("ana@example.com");
    mount_catalog(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/user/correo/ana%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ana.to_json()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/turno"))
        .and(body_partial_json(json!({
            "cliente": ana.id,
            "email": "ana@example.com",
            "servicio": "s1",
            "estado": "pendiente"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(MockSpaResponses::turno_response(
            "t7", &ana, &json!("s1"), "p1", "2099-01-15", "09:00", "pendiente",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let app = appointment_routes(TestConfig::with_backend(&server.uri()).to_arc());
    let response = app
        .oneshot(json_request("POST", "/book", json!({
            "servicio": "s1",
            "cliente_email": "ana@example.com",
            "fecha": "2099-01-15",
            "hora": "09:00",
            "profesional": "p1",
            "payment": {
                "card_number": "4111 1111 1111 1111",
                "expiry": "12/30",
                "cvv": "123"
            }
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["receipt"]["turno"]["_id"], "t7");
    assert_eq!(body["receipt"]["quote"]["discount_applied"], true);
    assert_eq!(body["receipt"]["quote"]["final_price"], 8500.0);
    assert!(body["receipt_html"].as_str().unwrap().contains("Comprobante de Reserva"));
}

#[tokio::test]
async fn test_book_turno_validation_errors() {
    let server = MockServer::start().await;
    let ana = TestUser::cliente("ana@example.com");
    mount_catalog(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/user/correo/ana%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([ana.to_json()])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/turno"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let config = TestConfig::with_backend(&server.uri()).to_arc();

    let missing_hora = appointment_routes(config.clone())
        .oneshot(json_request("POST", "/book", json!({
            "servicio": "s1",
            "cliente_email": "ana@example.com",
            "fecha": "2099-01-15",
            "profesional": "p1"
        })))
        .await
        .unwrap();
    assert_eq!(missing_hora.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing_hora).await["error"], "Falta completar: hora");

    let bad_card = appointment_routes(config)
        .oneshot(json_request("POST", "/book", json!({
            "servicio": "s1",
            "cliente_email": "ana@example.com",
            "fecha": "2099-01-15",
            "hora": "09:00",
            "profesional": "p1",
            "payment": { "card_number": "1234", "expiry": "12/30", "cvv": "123" }
        })))
        .await
        .unwrap();
    assert_eq!(bad_card.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(bad_card).await["error"], "El número de tarjeta debe tener 16 dígitos");
}

#[tokio::test]
async fn test_book_turno_unknown_client_must_log_in() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/user/correo/ghost%40example.com"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Usuario no encontrado" })))
        .mount(&server)
        .await;

    let app = appointment_routes(TestConfig::with_backend(&server.uri()).to_arc());
    let response = app
        .oneshot(json_request("POST", "/book", json!({
            "servicio": "s1",
            "cliente_email": "ghost@example.com",
            "fecha": "2099-01-15",
            "hora": "09:00",
            "profesional": "p1"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_quote_for_far_slot_is_discounted() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let app = appointment_routes(TestConfig::with_backend(&server.uri()).to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/quote?servicio=s1&fecha=2099-03-01&hora=10:00")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["base_price"], 10000.0);
    assert_eq!(body["final_price"], 8500.0);
    assert_eq!(body["discount_applied"], true);
}

#[tokio::test]
async fn test_print_client_turnos() {
    let server = MockServer::start().await;
    let ana = TestUser::cliente("ana@example.com");
    let laura = TestUser::profesional("laura@example.com");

    Mock::given(method("GET"))
        .and(path("/api/turno"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSpaResponses::turno_response("t1", &ana, &masaje(), &laura.id, "2099-01-15", "09:00", "confirmado"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/user/{}", laura.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(laura.to_json()))
        .mount(&server)
        .await;

    let app = appointment_routes(TestConfig::with_backend(&server.uri()).to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/print?email=ana%40example.com&audience=cliente")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h1>Mis Turnos</h1>"));
    assert!(html.contains("Total de turnos: 1"));
    assert!(html.contains("⏳ Turnos Futuros (1)"));
    assert!(html.contains("Laura Gómez"));
    assert!(html.contains("confirmado"));
}
