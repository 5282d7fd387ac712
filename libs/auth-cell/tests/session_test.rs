use serde_json::json;
use tempfile::tempdir;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path};

use auth_cell::services::session::{FileStorage, MemoryStorage, SessionHolder, SessionStorage, TOKEN_KEY, USER_KEY};
use auth_cell::services::UserDirectoryService;
use shared_models::auth::Role;
use shared_utils::test_utils::{MockSpaResponses, TestConfig, TestUser};

async fn mock_login(server: &MockServer, user: &TestUser, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockSpaResponses::login_response(user, token),
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_persists_user_and_token_to_file() {
    let server = MockServer::start().await;
    let config = TestConfig::with_backend(&server.uri()).to_app_config();
    let admin = TestUser::admin("admin@example.com");
    mock_login(&server, &admin, "tok-admin").await;

    let dir = tempdir().unwrap();
    let store_path = dir.path().join("session.json");
    let directory = UserDirectoryService::new(&config);

    let holder = SessionHolder::new(FileStorage::new(&store_path));
    let user = holder.login(&directory, "admin@example.com", "clave").await.unwrap();

    assert_eq!(user.role, Role::Admin);
    assert!(holder.is_admin());
    assert_eq!(holder.token().as_deref(), Some("tok-admin"));

    // A fresh process sees the same session.
    let restored = SessionHolder::restore(FileStorage::new(&store_path));
    assert_eq!(restored.current_user().unwrap().email, "admin@example.com");
    assert_eq!(restored.token().as_deref(), Some("tok-admin"));

    restored.logout().unwrap();
    let after_logout = SessionHolder::restore(FileStorage::new(&store_path));
    assert!(after_logout.current_user().is_none());
}

#[tokio::test]
async fn test_failed_login_keeps_previous_state() {
    let server = MockServer::start().await;
    let config = TestConfig::with_backend(&server.uri()).to_app_config();
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string(""))
        .mount(&server)
        .await;

    let holder = SessionHolder::new(MemoryStorage::new());
    let directory = UserDirectoryService::new(&config);

    let err = holder.login(&directory, "ana@example.com", "mal").await.unwrap_err();

    assert_eq!(err.to_string(), "Credenciales inválidas");
    assert!(holder.current_user().is_none());
}

#[test]
fn test_file_storage_round_trips_keys() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("store.json"));

    assert_eq!(storage.get_item(USER_KEY).unwrap(), None);

    storage.set_item(USER_KEY, &json!({"email": "ana@example.com"}).to_string()).unwrap();
    storage.set_item(TOKEN_KEY, "tok").unwrap();
    storage.remove_item(TOKEN_KEY).unwrap();

    assert!(storage.get_item(USER_KEY).unwrap().is_some());
    assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
}
