use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chat_auth_client::store::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use chat_auth_client::{AuthClient, Config, CredentialStore, FileCredentialStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from("target");
    path.push("file-store-tests");
    fs::create_dir_all(&path).ok();
    path.push(name);
    fs::remove_file(&path).ok();
    path
}

#[test]
fn missing_file_reads_as_logged_out() {
    let store = FileCredentialStore::new(store_path("missing.json"));
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
    assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap(), None);
}

#[test]
fn tokens_survive_a_new_store_instance() {
    let path = store_path("persist.json");
    FileCredentialStore::new(&path)
        .store_pair("A", Some("R"))
        .unwrap();

    let reopened = FileCredentialStore::new(&path);
    assert_eq!(reopened.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("A"));
    assert_eq!(reopened.get(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("R"));
}

#[test]
fn clear_removes_the_file() {
    let path = store_path("clear.json");
    let store = FileCredentialStore::new(&path);
    store.store_pair("A", Some("R")).unwrap();
    assert!(path.exists());

    store.clear().unwrap();
    assert!(!path.exists());
    assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
}

#[test]
fn corrupt_file_is_reported() {
    let path = store_path("corrupt.json");
    fs::write(&path, "not json").unwrap();
    let store = FileCredentialStore::new(&path);
    assert!(store.get(ACCESS_TOKEN_KEY).is_err());
}

#[tokio::test]
async fn login_writes_through_to_disk() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "ok",
            "status": "success",
            "access_token": "A",
            "refresh_token": "R",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let path = store_path("login.json");
    let store = Arc::new(FileCredentialStore::new(&path));
    let client = AuthClient::new(Config::from_values(server.uri(), Some(5)), store).expect("client");
    client.login("ada@example.com", "pw").await.expect("login");

    let on_disk: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        on_disk,
        serde_json::json!({ "access_token": "A", "refresh_token": "R" })
    );
}

#[test]
fn stores_sharing_a_stem_keep_separate_files() {
    let json = store_path("shared.json");
    let yaml = store_path("shared.yaml");
    let json_store = FileCredentialStore::new(&json);
    let yaml_store = FileCredentialStore::new(&yaml);

    json_store.store_pair("A", Some("R")).unwrap();
    yaml_store.store_pair("B", Some("S")).unwrap();

    assert_eq!(json_store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("A"));
    assert_eq!(yaml_store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("B"));
    assert!(!json.with_extension("tmp").exists());
}
