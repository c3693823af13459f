mod common;

use chat_auth_client::SessionEvent;
use common::{auth_ok, client_with_tokens, tokens};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn expired_token_is_refreshed_and_request_replayed_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("Authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("Authorization", "Bearer refresh R"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access_token": "B" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("Authorization", "Bearer B"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id":1}]"#))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_tokens(&server.uri(), Some("A"), Some("R"));
    let resp = client.get("/orders").await.expect("replayed request should succeed");

    assert_eq!(resp.text(), r#"[{"id":1}]"#);
    assert_eq!(tokens(&store), (Some("B".into()), Some("R".into())));
}

#[tokio::test]
async fn replay_keeps_method_path_and_body() {
    let server = MockServer::start().await;
    let payload = serde_json::json!({ "text": "hello" });

    Mock::given(method("PUT"))
        .and(path("/api/messages/9"))
        .and(header("Authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(auth_ok("B", Some("R2"), 900))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/messages/9"))
        .and(header("Authorization", "Bearer B"))
        .and(wiremock::matchers::body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with_tokens(&server.uri(), Some("A"), Some("R"));
    let mut events = client.subscribe();
    client
        .put_json("/api/messages/9", &payload)
        .await
        .expect("replayed request should succeed");

    assert_eq!(tokens(&store), (Some("B".into()), Some("R2".into())));
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Refreshed);
    assert!(events.try_recv().is_err(), "no further session events expected");
}

#[tokio::test]
async fn unauthenticated_request_with_refresh_token_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("Authorization", "Bearer B"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(auth_ok("B", None, 900))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client_with_tokens(&server.uri(), None, Some("R"));
    client
        .get("/api/users/me")
        .await
        .expect("request should succeed after refresh");
}
