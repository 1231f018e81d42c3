//! Backend client tests against a mock motor backend.

use motorctl::client::{ApiClient, ApiError, CountUnauthorized, ForcedRedirect, Motor};
use motorctl::session::SessionStore;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn status_body() -> serde_json::Value {
    json!({
        "tilt": {"status": "idle", "is_moving": false, "movement_type": null, "position": 0.0, "initialized": true},
        "rotary": {"status": "moving", "is_moving": true, "movement_type": "rotate", "position": 90.0, "initialized": true},
        "peristaltic": {"status": "idle", "is_moving": false, "movement_type": null, "position": null, "initialized": false}
    })
}

fn client_for(server: &MockServer, session: &SessionStore) -> (ApiClient, CountUnauthorized) {
    let counter = CountUnauthorized::new();
    let client = ApiClient::new(&server.uri(), session.clone(), Arc::new(counter.clone())).unwrap();
    (client, counter)
}

#[tokio::test]
async fn test_bearer_token_attached_when_session_exists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    session.set_token("tok-123").unwrap();
    let (client, counter) = client_for(&server, &session);

    let status = client.general_status().await.unwrap();
    assert_eq!(status.moving(), vec![Motor::Rotary]);
    assert_eq!(counter.count(), 0);
    assert!(session.has_session());
}

#[tokio::test]
async fn test_no_authorization_header_without_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let (client, _) = client_for(&server, &session);
    client.general_status().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_notifies_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tilt/status"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    session.set_token("stale").unwrap();
    let (client, counter) = client_for(&server, &session);

    let err = client.motor_status(Motor::Tilt).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.status(), Some(401));
    assert!(!session.has_session());
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_unauthorized_without_session_still_notifies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let redirect = ForcedRedirect::new();
    let client = ApiClient::new(&server.uri(), session.clone(), Arc::new(redirect.clone())).unwrap();

    assert!(client.general_status().await.is_err());
    assert!(redirect.take());
    // The request is consumed by take()
    assert!(!redirect.is_requested());
}

#[tokio::test]
async fn test_server_error_is_not_treated_as_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rotate/stop-rotate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("driver fault"))
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    session.set_token("tok").unwrap();
    let (client, counter) = client_for(&server, &session);

    let err = client.stop(Motor::Rotary).await.unwrap_err();
    match err {
        ApiError::Status { status, ref body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "driver fault");
        }
        other => panic!("expected status error, got {:?}", other),
    }
    assert!(session.has_session());
    assert_eq!(counter.count(), 0);
}

#[tokio::test]
async fn test_login_persists_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("username=alice"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh", "token_type": "bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let (client, _) = client_for(&server, &session);

    let response = client.login("alice", "secret").await.unwrap();
    assert_eq!(response.token_type, "bearer");
    assert_eq!(session.token().as_deref(), Some("fresh"));

    client.logout().unwrap();
    assert!(!session.has_session());
}

#[tokio::test]
async fn test_rejected_login_leaves_no_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "bad credentials"})))
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let (client, counter) = client_for(&server, &session);

    assert!(client.login("alice", "wrong").await.unwrap_err().is_unauthorized());
    assert!(!session.has_session());
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_stop_each_motor_hits_its_endpoint() {
    let server = MockServer::start().await;
    for endpoint in ["/tilt/stop-tilt", "/rotate/stop-rotate", "/peristaltic/stop-rotate"] {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "stopped"})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let session = SessionStore::in_memory();
    session.set_token("tok").unwrap();
    let (client, _) = client_for(&server, &session);

    for motor in Motor::ALL {
        let ack = client.stop(motor).await.unwrap();
        assert!(ack.success);
    }
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let (client, _) = client_for(&server, &session);

    let err = client.general_status().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/backend/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/backend/tilt/stop-tilt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "stopped"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    session.set_token("tok").unwrap();
    let client = ApiClient::new(
        &format!("{}/backend", server.uri()),
        session,
        Arc::new(CountUnauthorized::new()),
    )
    .unwrap();
    assert_eq!(client.base_url().path(), "/backend/");

    client.general_status().await.unwrap();
    assert!(client.stop(Motor::Tilt).await.unwrap().success);

    let requests = server.received_requests().await.unwrap();
    let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
    assert_eq!(paths, vec!["/backend/api/status", "/backend/tilt/stop-tilt"]);
}

#[test]
fn test_invalid_base_url_rejected() {
    let result = ApiClient::new(
        "not a url",
        SessionStore::in_memory(),
        Arc::new(CountUnauthorized::new()),
    );
    assert!(result.is_err());
}
