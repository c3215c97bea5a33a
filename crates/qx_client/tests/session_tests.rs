//! Session, login and retry engine tests against a mock QX API.

use qx_client::{DialOptions, QxError, Session};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options_for(server: &MockServer) -> DialOptions {
    DialOptions::new()
        .with_api_url(format!("{}/api", server.uri()))
        .with_retry_backoff(Duration::ZERO)
}

fn login_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": token,
        "userId": "user-1",
        "ttl": 1209600,
        "created": "2018-03-01T10:00:00.000Z"
    }))
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_with_api_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/loginWithToken"))
        .and(body_json(json!({"apiToken": "api-token"})))
        .and(header("content-type", "application/json"))
        .respond_with(login_response("access-1"))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::dial(options_for(&server).with_api_token("api-token"))
        .await
        .unwrap();

    assert_eq!(session.access_token().await, "access-1");
    assert_eq!(session.user_id().await, "user-1");
}

#[tokio::test]
async fn test_login_with_email_and_password() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .and(body_json(json!({"email": "me@example.com", "password": "secret"})))
        .respond_with(login_response("access-2"))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::dial(options_for(&server).with_login_info("me@example.com", "secret"))
        .await
        .unwrap();

    assert_eq!(session.access_token().await, "access-2");
}

#[tokio::test]
async fn test_access_info_skips_login() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(login_response("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let session = Session::dial(
        options_for(&server)
            .with_api_token("api-token")
            .with_access_info("access", "user-9"),
    )
    .await
    .unwrap();

    assert_eq!(session.access_token().await, "access");
    assert_eq!(session.user_id().await, "user-9");
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/loginWithToken"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = Session::dial(options_for(&server).with_api_token("bad-token"))
        .await
        .unwrap_err();
    assert!(matches!(err, QxError::Credentials(_)));
}

#[tokio::test]
async fn test_login_without_token_in_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/loginWithToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"userId": "user-1"})))
        .mount(&server)
        .await;

    let err = Session::dial(options_for(&server).with_api_token("api-token"))
        .await
        .unwrap_err();
    assert!(matches!(err, QxError::Credentials(_)));
}

#[tokio::test]
async fn test_missing_credentials_sends_nothing() {
    let server = MockServer::start().await;

    let err = Session::dial(options_for(&server)).await.unwrap_err();
    assert!(matches!(err, QxError::Credentials(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_client_application_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/loginWithToken"))
        .and(header("x-qx-client-application", "qx-client-rs:notebook"))
        .respond_with(login_response("access-1"))
        .expect(1)
        .mount(&server)
        .await;

    assert_ok!(
        Session::dial(
            options_for(&server)
                .with_api_token("api-token")
                .with_client_application("notebook"),
        )
        .await
    );
}

#[tokio::test]
async fn test_network_error_not_retried() {
    let options = DialOptions::new()
        .with_api_url("http://127.0.0.1:1/api")
        .with_api_token("api-token")
        .with_retry_backoff(Duration::ZERO);

    let err = Session::dial(options).await.unwrap_err();
    assert!(matches!(err, QxError::Http(_)));
}

// =============================================================================
// Retry engine
// =============================================================================

async fn session_with_access(server: &MockServer, retries: usize) -> Session {
    Session::dial(
        options_for(server)
            .with_access_info("access", "user-1")
            .with_retries(retries),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_retries_until_ok() {
    let server = MockServer::start().await;
    let failures = 3;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(failures)
        .expect(failures)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .and(query_param("access_token", "access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(2)))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_with_access(&server, 5).await;
    let version: Value = session.get("version", &[]).await.unwrap();
    assert_eq!(version, json!(2));

    assert_eq!(
        server.received_requests().await.unwrap().len(),
        failures as usize + 1
    );
}

#[tokio::test]
async fn test_retries_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Backends"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(3)
        .mount(&server)
        .await;

    let session = session_with_access(&server, 3).await;
    let err = session.get::<Value>("Backends", &[]).await.unwrap_err();
    assert!(matches!(err, QxError::Api(_)));
}

#[tokio::test]
async fn test_default_retry_count() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Backends"))
        .respond_with(ResponseTemplate::new(503))
        .expect(5)
        .mount(&server)
        .await;

    let session = Session::dial(options_for(&server).with_access_info("access", "user-1"))
        .await
        .unwrap();
    assert_err!(session.get::<Value>("Backends", &[]).await);
}

#[tokio::test]
async fn test_register_size_structured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/codes/execute"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "name": "Error",
                "status": 400,
                "message": "The qubits of the register exceed the number of qubits, it can't be greater than 5",
                "statusCode": 400,
                "code": "REGISTER_SIZE_EXCEEDED"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_with_access(&server, 5).await;
    let err = session
        .post::<Value, _>("codes/execute", &[], &json!({"qasm": "qreg q[16];"}))
        .await
        .unwrap_err();

    assert!(matches!(err, QxError::RegisterSize { max_qubits: 5 }));
}

#[tokio::test]
async fn test_register_size_raw_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/codes/execute"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            "Error: register exceed the number of qubits, it can't be greater than 16",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_with_access(&server, 5).await;
    let err = session
        .post::<Value, _>("codes/execute", &[], &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, QxError::RegisterSize { max_qubits: 16 }));
}

#[tokio::test]
async fn test_query_params_follow_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Backends/ibmqx4/queue/status"))
        .and(query_param("access_token", "access"))
        .and(query_param("withToken", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"state": true})))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_with_access(&server, 1).await;
    let status: Value = session
        .get(
            "Backends/ibmqx4/queue/status",
            &[("withToken", "false".to_string())],
        )
        .await
        .unwrap();
    assert_eq!(status["state"], json!(true));
}

#[tokio::test]
async fn test_put_sends_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/Codes/code-1"))
        .and(query_param("access_token", "access"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "renamed"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "code-1", "name": "renamed"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = session_with_access(&server, 1).await;
    let code: Value = session
        .put("Codes/code-1", &[], &json!({"name": "renamed"}))
        .await
        .unwrap();
    assert_eq!(code["name"], "renamed");
}

#[tokio::test]
async fn test_put_retried_like_other_verbs() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/Codes/code-1"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let session = session_with_access(&server, 2).await;
    let err = session
        .put::<Value, _>("Codes/code-1", &[], &json!({"name": "renamed"}))
        .await
        .unwrap_err();
    assert!(matches!(err, QxError::Api(_)));
}

/// Serve error responses whose body is cut short, counting connections
async fn truncated_error_server() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\n\
                      content-length: 100\r\n\
                      connection: close\r\n\r\ncut",
                )
                .await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}/api"), hits)
}

#[tokio::test]
async fn test_unreadable_error_body_counts_as_attempt() {
    let (api_url, hits) = truncated_error_server().await;

    let session = Session::dial(
        DialOptions::new()
            .with_api_url(api_url)
            .with_access_info("access", "user-1")
            .with_retries(3)
            .with_retry_backoff(Duration::ZERO),
    )
    .await
    .unwrap();

    let err = session.get::<Value>("version", &[]).await.unwrap_err();
    assert!(matches!(err, QxError::Api(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

// =============================================================================
// Re-authentication
// =============================================================================

async fn reauth_session(server: &MockServer, retries: usize) -> Session {
    Session::dial(
        options_for(server)
            .with_api_token("api-token")
            .with_access_info("stale", "user-1")
            .with_retries(retries),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_single_reauth_on_401() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .and(query_param("access_token", "stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/users/loginWithToken"))
        .respond_with(login_response("fresh"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .and(query_param("access_token", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(1.5)))
        .expect(1)
        .mount(&server)
        .await;

    let session = reauth_session(&server, 1).await;
    let version: f64 = session.get("version", &[]).await.unwrap();

    assert_eq!(version, 1.5);
    assert_eq!(session.access_token().await, "fresh");
}

#[tokio::test]
async fn test_persistent_401_is_bounded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(401))
        .expect(4)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/users/loginWithToken"))
        .respond_with(login_response("fresh"))
        .expect(1)
        .mount(&server)
        .await;

    let session = reauth_session(&server, 3).await;
    let err = session.get::<Value>("version", &[]).await.unwrap_err();
    assert!(matches!(err, QxError::Api(_)));
}

#[tokio::test]
async fn test_401_without_login_material() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_with_access(&server, 5).await;
    let err = session.get::<Value>("version", &[]).await.unwrap_err();
    assert!(matches!(err, QxError::Credentials(_)));
}

#[tokio::test]
async fn test_concurrent_401s_share_one_login() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .and(query_param("access_token", "stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/users/loginWithToken"))
        .respond_with(login_response("fresh"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/version"))
        .and(query_param("access_token", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(1)))
        .expect(4)
        .mount(&server)
        .await;

    let session = Arc::new(reauth_session(&server, 2).await);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let session = session.clone();
            tokio::spawn(async move { session.get::<Value>("version", &[]).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), json!(1));
    }
}
