//! Integration tests for the back-office HTTP client

use corretaje_core::{AuthBackend, BackendError, LoginRequest};
use corretaje_http::{ApiClient, ClientError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({
        "header": { "timestamp": "2024-05-01T10:00:00Z" },
        "body": { "data": data },
        "status": { "code": 200, "success": true }
    })
}

fn login_request() -> LoginRequest {
    LoginRequest {
        id_token: "firebase-id-token".to_string(),
        email: "ana@corretaje.test".to_string(),
        password: "secret".to_string(),
    }
}

#[tokio::test]
async fn test_client_builder_requires_api_host() {
    let result = ApiClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_login_posts_credentials_and_unwraps_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "idToken": "firebase-id-token",
            "email": "ana@corretaje.test",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "token": "h.p.s",
            "companias": [{ "id": "a1", "companiaCorretajeId": "c1", "rol": "Agente" }],
            "needsSelection": true,
            "isSuperAdmin": false
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let payload = client.login(&login_request()).await.unwrap();

    assert_eq!(payload.token, "h.p.s");
    assert_eq!(payload.needs_selection, Some(true));
    assert_eq!(payload.is_super_admin, Some(false));
    assert_eq!(payload.companias.len(), 1);
    assert_eq!(payload.companias[0].rol.as_deref(), Some("Agente"));
}

#[tokio::test]
async fn test_login_does_not_send_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "token": "h.p.s"
        }))))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    client.login(&login_request()).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_select_company_sends_bearer_and_company_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/select/company"))
        .and(header("authorization", "Bearer pending-token"))
        .and(body_json(json!({ "companiaId": "c7" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "token": "scoped-token"
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let payload = client.select_company("pending-token", "c7").await.unwrap();
    assert_eq!(payload.token, "scoped-token");
}

#[tokio::test]
async fn test_list_associations_accepts_envelope_and_bare_array() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/me/associations"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "compania": { "id": "c1", "nombre": "Seguros Norte" } },
            { "compania": 42 },
            { "companiaCorretajeId": 9 }
        ]))))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let records = client.list_associations("tok").await.unwrap();
    assert_eq!(records.len(), 2);

    let bare_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me/associations"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "companiaCorretajeId": "c2", "companiaNombre": "Sur" }])),
        )
        .mount(&bare_server)
        .await;

    let client = ApiClient::new(bare_server.uri()).unwrap();
    let records = client.list_associations("tok").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].compania_nombre.as_deref(), Some("Sur"));
}

#[tokio::test]
async fn test_error_handling() {
    let mock_server = MockServer::start().await;

    // Test 401 Unauthorized
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();

    let result = client.login(&login_request()).await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));

    // Same failure seen through the backend trait
    let result = AuthBackend::login(&client, &login_request()).await;
    assert!(matches!(
        result,
        Err(BackendError::Rejected { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_unsuccessful_envelope_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/select/company"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": { "message": "Compañía no asociada" },
            "status": { "code": 422, "success": false }
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let result = client.select_company("tok", "c1").await;

    match result {
        Err(ClientError::ServerError { status, message }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "Compañía no asociada");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_request_url_only_authorizes_api_host() {
    let api_server = MockServer::start().await;
    let external_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&external_server)
        .await;

    let client = ApiClient::new(api_server.uri()).unwrap();
    let url = format!("{}/files/report.pdf", external_server.uri());
    let request = client.request_url(reqwest::Method::GET, &url, Some("tok"));
    let _: serde_json::Value = client.execute(request).await.unwrap();

    let requests = external_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}
