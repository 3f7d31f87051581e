// Integration tests for `ProvisionClient` using wiremock.
#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use passweave_api::{Error, ProvisionClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ProvisionClient) {
    let server = MockServer::start().await;
    let client = ProvisionClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_create_instance() {
    let (server, client) = setup().await;

    let body = json!({
        "id": "a1b2c3d4",
        "type": "server",
        "url": "server://0.0.0.0:10001/0.0.0.0:8080?log=info",
        "status": "running"
    });

    Mock::given(method("POST"))
        .and(path("/instances"))
        .and(body_json(json!({
            "url": "server://0.0.0.0:10001/0.0.0.0:8080?log=info"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(&body))
        .mount(&server)
        .await;

    let created = client
        .create_instance("server://0.0.0.0:10001/0.0.0.0:8080?log=info")
        .await
        .unwrap();

    assert_eq!(created.id, "a1b2c3d4");
    assert_eq!(created.kind, "server");
    assert_eq!(created.status.as_deref(), Some("running"));
}

#[tokio::test]
async fn test_create_instance_sends_bearer_token() {
    let server = MockServer::start().await;
    let client =
        ProvisionClient::from_token(&server.uri(), &SecretString::from("s3cret".to_owned()))
            .unwrap();

    Mock::given(method("POST"))
        .and(path("/instances"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "e5f6",
            "type": "client"
        })))
        .mount(&server)
        .await;

    let created = client
        .create_instance("client://host:10001/127.0.0.1:8000")
        .await
        .unwrap();

    assert_eq!(created.id, "e5f6");
    assert_eq!(created.kind, "client");
    assert!(created.url.is_none());
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let server = MockServer::start().await;
    let root = format!("{}/api/v1", server.uri());
    let client = ProvisionClient::from_reqwest(&root, reqwest::Client::new()).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/instances/a1b2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "a1b2",
            "type": "server"
        })))
        .mount(&server)
        .await;

    let instance = client.get_instance("a1b2").await.unwrap();
    assert_eq!(instance.id, "a1b2");
}

// ── Error-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/instances"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.create_instance("server://a:1/b:2").await.unwrap_err();
    assert!(matches!(err, Error::InvalidToken));
}

#[tokio::test]
async fn test_structured_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/instances"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid url scheme" })),
        )
        .mount(&server)
        .await;

    let err = client.create_instance("bogus://x/y").await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid url scheme");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_multibyte_body_survives_preview_truncation() {
    let (server, client) = setup().await;

    // Byte 200 lands inside a 3-byte character.
    let body = format!("{}→→→→", "x".repeat(199));
    Mock::given(method("POST"))
        .and(path("/instances"))
        .respond_with(ResponseTemplate::new(201).set_body_string(body))
        .mount(&server)
        .await;

    let err = client.create_instance("server://a:1/b:2").await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/instances"))
        .respond_with(ResponseTemplate::new(201).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.create_instance("server://a:1/b:2").await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
}
