//! EmailBisonClient against a local HTTP double

use bison_core::clients::{ApiRequest, ApiTransport, EmailBisonClient};
use bison_core::{BisonConfig, BisonError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> EmailBisonClient {
    EmailBisonClient::new(&BisonConfig::new(server.uri(), "secret-token")).unwrap()
}

#[tokio::test]
async fn test_requests_carry_bearer_token_under_api_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/leads/5"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 5}})))
        .expect(1)
        .mount(&server)
        .await;

    let body = client_for(&server).send(ApiRequest::get("/leads/5")).await.unwrap();
    assert_eq!(body, json!({"data": {"id": 5}}));
}

#[tokio::test]
async fn test_query_and_json_body_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/campaigns"))
        .and(query_param("limit", "10"))
        .and(query_param("status", "active"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tags"))
        .and(body_json(json!({"name": "vip", "default": false})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 1}})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .send(ApiRequest::get("/campaigns").query("limit", 10).query("status", "active"))
        .await
        .unwrap();
    let created = client
        .send(ApiRequest::post("/tags").json(json!({"name": "vip", "default": false})))
        .await
        .unwrap();
    assert_eq!(created["data"]["id"], 1);
}

#[tokio::test]
async fn test_error_status_maps_to_upstream_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/leads"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"message": "The email has already been taken."})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send(ApiRequest::post("/leads").json(json!({"email": "dup@example.com"})))
        .await
        .unwrap_err();

    match err {
        BisonError::Upstream { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "The email has already been taken.");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_soft_failure_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/tags/3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"success": false, "message": "Tag is in use."}})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).send(ApiRequest::delete("/tags/3")).await.unwrap_err();
    assert_eq!(err.status(), Some(200));
    assert!(err.to_string().contains("Tag is in use."));
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/webhooks/8"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let body = client_for(&server).send(ApiRequest::delete("/webhooks/8")).await.unwrap();
    assert!(body.is_null());
}

#[tokio::test]
async fn test_server_url_with_api_suffix_is_not_doubled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = BisonConfig::new(format!("{}/api/", server.uri()), "secret-token");
    let client = EmailBisonClient::new(&config).unwrap();
    client.send(ApiRequest::get("/tags")).await.unwrap();
}

#[tokio::test]
async fn test_verify_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 1, "name": "Owner"}})),
        )
        .mount(&server)
        .await;

    let body = client_for(&server).verify_credentials().await.unwrap();
    assert_eq!(body["data"]["name"], "Owner");
}

#[tokio::test]
async fn test_verify_credentials_rejects_bad_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).verify_credentials().await.unwrap_err();
    assert!(matches!(err, BisonError::Auth(_)));
    assert!(err.to_string().contains("Unauthenticated."));
}

#[tokio::test]
async fn test_verify_credentials_needs_data_member() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).verify_credentials().await.unwrap_err();
    assert!(matches!(err, BisonError::Auth(_)));
}

#[test]
fn test_client_requires_valid_config() {
    let missing_token = BisonConfig::new("https://send.example.com", " ");
    assert!(matches!(
        EmailBisonClient::new(&missing_token),
        Err(BisonError::Config(_))
    ));
}
