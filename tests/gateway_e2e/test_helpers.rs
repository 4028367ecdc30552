//! Shared test helpers for gateway E2E tests.

use std::sync::Arc;

use actix_web::{App, dev::ServiceResponse, test, web};
use aws_credential_types::Credentials;
use aws_credential_types::provider::SharedCredentialsProvider;
use minikit_gateway_lib::api;
use minikit_gateway_lib::auth::{GeneratedApiKey, generate_api_key};
use minikit_gateway_lib::config::{
    BackendSettings, GraphqlSettings, NotificationPermissions, Stage,
};
use minikit_gateway_lib::services::{
    CredentialVerifier, GraphqlAppMetadataStore, GraphqlClient, GraphqlKeyStore, PermissionGate,
    SigV4HttpClient, UpstreamProxy,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use super::mock_services::MockServices;

pub const GENERAL_SECRET_KEY: &str = "test-general-secret-key";
pub const SERVICE_TOKEN: &str = "test-service-token";
pub const APP_ID: &str = "app_staging_0123456789";
pub const TEAM_ID: &str = "team_allowed";
pub const REGION: &str = "us-east-1";

pub fn general_secret() -> SecretString {
    SecretString::from(GENERAL_SECRET_KEY.to_string())
}

/// A key minted with the test secret.
pub fn new_key() -> GeneratedApiKey {
    generate_api_key(&general_secret()).unwrap()
}

/// Bearer header value for `key`.
pub fn bearer(key: &GeneratedApiKey) -> String {
    format!("Bearer {}", key.token.expose_secret())
}

/// Key Store row for `key`.
pub fn key_record(key: &GeneratedApiKey, is_active: bool, apps: &[&str]) -> Value {
    json!({
        "id": key.id,
        "api_key": key.hashed_secret,
        "is_active": is_active,
        "team": { "apps": apps.iter().map(|id| json!({ "id": id })).collect::<Vec<_>>() }
    })
}

/// Minimal valid notification body for `APP_ID`.
pub fn notification_body() -> Value {
    json!({
        "app_id": APP_ID,
        "wallet_addresses": ["0x377da9cab87c04a1d6f19d8b4be9aef8df26fcdd"],
        "title": "Hello",
        "message": "You have a new reward",
        "mini_app_path": format!("worldapp://mini-app?app_id={}", APP_ID)
    })
}

/// Backend settings pointing at the mock backend.
pub fn backend_settings(mocks: &MockServices) -> BackendSettings {
    BackendSettings {
        notification_endpoint: mocks.notification_url(),
        payments_endpoint: mocks.payments_url(),
        region: REGION.to_string(),
        max_notifications_per_day: 1,
    }
}

/// Create the gateway with `TEAM_ID` allow-listed for `stage`.
pub async fn create_test_app(
    mocks: &MockServices,
    stage: Option<Stage>,
) -> impl actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    create_test_app_with_backend(mocks, stage, backend_settings(mocks)).await
}

/// Create the gateway with explicit backend settings.
pub async fn create_test_app_with_backend(
    mocks: &MockServices,
    stage: Option<Stage>,
    backend: BackendSettings,
) -> impl actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    let graphql = GraphqlClient::new(&GraphqlSettings {
        url: mocks.graphql_url(),
        service_token: SecretString::from(SERVICE_TOKEN.to_string()),
    });

    let mut permissions = NotificationPermissions::new();
    for allowed in Stage::ALL {
        permissions = permissions.allow(allowed, TEAM_ID);
    }

    let credentials = SharedCredentialsProvider::new(Credentials::new(
        "AKIDTESTGATEWAY",
        "test-secret-access-key",
        None,
        None,
        "gateway-e2e",
    ));

    let verifier = CredentialVerifier::new(
        stage,
        general_secret(),
        Arc::new(GraphqlKeyStore::new(graphql.clone())),
    );
    let gate = PermissionGate::new(
        stage,
        permissions,
        Arc::new(GraphqlAppMetadataStore::new(graphql)),
    );
    let proxy = UpstreamProxy::new(
        Arc::new(SigV4HttpClient::new(credentials, REGION)),
        &backend,
    );

    test::init_service(
        App::new()
            .app_data(web::Data::new(verifier))
            .app_data(web::Data::new(gate))
            .app_data(web::Data::new(proxy))
            .configure(api::configure),
    )
    .await
}

/// POST a notification body with an optional `Authorization` header.
pub async fn send_notification<S>(app: &S, authorization: Option<&str>, body: &Value) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut req = test::TestRequest::post()
        .uri("/api/v2/minikit/send-notification")
        .set_json(body);
    if let Some(value) = authorization {
        req = req.insert_header(("Authorization", value));
    }

    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status().as_u16();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

/// URL on a local port nothing listens on.
pub fn closed_port_url(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, path)
}

/// Assert `body` is the error envelope with `status`, `code` and `attribute`.
pub fn assert_envelope(body: &Value, status: u16, code: &str, attribute: Option<&str>) {
    assert_eq!(body["statusCode"], status, "unexpected envelope: {}", body);
    assert_eq!(body["code"], code, "unexpected envelope: {}", body);
    assert!(body["detail"].is_string(), "missing detail: {}", body);
    match attribute {
        Some(attr) => assert_eq!(body["attribute"], attr, "unexpected envelope: {}", body),
        None => assert!(body["attribute"].is_null(), "unexpected envelope: {}", body),
    }
}
