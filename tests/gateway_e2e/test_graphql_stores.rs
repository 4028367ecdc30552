//! E2E tests: GraphQL backed Key Store and metadata lookups.

use minikit_gateway_lib::config::GraphqlSettings;
use minikit_gateway_lib::services::{
    AppMetadataStore, GraphqlAppMetadataStore, GraphqlClient, GraphqlKeyStore, KeyStore,
};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use super::mock_services::{GRAPHQL_PATH, MockServices};
use super::test_helpers::*;

fn client(mocks: &MockServices) -> GraphqlClient {
    GraphqlClient::new(&GraphqlSettings {
        url: mocks.graphql_url(),
        service_token: SecretString::from(SERVICE_TOKEN.to_string()),
    })
}

/// Lookup sends the service token and both variables.
#[actix_rt::test]
async fn test_key_lookup_sends_service_token_and_variables() {
    let mocks = MockServices::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header("authorization", format!("Bearer {}", SERVICE_TOKEN).as_str()))
        .and(body_partial_json(json!({
            "operationName": "FetchAPIKey",
            "variables": { "id": "key_1", "appId": APP_ID }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "api_key_by_pk": {
                "id": "key_1",
                "api_key": "abc123",
                "is_active": true,
                "team": { "apps": [{ "id": APP_ID }] }
            } }
        })))
        .expect(1)
        .mount(&mocks.graphql)
        .await;

    let store = GraphqlKeyStore::new(client(&mocks));
    let record = store.fetch_api_key("key_1", APP_ID).await.unwrap().unwrap();

    assert_eq!(record.id, "key_1");
    assert_eq!(record.hashed_secret, "abc123");
    assert!(record.team_owns_app(APP_ID));
}

/// GraphQL `errors` surface as an internal error.
#[actix_rt::test]
async fn test_graphql_errors_are_internal() {
    let mocks = MockServices::start().await;
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "field not found" }]
        })))
        .mount(&mocks.graphql)
        .await;

    let store = GraphqlKeyStore::new(client(&mocks));
    let err = store.fetch_api_key("key_1", APP_ID).await.unwrap_err();

    assert_eq!(err.status_u16(), 500);
    assert_eq!(err.envelope().detail, "Internal server error.");
}

/// Metadata resolves the first row's team, and no rows means no team.
#[actix_rt::test]
async fn test_app_team_lookup() {
    let mocks = MockServices::start().await;
    mocks.mount_app_team(Some(TEAM_ID)).await;
    let store = GraphqlAppMetadataStore::new(client(&mocks));
    assert_eq!(
        store.fetch_app_team(APP_ID).await.unwrap().as_deref(),
        Some(TEAM_ID)
    );

    let empty = MockServices::start().await;
    empty.mount_app_team(None).await;
    let store = GraphqlAppMetadataStore::new(client(&empty));
    assert_eq!(store.fetch_app_team(APP_ID).await.unwrap(), None);
}
