//! E2E tests: notification permission gate.

use minikit_gateway_lib::config::Stage;

use super::mock_services::MockServices;
use super::test_helpers::*;

/// Team outside the allow-list → 403 forbidden, backend untouched.
#[actix_rt::test]
async fn test_team_not_on_allow_list_forbidden() {
    let mocks = MockServices::start().await;
    let key = new_key();
    mocks.mount_api_key(key_record(&key, true, &[APP_ID])).await;
    mocks.mount_app_team(Some("team_not_listed")).await;
    mocks.expect_no_backend_calls().await;
    let app = create_test_app(&mocks, Some(Stage::Production)).await;

    let (status, body) = send_notification(&app, Some(bearer(&key).as_str()), &notification_body()).await;

    assert_eq!(status, 403);
    assert_envelope(&body, 403, "forbidden", Some("team_id"));
    assert_eq!(body["detail"], "You are not allowed to send notifications.");
}

/// App without metadata → 404 on app_id.
#[actix_rt::test]
async fn test_app_without_metadata_not_found() {
    let mocks = MockServices::start().await;
    let key = new_key();
    mocks.mount_api_key(key_record(&key, true, &[APP_ID])).await;
    mocks.mount_app_team(None).await;
    mocks.expect_no_backend_calls().await;
    let app = create_test_app(&mocks, Some(Stage::Production)).await;

    let (status, body) = send_notification(&app, Some(bearer(&key).as_str()), &notification_body()).await;

    assert_eq!(status, 404);
    assert_envelope(&body, 404, "not_found", Some("app_id"));
}

/// Credential failures win over the gate: metadata is never queried.
#[actix_rt::test]
async fn test_gate_runs_after_verification() {
    let mocks = MockServices::start().await;
    let key = new_key();
    mocks.mount_api_key(key_record(&key, false, &[APP_ID])).await;
    mocks.mount_app_team(Some("team_not_listed")).await;
    mocks.expect_no_backend_calls().await;
    let app = create_test_app(&mocks, Some(Stage::Dev)).await;

    let (status, body) = send_notification(&app, Some(bearer(&key).as_str()), &notification_body()).await;

    assert_eq!(status, 400);
    assert_envelope(&body, 400, "api_key_inactive", Some("api_key"));

    let requests = mocks.graphql.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "only the key lookup should run");
}
