//! E2E tests: notification dispatch through the signed backend call.

use minikit_gateway_lib::config::Stage;
use serde_json::{Value, json};

use super::mock_services::MockServices;
use super::test_helpers::*;

async fn authorized_mocks() -> (MockServices, minikit_gateway_lib::auth::GeneratedApiKey) {
    let mocks = MockServices::start().await;
    let key = new_key();
    mocks.mount_api_key(key_record(&key, true, &[APP_ID])).await;
    mocks.mount_app_team(Some(TEAM_ID)).await;
    (mocks, key)
}

/// Valid key, allowed team, backend 200 → `{success: true, status: 200}`.
#[actix_rt::test]
async fn test_send_notification_success() {
    let (mocks, key) = authorized_mocks().await;
    mocks
        .mount_notification_backend(200, json!({ "success": true }), 1)
        .await;
    let app = create_test_app(&mocks, Some(Stage::Staging)).await;

    let (status, body) = send_notification(&app, Some(bearer(&key).as_str()), &notification_body()).await;

    assert_eq!(status, 200, "unexpected body: {}", body);
    assert_eq!(body, json!({ "success": true, "status": 200 }));
}

/// The forwarded call is SigV4 signed and carries the backend payload shape.
#[actix_rt::test]
async fn test_forwarded_request_is_signed() {
    let (mocks, key) = authorized_mocks().await;
    mocks
        .mount_notification_backend(200, json!({ "success": true }), 1)
        .await;
    let app = create_test_app(&mocks, Some(Stage::Staging)).await;

    let (status, _) = send_notification(&app, Some(bearer(&key).as_str()), &notification_body()).await;
    assert_eq!(status, 200);

    let requests = mocks.backend.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let forwarded = &requests[0];

    let authorization = forwarded
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        authorization.starts_with("AWS4-HMAC-SHA256"),
        "unsigned request: {}",
        authorization
    );
    assert!(authorization.contains("/us-east-1/execute-api/aws4_request"));
    assert!(forwarded.headers.get("x-amz-date").is_some());
    assert_eq!(
        forwarded.headers.get("user-agent").and_then(|v| v.to_str().ok()),
        Some("DevPortal/1.0")
    );

    let payload: Value = serde_json::from_slice(&forwarded.body).unwrap();
    assert_eq!(payload["appId"], APP_ID);
    assert_eq!(
        payload["walletAddresses"][0],
        "0x377da9cab87c04a1d6f19d8b4be9aef8df26fcdd"
    );
    assert_eq!(payload["message"], "You have a new reward");
    assert_eq!(payload["maxNotificationsPerDay"], 1);
    assert_eq!(payload["isAllowedUnlimitedNotifications"], true);
}

/// Identical sends are forwarded independently.
#[actix_rt::test]
async fn test_repeated_sends_are_not_deduplicated() {
    let (mocks, key) = authorized_mocks().await;
    mocks
        .mount_notification_backend(200, json!({ "success": true }), 2)
        .await;
    let app = create_test_app(&mocks, Some(Stage::Staging)).await;

    for _ in 0..2 {
        let (status, body) =
            send_notification(&app, Some(bearer(&key).as_str()), &notification_body()).await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
    }
}

/// Backend 500 with a message → envelope keeps the message.
#[actix_rt::test]
async fn test_backend_failure_maps_to_envelope() {
    let (mocks, key) = authorized_mocks().await;
    mocks
        .mount_notification_backend(500, json!({ "error": { "message": "db down" } }), 1)
        .await;
    let app = create_test_app(&mocks, Some(Stage::Staging)).await;

    let (status, body) = send_notification(&app, Some(bearer(&key).as_str()), &notification_body()).await;

    assert_eq!(status, 500);
    assert_eq!(body["statusCode"], 500);
    assert_eq!(body["code"], "internal_api_error");
    assert_eq!(body["detail"], "db down");
}

/// Backend error without an `error` object → fallback detail.
#[actix_rt::test]
async fn test_backend_failure_without_error_object() {
    let (mocks, key) = authorized_mocks().await;
    mocks
        .mount_notification_backend(502, json!({ "message": "bad gateway" }), 1)
        .await;
    let app = create_test_app(&mocks, Some(Stage::Staging)).await;

    let (status, body) = send_notification(&app, Some(bearer(&key).as_str()), &notification_body()).await;

    assert_eq!(status, 502);
    assert_envelope(&body, 502, "internal_api_error", Some("notification"));
    assert_eq!(body["detail"], "Server Error Occured");
}

/// The caller's User-Agent replaces the default one.
#[actix_rt::test]
async fn test_inbound_user_agent_is_forwarded() {
    let (mocks, key) = authorized_mocks().await;
    mocks
        .mount_notification_backend(200, json!({ "success": true }), 1)
        .await;
    let app = create_test_app(&mocks, Some(Stage::Staging)).await;

    let req = actix_web::test::TestRequest::post()
        .uri("/api/v2/minikit/send-notification")
        .insert_header(("Authorization", bearer(&key)))
        .insert_header(("User-Agent", "MiniApp/3.1"))
        .set_json(notification_body())
        .to_request();
    let resp = actix_web::test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let requests = mocks.backend.received_requests().await.unwrap();
    assert_eq!(
        requests[0].headers.get("user-agent").and_then(|v| v.to_str().ok()),
        Some("MiniApp/3.1")
    );
}

/// Unreachable backend → 500 internal_api_error on `upstream`.
#[actix_rt::test]
async fn test_unreachable_backend_maps_to_envelope() {
    let (mocks, key) = authorized_mocks().await;
    let mut backend = backend_settings(&mocks);
    backend.notification_endpoint = closed_port_url("/notifications");
    let app = create_test_app_with_backend(&mocks, Some(Stage::Staging), backend).await;

    let (status, body) =
        send_notification(&app, Some(bearer(&key).as_str()), &notification_body()).await;

    assert_eq!(status, 500);
    assert_envelope(&body, 500, "internal_api_error", Some("upstream"));
    assert_eq!(body["detail"], "Upstream service unavailable.");
}

/// Thousands of recipients fit in one request.
#[actix_rt::test]
async fn test_large_wallet_list_is_accepted() {
    let (mocks, key) = authorized_mocks().await;
    mocks
        .mount_notification_backend(200, json!({ "success": true }), 1)
        .await;
    let app = create_test_app(&mocks, Some(Stage::Staging)).await;

    let wallets: Vec<String> = (0..7_000).map(|i| format!("0x{:040x}", i)).collect();
    let mut body = notification_body();
    body["wallet_addresses"] = json!(wallets);
    assert!(serde_json::to_vec(&body).unwrap().len() > 256 * 1024);

    let (status, body) = send_notification(&app, Some(bearer(&key).as_str()), &body).await;

    assert_eq!(status, 200, "unexpected body: {}", body);
    assert_eq!(body["success"], true);

    let requests = mocks.backend.received_requests().await.unwrap();
    let forwarded: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(forwarded["walletAddresses"].as_array().unwrap().len(), 7_000);
}

/// Bodies over the limit get the envelope, not a bare 413.
#[actix_rt::test]
async fn test_oversized_body_is_rejected_with_envelope() {
    let (mocks, key) = authorized_mocks().await;
    mocks.expect_no_backend_calls().await;
    let app = create_test_app(&mocks, Some(Stage::Staging)).await;

    let mut body = notification_body();
    body["message"] = json!("x".repeat(2 * 1024 * 1024));

    let (status, body) = send_notification(&app, Some(bearer(&key).as_str()), &body).await;

    assert_eq!(status, 400);
    assert_envelope(&body, 400, "invalid_request", None);
    assert_eq!(body["detail"], "Request body is too large.");
}

/// Stage and credential checks still run before the body is read.
#[actix_rt::test]
async fn test_oversized_body_without_key_is_unauthorized() {
    let mocks = MockServices::start().await;
    mocks.expect_no_graphql_calls().await;
    mocks.expect_no_backend_calls().await;
    let app = create_test_app(&mocks, Some(Stage::Staging)).await;

    let mut body = notification_body();
    body["message"] = json!("x".repeat(2 * 1024 * 1024));

    let (status, body) = send_notification(&app, None, &body).await;

    assert_eq!(status, 401);
    assert_envelope(&body, 401, "unauthorized", Some("api_key"));
}
