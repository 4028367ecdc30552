//! Notification dispatch handler.

use actix_web::{HttpResponse, web};
use tracing::info;

use super::validation::{MAX_BODY_BYTES, parse_json_body, read_body};
use crate::auth::CallerHeaders;
use crate::error::AppResult;
use crate::models::{
    NotificationPayload, NotificationRequestBody, SendNotificationRequest, SendNotificationResponse,
};
use crate::services::{CredentialVerifier, PermissionGate, UpstreamProxy};

/// Send a notification to mini app users.
///
/// The caller's API key must belong to the team owning `app_id`, and that
/// team must be allow-listed for the current stage.
#[utoipa::path(
    post,
    path = "/api/v2/minikit/send-notification",
    tag = "MiniKit",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Notification accepted", body = SendNotificationResponse),
        (status = 400, description = "Invalid request or environment", body = crate::error::ErrorEnvelope),
        (status = 401, description = "Missing, malformed, or invalid API key", body = crate::error::ErrorEnvelope),
        (status = 403, description = "Key inactive, app mismatch, or team not allowed", body = crate::error::ErrorEnvelope),
        (status = 404, description = "API key or app not found", body = crate::error::ErrorEnvelope),
        (status = 500, description = "Backend failure", body = crate::error::ErrorEnvelope),
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn send_notification(
    caller: CallerHeaders,
    verifier: web::Data<CredentialVerifier>,
    gate: web::Data<PermissionGate>,
    proxy: web::Data<UpstreamProxy>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let credential = verifier.extract_credential(caller.authorization.as_ref())?;

    let body = read_body(payload, MAX_BODY_BYTES).await?;
    let req = parse_json_body::<NotificationRequestBody>(&body)?.validate()?;

    let key = verifier.verify(&credential, &req.app_id).await?;
    let team_id = gate.authorize(&req.app_id).await?;

    let payload = NotificationPayload::from_request(req, proxy.max_notifications_per_day());
    proxy
        .send_notification(&payload, caller.user_agent.as_deref())
        .await?;

    info!(
        key_id = %key.id,
        team_id = %team_id,
        app_id = %payload.app_id,
        "Notification sent"
    );

    Ok(HttpResponse::Ok().json(SendNotificationResponse::ok()))
}

/// Configure notification routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/minikit/send-notification").route(web::post().to(send_notification)),
    );
}
