//! Upstream proxy to the internal notification and payments backends.
//!
//! Every call is made once. Backend failures are re-wrapped as
//! [`AppError::Upstream`] with the backend status passed through.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn};

use super::signed_http::{ProxyRequest, SignedHttpClient, UpstreamResponse};
use crate::config::{BackendSettings, DEFAULT_USER_AGENT};
use crate::error::{AppError, AppResult, INTERNAL_API_ERROR};
use crate::models::{NotificationPayload, TransactionType};

const NOTIFICATION_FALLBACK_DETAIL: &str = "Server Error Occured";
const TRANSACTION_FALLBACK_DETAIL: &str = "Transaction fetch to backend failed";

/// Map a failed backend answer to the uniform error.
///
/// The backend shapes errors as `{"error": {"message": ..., "code": ...}}`.
/// Each field is read on its own: a missing or non-string `message` falls
/// back to `fallback_detail`, a missing `code` to `internal_api_error`, and
/// a numeric `code` is rendered as text.
pub fn map_upstream_error(
    response: &UpstreamResponse,
    fallback_detail: &str,
    attribute: &'static str,
) -> AppError {
    let body = serde_json::from_slice::<Value>(&response.body).unwrap_or(Value::Null);
    let error = body.get("error");

    let detail = error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(fallback_detail)
        .to_string();

    let code = match error.and_then(|e| e.get("code")) {
        Some(Value::String(code)) => code.clone(),
        Some(Value::Number(code)) => code.to_string(),
        _ => INTERNAL_API_ERROR.to_string(),
    };

    AppError::Upstream {
        status: response.status,
        code,
        detail,
        attribute,
    }
}

/// Forwards validated requests to the internal backends.
#[derive(Clone)]
pub struct UpstreamProxy {
    client: Arc<dyn SignedHttpClient>,
    notification_endpoint: String,
    payments_endpoint: String,
    max_notifications_per_day: u32,
}

impl UpstreamProxy {
    pub fn new(client: Arc<dyn SignedHttpClient>, settings: &BackendSettings) -> Self {
        Self {
            client,
            notification_endpoint: settings.notification_endpoint.clone(),
            payments_endpoint: settings.payments_endpoint.trim_end_matches('/').to_string(),
            max_notifications_per_day: settings.max_notifications_per_day,
        }
    }

    /// Daily cap stamped on every forwarded notification.
    pub fn max_notifications_per_day(&self) -> u32 {
        self.max_notifications_per_day
    }

    /// Send a notification. The backend enforces daily limits; repeated
    /// identical sends are forwarded independently.
    pub async fn send_notification(
        &self,
        payload: &NotificationPayload,
        user_agent: Option<&str>,
    ) -> AppResult<()> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| AppError::Internal(format!("Failed to encode notification: {}", e)))?;

        let request = ProxyRequest::json(
            Method::POST,
            self.notification_endpoint.clone(),
            user_agent.unwrap_or(DEFAULT_USER_AGENT),
        )
        .with_body(body);

        let response = self.client.execute(request).await?;

        if !response.is_success() {
            warn!(
                app_id = %payload.app_id,
                status = response.status,
                body = %String::from_utf8_lossy(&response.body),
                "Error sending notification"
            );
            return Err(map_upstream_error(
                &response,
                NOTIFICATION_FALLBACK_DETAIL,
                "notification",
            ));
        }

        info!(app_id = %payload.app_id, "Notification accepted by backend");
        Ok(())
    }

    /// URL of the backend lookup for a transaction.
    pub fn transaction_url(
        &self,
        app_id: &str,
        transaction_id: &str,
        kind: TransactionType,
    ) -> String {
        format!(
            "{}/{}?miniapp-id={}&transaction-id={}",
            self.payments_endpoint,
            kind.backend_path(),
            urlencoding::encode(app_id),
            urlencoding::encode(transaction_id)
        )
    }

    /// Look up a transaction and return its first backend record.
    pub async fn fetch_transaction(
        &self,
        app_id: &str,
        transaction_id: &str,
        kind: TransactionType,
        user_agent: Option<&str>,
    ) -> AppResult<Value> {
        let request = ProxyRequest::json(
            Method::GET,
            self.transaction_url(app_id, transaction_id, kind),
            user_agent.unwrap_or(DEFAULT_USER_AGENT),
        );

        let response = self.client.execute(request).await?;

        if !response.is_success() {
            warn!(
                app_id,
                transaction_id,
                status = response.status,
                body = %String::from_utf8_lossy(&response.body),
                "Error fetching transaction data"
            );
            return Err(map_upstream_error(
                &response,
                TRANSACTION_FALLBACK_DETAIL,
                "transaction",
            ));
        }

        let data: Value = serde_json::from_slice(&response.body).map_err(|e| {
            warn!(app_id, transaction_id, "Backend returned invalid JSON: {}", e);
            AppError::Upstream {
                status: 500,
                code: INTERNAL_API_ERROR.to_string(),
                detail: TRANSACTION_FALLBACK_DETAIL.to_string(),
                attribute: "transaction",
            }
        })?;

        first_transaction(data)
            .ok_or_else(|| AppError::not_found("Transaction not found.", "transaction"))
    }
}

/// First element of `result.transactions`, if any.
fn first_transaction(mut data: Value) -> Option<Value> {
    data.pointer_mut("/result/transactions/0").map(Value::take)
}

impl std::fmt::Debug for UpstreamProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamProxy")
            .field("notification_endpoint", &self.notification_endpoint)
            .field("payments_endpoint", &self.payments_endpoint)
            .finish_non_exhaustive()
    }
}
