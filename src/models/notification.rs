//! Notification request and upstream payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Validated body of `POST /api/v2/minikit/send-notification`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendNotificationRequest {
    pub app_id: String,
    #[serde(default)]
    pub wallet_addresses: Option<Vec<String>>,
    pub message: String,
    #[serde(default)]
    pub title: Option<String>,
    pub mini_app_path: String,
}

/// Decoded send-notification body before required fields are checked.
///
/// Every field is optional here so that a missing or `null` field is
/// reported on its own attribute by [`NotificationRequestBody::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationRequestBody {
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub wallet_addresses: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub mini_app_path: Option<String>,
}

fn required(value: Option<String>, attribute: &str) -> AppResult<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::invalid_request(
            format!("{} is a required field", attribute),
            attribute,
        )),
    }
}

impl NotificationRequestBody {
    /// Check required fields in declaration order; the first failure wins.
    pub fn validate(self) -> AppResult<SendNotificationRequest> {
        Ok(SendNotificationRequest {
            app_id: required(self.app_id, "app_id")?,
            wallet_addresses: self.wallet_addresses,
            message: required(self.message, "message")?,
            title: self.title,
            mini_app_path: required(self.mini_app_path, "mini_app_path")?,
        })
    }
}

/// Payload forwarded to the notification backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_addresses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: String,
    pub mini_app_path: String,
    pub max_notifications_per_day: u32,
    pub is_allowed_unlimited_notifications: bool,
}

impl NotificationPayload {
    pub fn from_request(req: SendNotificationRequest, max_notifications_per_day: u32) -> Self {
        Self {
            app_id: req.app_id,
            wallet_addresses: req.wallet_addresses,
            title: req.title,
            message: req.message,
            mini_app_path: req.mini_app_path,
            max_notifications_per_day,
            // Sending is restricted to allow-listed teams.
            is_allowed_unlimited_notifications: true,
        }
    }
}

/// Acknowledgement returned after the backend accepted a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SendNotificationResponse {
    pub success: bool,
    pub status: u16,
}

impl SendNotificationResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            status: 200,
        }
    }
}
