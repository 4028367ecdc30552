//! Domain models for the MiniKit gateway.

pub mod api_key;
pub mod notification;
pub mod transaction;

// Re-export commonly used types
pub use api_key::{ApiKeyRecord, AppRef, KeyTeam};
pub use notification::{
    NotificationPayload, NotificationRequestBody, SendNotificationRequest, SendNotificationResponse,
};
pub use transaction::{TransactionQuery, TransactionType};
