//! Notification permission gate.

use std::sync::Arc;

use tracing::warn;

use super::app_metadata::AppMetadataStore;
use crate::config::{NotificationPermissions, Stage};
use crate::error::{AppError, AppResult};

/// Checks that the team owning an app may send notifications in this stage.
#[derive(Clone)]
pub struct PermissionGate {
    stage: Option<Stage>,
    permissions: NotificationPermissions,
    metadata: Arc<dyn AppMetadataStore>,
}

impl PermissionGate {
    pub fn new(
        stage: Option<Stage>,
        permissions: NotificationPermissions,
        metadata: Arc<dyn AppMetadataStore>,
    ) -> Self {
        Self {
            stage,
            permissions,
            metadata,
        }
    }

    /// Resolve the owning team of `app_id` and check the allow-list.
    ///
    /// Returns the team id on success.
    pub async fn authorize(&self, app_id: &str) -> AppResult<String> {
        let stage = self.stage.ok_or(AppError::InvalidEnvironment)?;

        let team_id = self
            .metadata
            .fetch_app_team(app_id)
            .await?
            .ok_or_else(|| AppError::not_found("App not found.", "app_id"))?;

        if !self.permissions.allows(stage, &team_id) {
            warn!(team_id = %team_id, app_id, stage = %stage, "Team not allowed to send notifications");
            return Err(AppError::Forbidden {
                detail: "You are not allowed to send notifications.".to_string(),
                attribute: "team_id",
            });
        }

        Ok(team_id)
    }
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate")
            .field("stage", &self.stage)
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}
