//! API key record as held by the Key Store.

use serde::{Deserialize, Serialize};

/// Reference to an app owned by a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRef {
    pub id: String,
}

/// Team owning an API key, with the apps relevant to the lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTeam {
    #[serde(default)]
    pub apps: Vec<AppRef>,
}

/// API key stored in the Key Store. Read-only for the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    /// Key id, the lookup key of a credential
    pub id: String,
    /// Hex HMAC of the secret
    #[serde(rename = "api_key")]
    pub hashed_secret: String,
    pub is_active: bool,
    pub team: KeyTeam,
}

impl ApiKeyRecord {
    /// Check if the owning team owns `app_id`.
    pub fn team_owns_app(&self, app_id: &str) -> bool {
        self.team.apps.iter().any(|app| app.id == app_id)
    }
}
