//! API key verification.
//!
//! Steps run in a fixed order and the first failure wins:
//! stage configured, bearer token present and decodable, key exists,
//! key active, team owns the app, secret matches the stored hash.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use super::key_store::KeyStore;
use crate::auth::{ApiCredential, bearer_token, verify_hashed_secret};
use crate::config::Stage;
use crate::error::{AppError, AppResult};
use crate::models::ApiKeyRecord;

/// Verifies caller API keys against the Key Store.
#[derive(Clone)]
pub struct CredentialVerifier {
    stage: Option<Stage>,
    general_secret_key: SecretString,
    key_store: Arc<dyn KeyStore>,
}

impl CredentialVerifier {
    pub fn new(
        stage: Option<Stage>,
        general_secret_key: SecretString,
        key_store: Arc<dyn KeyStore>,
    ) -> Self {
        Self {
            stage,
            general_secret_key,
            key_store,
        }
    }

    /// Deployment stage, or the configuration error every request gets
    /// while it is unset.
    pub fn stage(&self) -> AppResult<Stage> {
        self.stage.ok_or(AppError::InvalidEnvironment)
    }

    /// Decode the caller credential without any I/O.
    pub fn extract_credential(&self, authorization: Option<&SecretString>) -> AppResult<ApiCredential> {
        self.stage()?;

        let token = authorization
            .and_then(|value| bearer_token(value.expose_secret()))
            .ok_or_else(|| AppError::Unauthorized("API key is required.".to_string()))?;

        ApiCredential::decode(token).map_err(|e| {
            debug!("Rejected malformed API key: {}", e);
            AppError::Unauthorized("API key is malformed.".to_string())
        })
    }

    /// Check a decoded credential against the stored key for `app_id`.
    pub async fn verify(&self, credential: &ApiCredential, app_id: &str) -> AppResult<ApiKeyRecord> {
        let record = self
            .key_store
            .fetch_api_key(&credential.id, app_id)
            .await?
            .ok_or_else(|| AppError::not_found("API key not found.", "api_key"))?;

        if !record.is_active {
            return Err(AppError::ApiKeyInactive);
        }

        if !record.team_owns_app(app_id) {
            return Err(AppError::InvalidApp);
        }

        if !verify_hashed_secret(
            &self.general_secret_key,
            &record.id,
            &credential.secret,
            &record.hashed_secret,
        ) {
            warn!(key_id = %record.id, app_id, "API key secret mismatch");
            return Err(AppError::InvalidApiKey);
        }

        debug!(key_id = %record.id, app_id, "API key verified");
        Ok(record)
    }

    /// Full verification of a raw `Authorization` header for `app_id`.
    pub async fn authenticate(
        &self,
        authorization: Option<&SecretString>,
        app_id: &str,
    ) -> AppResult<ApiKeyRecord> {
        let credential = self.extract_credential(authorization)?;
        self.verify(&credential, app_id).await
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}
