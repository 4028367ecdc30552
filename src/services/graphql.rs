//! Service GraphQL client for the Key Store and Metadata service.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GraphqlSettings;
use crate::error::{AppError, AppResult};

#[derive(Serialize)]
struct GraphqlRequest<'a, V: Serialize> {
    query: &'a str,
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// GraphQL client authenticated as the gateway service.
#[derive(Clone)]
pub struct GraphqlClient {
    url: String,
    service_token: SecretString,
    http_client: reqwest::Client,
}

impl GraphqlClient {
    pub fn new(settings: &GraphqlSettings) -> Self {
        Self::with_client(settings, reqwest::Client::new())
    }

    pub fn with_client(settings: &GraphqlSettings, http_client: reqwest::Client) -> Self {
        Self {
            url: settings.url.clone(),
            service_token: settings.service_token.clone(),
            http_client,
        }
    }

    /// Run a named operation and decode its `data`.
    pub async fn execute<V, T>(&self, operation_name: &str, query: &str, variables: V) -> AppResult<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        debug!(operation = operation_name, "GraphQL request");

        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(self.service_token.expose_secret())
            .json(&GraphqlRequest {
                query,
                operation_name,
                variables,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(operation = operation_name, status = %status, "GraphQL request failed");
            return Err(AppError::Internal(format!(
                "{} returned HTTP {}",
                operation_name, status
            )));
        }

        let body: GraphqlResponse<T> = response.json().await?;

        if let Some(first) = body.errors.first() {
            warn!(
                operation = operation_name,
                errors = body.errors.len(),
                "GraphQL errors: {}",
                first.message
            );
            return Err(AppError::Internal(format!(
                "{} failed: {}",
                operation_name, first.message
            )));
        }

        body.data
            .ok_or_else(|| AppError::Internal(format!("{} returned no data", operation_name)))
    }
}

impl std::fmt::Debug for GraphqlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphqlClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
