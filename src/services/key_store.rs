//! Key Store lookups.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::graphql::GraphqlClient;
use crate::error::AppResult;
use crate::models::ApiKeyRecord;

/// Read access to stored API keys.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Fetch a key by id. The record's team apps are narrowed to `app_id`.
    async fn fetch_api_key(&self, id: &str, app_id: &str) -> AppResult<Option<ApiKeyRecord>>;
}

const FETCH_API_KEY: &str = r#"
query FetchAPIKey($id: String!, $appId: String!) {
  api_key_by_pk(id: $id) {
    id
    api_key
    is_active
    team {
      apps(where: { id: { _eq: $appId } }) {
        id
      }
    }
  }
}
"#;

#[derive(Serialize)]
struct FetchApiKeyVars<'a> {
    id: &'a str,
    #[serde(rename = "appId")]
    app_id: &'a str,
}

#[derive(Deserialize)]
struct FetchApiKeyData {
    api_key_by_pk: Option<ApiKeyRecord>,
}

/// Key Store backed by the service GraphQL API.
#[derive(Debug, Clone)]
pub struct GraphqlKeyStore {
    client: GraphqlClient,
}

impl GraphqlKeyStore {
    pub fn new(client: GraphqlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeyStore for GraphqlKeyStore {
    async fn fetch_api_key(&self, id: &str, app_id: &str) -> AppResult<Option<ApiKeyRecord>> {
        let data: FetchApiKeyData = self
            .client
            .execute("FetchAPIKey", FETCH_API_KEY, FetchApiKeyVars { id, app_id })
            .await?;
        Ok(data.api_key_by_pk)
    }
}
