//! App metadata lookups used by the permission gate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::graphql::GraphqlClient;
use crate::error::AppResult;

/// Resolves which team owns an app.
#[async_trait]
pub trait AppMetadataStore: Send + Sync {
    /// Owning team id of `app_id`, `None` when the app has no metadata.
    async fn fetch_app_team(&self, app_id: &str) -> AppResult<Option<String>>;
}

const GET_APP_METADATA: &str = r#"
query GetAppMetadata($app_id: String!) {
  app_metadata(where: { app_id: { _eq: $app_id } }) {
    app {
      team {
        id
      }
    }
  }
}
"#;

#[derive(Serialize)]
struct GetAppMetadataVars<'a> {
    app_id: &'a str,
}

#[derive(Deserialize)]
struct GetAppMetadataData {
    #[serde(default)]
    app_metadata: Vec<AppMetadataRow>,
}

#[derive(Deserialize)]
struct AppMetadataRow {
    app: MetadataApp,
}

#[derive(Deserialize)]
struct MetadataApp {
    team: MetadataTeam,
}

#[derive(Deserialize)]
struct MetadataTeam {
    id: String,
}

/// Metadata store backed by the service GraphQL API.
#[derive(Debug, Clone)]
pub struct GraphqlAppMetadataStore {
    client: GraphqlClient,
}

impl GraphqlAppMetadataStore {
    pub fn new(client: GraphqlClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AppMetadataStore for GraphqlAppMetadataStore {
    async fn fetch_app_team(&self, app_id: &str) -> AppResult<Option<String>> {
        let data: GetAppMetadataData = self
            .client
            .execute(
                "GetAppMetadata",
                GET_APP_METADATA,
                GetAppMetadataVars { app_id },
            )
            .await?;

        Ok(data
            .app_metadata
            .into_iter()
            .next()
            .map(|row| row.app.team.id))
    }
}
