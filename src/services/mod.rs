//! Business logic services.

pub mod app_metadata;
pub mod credential_verifier;
pub mod graphql;
pub mod key_store;
pub mod permissions;
pub mod signed_http;
pub mod upstream;

pub use app_metadata::{AppMetadataStore, GraphqlAppMetadataStore};
pub use credential_verifier::CredentialVerifier;
pub use graphql::GraphqlClient;
pub use key_store::{GraphqlKeyStore, KeyStore};
pub use permissions::PermissionGate;
pub use signed_http::{ProxyRequest, SigV4HttpClient, SignedHttpClient, UpstreamResponse};
pub use upstream::{UpstreamProxy, map_upstream_error};
