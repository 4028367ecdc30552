//! Authentication module for API key credentials.

mod credential;
mod extractor;
mod hashed_secret;

pub use credential::{API_KEY_PREFIX, ApiCredential, CredentialError, bearer_token};
pub use extractor::CallerHeaders;
pub use hashed_secret::{GeneratedApiKey, generate_api_key, hash_secret, verify_hashed_secret};
