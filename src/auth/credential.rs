//! Caller credential decoding.
//!
//! A credential is presented as `Authorization: Bearer api_<base64(id:secret)>`.
//! Decoding never touches the network; the id is only a lookup key and the
//! secret is verified against the stored hash.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use secrecy::SecretString;

/// Literal prefix of every API key token.
pub const API_KEY_PREFIX: &str = "api_";

/// Standard alphabet, padding optional.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons a presented token cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("API key is not valid base64")]
    InvalidEncoding,

    #[error("API key is not valid UTF-8")]
    InvalidUtf8,

    #[error("API key is missing the id:secret separator")]
    MissingSeparator,

    #[error("API key has an empty id or secret")]
    EmptyPart,
}

/// Decoded caller credential.
#[derive(Debug, Clone)]
pub struct ApiCredential {
    /// Key Store lookup id
    pub id: String,
    /// Plaintext secret, never stored
    pub secret: SecretString,
}

impl ApiCredential {
    /// Decode an `api_<base64(id:secret)>` token.
    ///
    /// The prefix is stripped when present. The payload is split on the
    /// first `:`, so secrets may themselves contain colons.
    pub fn decode(token: &str) -> Result<Self, CredentialError> {
        let encoded = token.strip_prefix(API_KEY_PREFIX).unwrap_or(token);

        let bytes = LENIENT_STANDARD
            .decode(encoded.trim())
            .map_err(|_| CredentialError::InvalidEncoding)?;
        let decoded = String::from_utf8(bytes).map_err(|_| CredentialError::InvalidUtf8)?;

        let (id, secret) = decoded
            .split_once(':')
            .ok_or(CredentialError::MissingSeparator)?;

        if id.is_empty() || secret.is_empty() {
            return Err(CredentialError::EmptyPart);
        }

        Ok(Self {
            id: id.to_string(),
            secret: SecretString::from(secret.to_string()),
        })
    }

    /// Encode an id and secret into a caller token.
    pub fn encode(id: &str, secret: &str) -> String {
        format!(
            "{}{}",
            API_KEY_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", id, secret))
        )
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
