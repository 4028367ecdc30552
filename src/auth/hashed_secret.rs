//! Hashed API-key secrets.
//!
//! The Key Store keeps `hex(HMAC-SHA256(general_secret, "{id}.{secret}"))`.
//! Binding the key id into the MAC means a hash copied onto another record
//! never verifies.

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::credential::ApiCredential;

type HmacSha256 = Hmac<Sha256>;

/// Prefix of generated plaintext secrets.
const SECRET_PREFIX: &str = "sk_";
/// Random bytes in a generated secret (hex encoded).
const SECRET_RANDOM_BYTES: usize = 24;

/// Derive the stored hash of a secret.
pub fn hash_secret(
    general_secret: &SecretString,
    id: &str,
    secret: &str,
) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(general_secret.expose_secret().as_bytes())?;
    mac.update(id.as_bytes());
    mac.update(b".");
    mac.update(secret.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a presented secret against the stored hash in constant time.
pub fn verify_hashed_secret(
    general_secret: &SecretString,
    id: &str,
    secret: &SecretString,
    hashed_secret: &str,
) -> bool {
    let Ok(expected) = hash_secret(general_secret, id, secret.expose_secret()) else {
        return false;
    };
    // Unequal lengths compare false without an early exit.
    expected.as_bytes().ct_eq(hashed_secret.as_bytes()).into()
}

/// A freshly minted API key.
pub struct GeneratedApiKey {
    pub id: String,
    /// Plaintext secret, shown once
    pub secret: SecretString,
    /// Value to store in the Key Store
    pub hashed_secret: String,
    /// Token handed to the caller
    pub token: SecretString,
}

/// Mint a new key id, secret and hash.
pub fn generate_api_key(general_secret: &SecretString) -> Result<GeneratedApiKey, InvalidLength> {
    let id = format!("key_{}", uuid::Uuid::new_v4().simple());

    let mut bytes = [0u8; SECRET_RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let secret = format!("{}{}", SECRET_PREFIX, hex::encode(bytes));

    let hashed_secret = hash_secret(general_secret, &id, &secret)?;
    let token = ApiCredential::encode(&id, &secret);

    Ok(GeneratedApiKey {
        id,
        secret: SecretString::from(secret),
        hashed_secret,
        token: SecretString::from(token),
    })
}

impl std::fmt::Debug for GeneratedApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedApiKey")
            .field("id", &self.id)
            .field("hashed_secret", &self.hashed_secret)
            .finish_non_exhaustive()
    }
}
