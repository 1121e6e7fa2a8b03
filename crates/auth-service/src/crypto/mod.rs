pub mod key_material;

pub use key_material::KeyMaterial;

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::AcError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::jwt::{AccessClaims, ACCESS_TOKEN_ALGORITHM};
use common::secret::SecretString;
use jsonwebtoken::{encode, EncodingKey, Header};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use tracing::instrument;

/// Entropy in an opaque refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Bcrypt hash of a random string, verified against when the email is unknown
/// so that login timing does not reveal which accounts exist.
pub const DUMMY_PASSWORD_HASH: &str =
    "$2b$12$LQv3c1yqBWVHxkd0LHAkCOYz6TtxMQJqhN8/LewY5GyYqExt7YD3a";

/// Sign access token claims with RS256.
#[instrument(skip_all)]
pub fn sign_access_token(claims: &AccessClaims, encoding_key: &EncodingKey) -> Result<String, AcError> {
    let mut header = Header::new(ACCESS_TOKEN_ALGORITHM);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, encoding_key)
        .map_err(|e| AcError::Crypto(format!("JWT signing operation failed: {e}")))
}

/// Generate cryptographically secure random bytes
pub fn generate_random_bytes(len: usize) -> Result<Vec<u8>, AcError> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|e| AcError::Crypto(format!("Random bytes generation failed: {e}")))?;
    Ok(bytes)
}

/// Generate an opaque refresh token (32 bytes, base64url without padding).
///
/// The plaintext is returned once to the client; only [`hash_refresh_token`]
/// of it is stored.
#[instrument(skip_all)]
pub fn generate_refresh_token() -> Result<SecretString, AcError> {
    let bytes = generate_random_bytes(REFRESH_TOKEN_BYTES)?;
    Ok(SecretString::from(URL_SAFE_NO_PAD.encode(bytes)))
}

/// Lower-case hex SHA-256 of a presented refresh token.
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Hash a password with bcrypt.
///
/// # Errors
///
/// Returns `AcError::Crypto` if the cost is outside 10-14 or hashing fails.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, AcError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AcError::Crypto(format!(
            "Invalid bcrypt cost: {cost} (must be {MIN_BCRYPT_COST}-{MAX_BCRYPT_COST})"
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| AcError::Crypto(format!("Password hashing failed: {e}")))
}

/// Verify a password against a bcrypt hash
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AcError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AcError::Crypto(format!("Password verification failed: {e}")))
}
