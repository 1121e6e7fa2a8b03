//! RSA key material loaded once at startup.

use crate::crypto::sign_access_token;
use crate::errors::AcError;
use common::jwt::{decoding_key_from_pem, AccessClaims, TokenVerifier};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{DecodingKey, EncodingKey};
use std::fmt;
use tracing::instrument;

const SELF_CHECK_ISSUER: &str = "key-material-self-check";
const SELF_CHECK_AUDIENCE: &str = "key-material-self-check";

/// Signing key for the issuer plus the matching verification key.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct KeyMaterial {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("encoding_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Parse a private key PEM (PKCS#1 or PKCS#8) and a PKIX public key PEM.
    ///
    /// A self-check token is signed and verified before returning, so a public key
    /// that does not belong to the private key fails here instead of on the
    /// first downstream request.
    ///
    /// # Errors
    ///
    /// Returns `AcError::Crypto` for malformed PEM text or a mismatched pair.
    #[instrument(skip_all)]
    pub fn from_pem(private_key_pem: &SecretString, public_key_pem: &str) -> Result<Self, AcError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.expose_secret().trim().as_bytes())
            .map_err(|e| AcError::Crypto(format!("Invalid RSA private key: {e}")))?;

        let decoding_key =
            decoding_key_from_pem(public_key_pem).map_err(|e| AcError::Crypto(e.to_string()))?;

        let keys = Self {
            encoding_key,
            decoding_key,
        };
        keys.self_check()?;

        tracing::info!(target: "auth.crypto", "RSA key material loaded");
        Ok(keys)
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Verifier bound to this public key and the given issuer/audience.
    pub fn verifier(&self, issuer: &str, audience: &str) -> TokenVerifier {
        TokenVerifier::new(self.decoding_key.clone(), issuer, audience)
    }

    fn self_check(&self) -> Result<(), AcError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessClaims {
            sub: "self-check".to_string(),
            iss: SELF_CHECK_ISSUER.to_string(),
            aud: SELF_CHECK_AUDIENCE.to_string(),
            roles: Vec::new(),
            iat: now,
            exp: now + 60,
        };

        let token = sign_access_token(&claims, &self.encoding_key)?;
        self.verifier(SELF_CHECK_ISSUER, SELF_CHECK_AUDIENCE)
            .verify_at(&token, now)
            .map_err(|_| {
                AcError::Crypto("JWT public key does not match the private key".to_string())
            })?;
        Ok(())
    }
}
