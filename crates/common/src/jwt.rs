//! Access token verification shared by the issuer and every downstream service.
//!
//! This module provides:
//! - Size limits for DoS prevention
//! - Clock skew constants for iat validation
//! - The fixed access token claim set ([`AccessClaims`])
//! - [`TokenVerifier`], which pins RS256 and checks issuer, audience and expiry
//! - Bearer token extraction from an `Authorization` header value
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only RS256 is accepted; `none`, HS256 (public-key-as-secret confusion),
//!   ES256 and RS512 headers are rejected before any signature work
//! - Every failure surfaces as the same opaque error; the detailed reason is
//!   logged at debug level under the `common.jwt` target
//! - The `sub` field in [`AccessClaims`] is redacted in Debug output
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{extract_bearer_token, TokenVerifier};
//!
//! let verifier = TokenVerifier::from_public_key_pem(&pem, "fintech-auth", "fintech-platform")?;
//! let token = extract_bearer_token(header_value).ok_or(Unauthorized)?;
//! let claims = verifier.verify(token)?;
//! ```

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Checked before base64 decoding and signature verification. An RS256 access
/// token with a handful of roles is roughly 600 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Default JWT clock skew tolerance (5 minutes).
///
/// Tokens whose `iat` lies further than this in the future are rejected.
/// Expiry itself is evaluated with zero leeway.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// The only algorithm access tokens may carry.
pub const ACCESS_TOKEN_ALGORITHM: Algorithm = Algorithm::RS256;

/// Generic message used for every access token rejection.
pub const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during JWT validation.
///
/// All variants render the same message so callers cannot leak which check
/// failed. Match on the variant (tests, metrics) when the distinction matters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token is not a structurally valid JWT, or its claims do not have the
    /// expected shape.
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Header `alg` is anything other than RS256.
    #[error("The access token is invalid or expired")]
    AlgorithmMismatch,

    /// Signature does not verify against the configured public key.
    #[error("The access token is invalid or expired")]
    InvalidSignature,

    /// `iss` or `aud` does not match the configured values, or a required
    /// claim is missing.
    #[error("The access token is invalid or expired")]
    ClaimsMismatch,

    /// `now >= exp`.
    #[error("The access token is invalid or expired")]
    Expired,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid or expired")]
    IatTooFarInFuture,
}

impl JwtValidationError {
    /// Bounded label for metrics.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            JwtValidationError::TokenTooLarge => "too_large",
            JwtValidationError::MalformedToken => "malformed",
            JwtValidationError::AlgorithmMismatch => "algorithm",
            JwtValidationError::InvalidSignature => "signature",
            JwtValidationError::ClaimsMismatch => "claims",
            JwtValidationError::Expired => "expired",
            JwtValidationError::IatTooFarInFuture => "clock_skew",
        }
    }
}

/// Errors loading verification key material.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The PEM text is not an RSA public key.
    #[error("Invalid RSA public key: {0}")]
    InvalidPublicKey(String),
}

// =============================================================================
// Claims Types
// =============================================================================

/// Access token claim set.
///
/// The shape is fixed: unknown claims are rejected, and `roles` keeps the
/// order (and any duplicates) the issuer wrote.
///
/// # Security
///
/// The `sub` field is redacted in Debug output to prevent accidental logging
/// of principal identifiers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessClaims {
    /// Subject (principal identifier) - redacted in Debug output.
    pub sub: String,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// Role names in issuer order.
    pub roles: Vec<String>,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,
}

impl fmt::Debug for AccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessClaims")
            .field("sub", &"[REDACTED]")
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .field("roles", &self.roles)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

impl AccessClaims {
    /// Check if the token carries a specific role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

// =============================================================================
// Verifier
// =============================================================================

/// Verifies RS256 access tokens against one public key.
///
/// Holds only public material, so any service can construct one without
/// being able to mint tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Create a verifier from an already-parsed decoding key.
    #[must_use]
    pub fn new(
        decoding_key: DecodingKey,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            decoding_key,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Create a verifier from a PKIX (`BEGIN PUBLIC KEY`) RSA PEM.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidPublicKey` if the PEM is not an RSA public key.
    pub fn from_public_key_pem(
        pem: &str,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let decoding_key = decoding_key_from_pem(pem)?;
        Ok(Self::new(decoding_key, issuer, audience))
    }

    /// Configured issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Configured audience.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Verify a token against the current wall clock.
    ///
    /// # Errors
    ///
    /// Returns a `JwtValidationError`; every variant displays the same
    /// generic message.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, JwtValidationError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify a token against an explicit `now` (Unix seconds).
    ///
    /// # Security Checks
    ///
    /// 1. Size check - reject tokens > 8KB before parsing
    /// 2. Header `alg` must be RS256
    /// 3. RS256 signature against the configured public key
    /// 4. `iss` and `aud` exact match, all claims present, no extra claims
    /// 5. `now < exp` (zero leeway)
    /// 6. `iat` no further than the clock skew in the future
    ///
    /// # Errors
    ///
    /// Returns the `JwtValidationError` for the first failing check.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<AccessClaims, JwtValidationError> {
        if token.len() > MAX_JWT_SIZE_BYTES {
            tracing::debug!(
                target: "common.jwt",
                token_size = token.len(),
                max_size = MAX_JWT_SIZE_BYTES,
                "Token rejected: size exceeds maximum allowed"
            );
            return Err(JwtValidationError::TokenTooLarge);
        }

        // `none` is not a jsonwebtoken Algorithm, so such headers fail here
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header");
            JwtValidationError::MalformedToken
        })?;

        if header.alg != ACCESS_TOKEN_ALGORITHM {
            tracing::debug!(
                target: "common.jwt",
                alg = ?header.alg,
                "Token rejected: unexpected algorithm"
            );
            return Err(JwtValidationError::AlgorithmMismatch);
        }

        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| {
                tracing::debug!(target: "common.jwt", error = %e, "Token verification failed");
                match e.kind() {
                    ErrorKind::InvalidSignature => JwtValidationError::InvalidSignature,
                    ErrorKind::InvalidAlgorithm => JwtValidationError::AlgorithmMismatch,
                    ErrorKind::InvalidIssuer
                    | ErrorKind::InvalidAudience
                    | ErrorKind::MissingRequiredClaim(_) => JwtValidationError::ClaimsMismatch,
                    _ => JwtValidationError::MalformedToken,
                }
            })?;

        let claims = token_data.claims;

        if now >= claims.exp {
            tracing::debug!(
                target: "common.jwt",
                exp = claims.exp,
                now = now,
                "Token rejected: expired"
            );
            return Err(JwtValidationError::Expired);
        }

        validate_iat(claims.iat, DEFAULT_CLOCK_SKEW, now)?;

        Ok(claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(ACCESS_TOKEN_ALGORITHM);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["sub", "iss", "aud", "iat", "exp"]);
        // Expiry is checked against the caller-supplied clock in verify_at
        validation.validate_exp = false;
        validation.leeway = 0;
        validation
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Parse an RSA public key PEM into a decoding key.
///
/// # Errors
///
/// Returns `KeyError::InvalidPublicKey` for non-RSA or malformed PEM text.
pub fn decoding_key_from_pem(pem: &str) -> Result<DecodingKey, KeyError> {
    DecodingKey::from_rsa_pem(pem.trim().as_bytes())
        .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively (`Bearer`, `bearer`, `BEARER`);
/// surrounding whitespace around the token is ignored. Returns `None` for any
/// other scheme or an empty token.
#[must_use]
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Reject an `iat` more than `clock_skew` past `now`.
fn validate_iat(iat: i64, clock_skew: Duration, now: i64) -> Result<(), JwtValidationError> {
    let clock_skew_secs = i64::try_from(clock_skew.as_secs()).unwrap_or(i64::MAX);
    let max_iat = now.saturating_add(clock_skew_secs);

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            clock_skew_secs = clock_skew_secs,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::cast_possible_wrap
)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const PRIVATE_PEM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/jwt/primary_private.pem"
    ));
    const PUBLIC_PEM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/jwt/primary_public.pem"
    ));
    const ROGUE_PRIVATE_PEM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/jwt/rogue_private.pem"
    ));
    const EC_PRIVATE_PEM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/jwt/ec_private.pem"
    ));
    const EC_PUBLIC_PEM: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../fixtures/jwt/ec_public.pem"
    ));

    const ISSUER: &str = "fintech-auth";
    const AUDIENCE: &str = "fintech-platform";
    const NOW: i64 = 1_700_000_000;

    fn verifier() -> TokenVerifier {
        TokenVerifier::from_public_key_pem(PUBLIC_PEM, ISSUER, AUDIENCE).unwrap()
    }

    fn claims_json(iat: i64, exp: i64) -> serde_json::Value {
        json!({
            "sub": "u1",
            "iss": ISSUER,
            "aud": AUDIENCE,
            "roles": ["user"],
            "iat": iat,
            "exp": exp,
        })
    }

    fn sign(alg: Algorithm, key: &EncodingKey, claims: &serde_json::Value) -> String {
        let mut header = Header::new(alg);
        header.typ = Some("JWT".to_string());
        encode(&header, claims, key).unwrap()
    }

    fn sign_rs256(claims: &serde_json::Value) -> String {
        let key = EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes()).unwrap();
        sign(Algorithm::RS256, &key, claims)
    }

    // -------------------------------------------------------------------------
    // Constants Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_max_jwt_size_is_8kb() {
        assert_eq!(MAX_JWT_SIZE_BYTES, 8192);
    }

    #[test]
    fn test_default_clock_skew_is_5_minutes() {
        assert_eq!(DEFAULT_CLOCK_SKEW, Duration::from_secs(300));
    }

    // -------------------------------------------------------------------------
    // verify_at Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_verify_valid_token() {
        let token = sign_rs256(&claims_json(NOW, NOW + 900));

        let claims = verifier().verify_at(&token, NOW).unwrap();

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.roles, vec!["user".to_string()]);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.aud, AUDIENCE);
        assert_eq!(claims.exp, NOW + 900);
    }

    #[test]
    fn test_verify_expiry_boundary() {
        let exp = NOW + 900;
        let token = sign_rs256(&claims_json(NOW, exp));
        let verifier = verifier();

        assert!(verifier.verify_at(&token, exp - 1).is_ok());
        assert_eq!(
            verifier.verify_at(&token, exp),
            Err(JwtValidationError::Expired)
        );
        assert_eq!(
            verifier.verify_at(&token, exp + 1),
            Err(JwtValidationError::Expired)
        );
    }

    #[test]
    fn test_verify_preserves_role_order_and_duplicates() {
        let mut claims = claims_json(NOW, NOW + 60);
        claims["roles"] = json!(["admin", "user", "admin"]);
        let token = sign_rs256(&claims);

        let verified = verifier().verify_at(&token, NOW).unwrap();
        assert_eq!(verified.roles, vec!["admin", "user", "admin"]);
    }

    #[test]
    fn test_verify_rejects_token_from_other_key() {
        let rogue = EncodingKey::from_rsa_pem(ROGUE_PRIVATE_PEM.as_bytes()).unwrap();
        let token = sign(Algorithm::RS256, &rogue, &claims_json(NOW, NOW + 900));

        assert_eq!(
            verifier().verify_at(&token, NOW),
            Err(JwtValidationError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_rejects_hs256_signed_with_public_key() {
        let confused = EncodingKey::from_secret(PUBLIC_PEM.as_bytes());
        let token = sign(Algorithm::HS256, &confused, &claims_json(NOW, NOW + 900));

        assert_eq!(
            verifier().verify_at(&token, NOW),
            Err(JwtValidationError::AlgorithmMismatch)
        );
    }

    #[test]
    fn test_verify_rejects_rs512() {
        let key = EncodingKey::from_rsa_pem(PRIVATE_PEM.as_bytes()).unwrap();
        let token = sign(Algorithm::RS512, &key, &claims_json(NOW, NOW + 900));

        assert_eq!(
            verifier().verify_at(&token, NOW),
            Err(JwtValidationError::AlgorithmMismatch)
        );
    }

    #[test]
    fn test_verify_rejects_es256() {
        let key = EncodingKey::from_ec_pem(EC_PRIVATE_PEM.as_bytes()).unwrap();
        let token = sign(Algorithm::ES256, &key, &claims_json(NOW, NOW + 900));

        assert_eq!(
            verifier().verify_at(&token, NOW),
            Err(JwtValidationError::AlgorithmMismatch)
        );
    }

    #[test]
    fn test_verify_rejects_alg_none() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims_json(NOW, NOW + 900).to_string());
        let token = format!("{header}.{payload}.");

        assert!(verifier().verify_at(&token, NOW).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_issuer() {
        let mut claims = claims_json(NOW, NOW + 900);
        claims["iss"] = json!("someone-else");
        let token = sign_rs256(&claims);

        assert_eq!(
            verifier().verify_at(&token, NOW),
            Err(JwtValidationError::ClaimsMismatch)
        );
    }

    #[test]
    fn test_verify_rejects_wrong_audience() {
        let mut claims = claims_json(NOW, NOW + 900);
        claims["aud"] = json!("another-platform");
        let token = sign_rs256(&claims);

        assert_eq!(
            verifier().verify_at(&token, NOW),
            Err(JwtValidationError::ClaimsMismatch)
        );
    }

    #[test]
    fn test_verify_rejects_unknown_claims() {
        let mut claims = claims_json(NOW, NOW + 900);
        claims["scope"] = json!("admin");
        let token = sign_rs256(&claims);

        assert!(verifier().verify_at(&token, NOW).is_err());
    }

    #[test]
    fn test_verify_rejects_missing_roles() {
        let mut claims = claims_json(NOW, NOW + 900);
        claims.as_object_mut().unwrap().remove("roles");
        let token = sign_rs256(&claims);

        assert!(verifier().verify_at(&token, NOW).is_err());
    }

    #[test]
    fn test_verify_rejects_iat_far_in_future() {
        let iat = NOW + 3600;
        let token = sign_rs256(&claims_json(iat, iat + 900));

        assert_eq!(
            verifier().verify_at(&token, NOW),
            Err(JwtValidationError::IatTooFarInFuture)
        );
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let token = sign_rs256(&claims_json(NOW, NOW + 900));
        let parts: Vec<&str> = token.split('.').collect();
        let mut elevated = claims_json(NOW, NOW + 900);
        elevated["roles"] = json!(["admin"]);
        let forged_payload = URL_SAFE_NO_PAD.encode(elevated.to_string());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(
            verifier().verify_at(&forged, NOW),
            Err(JwtValidationError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_rejects_oversized_token() {
        let oversized = "a".repeat(MAX_JWT_SIZE_BYTES + 1);
        assert_eq!(
            verifier().verify_at(&oversized, NOW),
            Err(JwtValidationError::TokenTooLarge)
        );
    }

    #[test]
    fn test_verify_rejects_garbage() {
        for garbage in ["", "not-a-jwt", "a.b.c", "!!!.???.###"] {
            assert_eq!(
                verifier().verify_at(garbage, NOW),
                Err(JwtValidationError::MalformedToken),
                "input {garbage:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_errors_share_generic_message() {
        let errors = [
            JwtValidationError::TokenTooLarge,
            JwtValidationError::MalformedToken,
            JwtValidationError::AlgorithmMismatch,
            JwtValidationError::InvalidSignature,
            JwtValidationError::ClaimsMismatch,
            JwtValidationError::Expired,
            JwtValidationError::IatTooFarInFuture,
        ];
        for e in errors {
            assert_eq!(e.to_string(), INVALID_TOKEN_MESSAGE);
        }
    }

    // -------------------------------------------------------------------------
    // Key Loading Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_decoding_key_rejects_ec_public_key() {
        assert!(matches!(
            decoding_key_from_pem(EC_PUBLIC_PEM),
            Err(KeyError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_decoding_key_rejects_garbage() {
        assert!(decoding_key_from_pem("not a pem").is_err());
    }

    // -------------------------------------------------------------------------
    // extract_bearer_token Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_extract_bearer_token_case_insensitive() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("BEARER  abc.def.ghi "), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_token_rejects_other_schemes() {
        assert_eq!(extract_bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
        assert_eq!(extract_bearer_token("Bearer    "), None);
        assert_eq!(extract_bearer_token("abc.def.ghi"), None);
    }

    // -------------------------------------------------------------------------
    // validate_iat Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_validate_iat_far_future_now_does_not_overflow() {
        assert!(validate_iat(i64::MAX, DEFAULT_CLOCK_SKEW, i64::MAX).is_ok());
    }

    #[test]
    fn test_validate_iat_at_boundary_exact() {
        assert!(validate_iat(NOW + 300, DEFAULT_CLOCK_SKEW, NOW).is_ok());
        assert!(matches!(
            validate_iat(NOW + 301, DEFAULT_CLOCK_SKEW, NOW),
            Err(JwtValidationError::IatTooFarInFuture)
        ));
    }

    // -------------------------------------------------------------------------
    // AccessClaims Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_access_claims_debug_redacts_sub() {
        let claims = AccessClaims {
            sub: "secret-principal-id".to_string(),
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            roles: vec!["user".to_string()],
            iat: NOW,
            exp: NOW + 900,
        };

        let debug_str = format!("{claims:?}");
        assert!(!debug_str.contains("secret-principal-id"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_access_claims_has_role() {
        let claims = AccessClaims {
            sub: "u1".to_string(),
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            roles: vec!["user".to_string(), "admin".to_string()],
            iat: NOW,
            exp: NOW + 900,
        };

        assert!(claims.has_role("admin"));
        assert!(!claims.has_role("adm"));
    }
}
