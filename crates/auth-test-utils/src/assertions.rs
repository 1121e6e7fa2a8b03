//! Custom test assertions for access tokens
//!
//! Decode the token segments without verifying the signature; signature
//! checks belong to the verifier under test.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    sub: String,
    iss: String,
    aud: String,
    roles: Vec<String>,
    iat: i64,
    exp: i64,
}

fn segment(token: &str, index: usize) -> Vec<u8> {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {index}"));
    URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {index}: {e}"))
}

fn claims(token: &str) -> JwtClaims {
    serde_json::from_slice(&segment(token, 1)).expect("Failed to parse JWT claims")
}

/// Custom assertions for access tokens
///
/// # Example
/// ```rust,ignore
/// response.access_token
///     .assert_valid_jwt()
///     .assert_for_subject("u1")
///     .assert_has_role("user")
///     .assert_expires_in(900);
/// ```
pub trait TokenAssertions {
    /// Three segments, RS256 header, complete claim set.
    fn assert_valid_jwt(&self) -> &Self;

    fn assert_for_subject(&self, subject: &str) -> &Self;

    fn assert_has_role(&self, role: &str) -> &Self;

    /// Exact role list, order included.
    fn assert_roles(&self, roles: &[&str]) -> &Self;

    fn assert_issued_for(&self, issuer: &str, audience: &str) -> &Self;

    /// `exp - now` within 5 seconds of `seconds`, and `exp - iat == seconds`.
    fn assert_expires_in(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for str {
    fn assert_valid_jwt(&self) -> &Self {
        let count = self.split('.').count();
        assert_eq!(
            count, 3,
            "JWT must have 3 parts (header.payload.signature), got {count}"
        );

        let header: JwtHeader =
            serde_json::from_slice(&segment(self, 0)).expect("Failed to parse JWT header JSON");
        assert_eq!(header.alg, "RS256", "Expected RS256 algorithm");
        assert_eq!(header.typ.as_deref(), Some("JWT"), "Expected JWT type");

        let claims = claims(self);
        assert!(claims.exp > claims.iat, "exp must be after iat");
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(
            claims.sub, subject,
            "Expected subject '{}', got '{}'",
            subject, claims.sub
        );
        self
    }

    fn assert_has_role(&self, role: &str) -> &Self {
        let claims = claims(self);
        assert!(
            claims.roles.iter().any(|r| r == role),
            "Token does not contain role '{}'. Roles: {:?}",
            role,
            claims.roles
        );
        self
    }

    fn assert_roles(&self, roles: &[&str]) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.roles, roles, "Unexpected role list");
        self
    }

    fn assert_issued_for(&self, issuer: &str, audience: &str) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.iss, issuer, "Unexpected issuer");
        assert_eq!(claims.aud, audience, "Unexpected audience");
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims = claims(self);
        assert_eq!(claims.exp - claims.iat, seconds, "exp - iat mismatch");

        let remaining = claims.exp - chrono::Utc::now().timestamp();
        assert!(
            (remaining - seconds).abs() <= 5,
            "Expected token to expire in {seconds} seconds, but expires in {remaining} seconds"
        );
        self
    }
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        self.as_str().assert_valid_jwt();
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        self.as_str().assert_for_subject(subject);
        self
    }

    fn assert_has_role(&self, role: &str) -> &Self {
        self.as_str().assert_has_role(role);
        self
    }

    fn assert_roles(&self, roles: &[&str]) -> &Self {
        self.as_str().assert_roles(roles);
        self
    }

    fn assert_issued_for(&self, issuer: &str, audience: &str) -> &Self {
        self.as_str().assert_issued_for(issuer, audience);
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        self.as_str().assert_expires_in(seconds);
        self
    }
}
