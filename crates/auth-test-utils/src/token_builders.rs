//! Builders for signed test access tokens
//!
//! Produces both valid tokens and the hostile variants verifiers must reject:
//! foreign keys, substituted algorithms and unsigned tokens.

use crate::crypto_fixtures::{EC_PRIVATE_KEY_PEM, PRIMARY_PRIVATE_KEY_PEM, ROGUE_PRIVATE_KEY_PEM};
use crate::test_ids::{TEST_AUDIENCE, TEST_ISSUER};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Builder for access token claims
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject("u1")
///     .with_roles(&["user", "admin"])
///     .expires_in(900)
///     .sign();
/// ```
#[derive(Debug, Clone)]
pub struct TestTokenBuilder {
    sub: String,
    iss: String,
    aud: String,
    roles: Vec<String>,
    iat: i64,
    exp: i64,
    extra: Map<String, Value>,
    omitted: Vec<&'static str>,
}

impl TestTokenBuilder {
    /// Defaults: subject `test-subject`, role `user`, 15 minute lifetime.
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: "test-subject".to_string(),
            iss: TEST_ISSUER.to_string(),
            aud: TEST_AUDIENCE.to_string(),
            roles: vec!["user".to_string()],
            iat: now,
            exp: now + 900,
            extra: Map::new(),
            omitted: Vec::new(),
        }
    }

    pub fn for_subject(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| (*r).to_string()).collect();
        self
    }

    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.iss = issuer.to_string();
        self
    }

    pub fn with_audience(mut self, audience: &str) -> Self {
        self.aud = audience.to_string();
        self
    }

    /// Set expiration in seconds from now (negative for already expired)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Utc::now().timestamp() + seconds;
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = timestamp;
        self
    }

    /// Add a claim the verifier does not know about.
    pub fn with_extra_claim(mut self, name: &str, value: Value) -> Self {
        self.extra.insert(name.to_string(), value);
        self
    }

    /// Drop a standard claim from the payload.
    pub fn without_claim(mut self, name: &'static str) -> Self {
        self.omitted.push(name);
        self
    }

    /// Build the claims as a JSON value
    pub fn build(&self) -> Value {
        let mut claims = json!({
            "sub": self.sub,
            "iss": self.iss,
            "aud": self.aud,
            "roles": self.roles,
            "iat": self.iat,
            "exp": self.exp,
        });
        if let Some(map) = claims.as_object_mut() {
            for name in &self.omitted {
                map.remove(*name);
            }
            map.extend(self.extra.clone());
        }
        claims
    }

    /// RS256 with the key the test services trust.
    pub fn sign(&self) -> String {
        self.sign_rs256(PRIMARY_PRIVATE_KEY_PEM)
    }

    /// RS256 with an untrusted key.
    pub fn sign_with_rogue_key(&self) -> String {
        self.sign_rs256(ROGUE_PRIVATE_KEY_PEM)
    }

    /// ES256, a valid signature under the wrong algorithm family.
    pub fn sign_es256(&self) -> String {
        let key = EncodingKey::from_ec_pem(EC_PRIVATE_KEY_PEM.as_bytes())
            .expect("EC fixture should parse");
        encode(&Header::new(Algorithm::ES256), &self.build(), &key)
            .expect("ES256 signing should succeed")
    }

    /// HS256 keyed with `secret`, typically the verifier's public key PEM
    /// (the classic RS/HS confusion).
    pub fn sign_hs256(&self, secret: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &self.build(),
            &EncodingKey::from_secret(secret),
        )
        .expect("HS256 signing should succeed")
    }

    /// `alg: none` with an empty signature segment.
    pub fn unsigned(&self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(self.build().to_string().as_bytes());
        format!("{header}.{payload}.")
    }

    fn sign_rs256(&self, private_key_pem: &str) -> String {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .expect("RSA fixture should parse");
        let mut header = Header::new(Algorithm::RS256);
        header.typ = Some("JWT".to_string());
        encode(&header, &self.build(), &key).expect("RS256 signing should succeed")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Change one character near the start of the signature segment.
pub fn tamper_signature(token: &str) -> String {
    let Some(sig_start) = token.rfind('.').map(|i| i + 1) else {
        return token.to_string();
    };
    let target = sig_start + 4;
    token
        .char_indices()
        .map(|(i, c)| match (i == target, c) {
            (true, 'A') => 'B',
            (true, _) => 'A',
            (false, c) => c,
        })
        .collect()
}
