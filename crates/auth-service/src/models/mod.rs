use chrono::{DateTime, Utc};
use common::secret::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// `token_type` in every issuance response.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Status value of a principal allowed to receive tokens.
pub const USER_STATUS_ACTIVE: &str = "active";

/// User model (maps to users table)
#[derive(Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub status: String,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == USER_STATUS_ACTIVE
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &"[REDACTED]")
            .field("password_hash", &"[REDACTED]")
            .field("status", &self.status)
            .finish()
    }
}

/// Why a refresh token left the active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationReason {
    /// Redeemed and replaced by a new token.
    Rotated,
    /// Explicitly revoked via logout.
    Logout,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::Rotated => "rotated",
            RevocationReason::Logout => "logout",
        }
    }
}

impl std::str::FromStr for RevocationReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rotated" => Ok(RevocationReason::Rotated),
            "logout" => Ok(RevocationReason::Logout),
            other => Err(format!("unknown revocation reason: {other}")),
        }
    }
}

/// Lifecycle state of a refresh token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Active,
    /// Redeemed once already.
    Consumed,
    /// Revoked by logout.
    Revoked,
    Expired,
}

/// Refresh token record (maps to refresh_tokens table).
///
/// Only the SHA-256 hash of the opaque value is stored.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revocation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Terminal states win over expiry; a record is only `Active` strictly
    /// before `expires_at`.
    pub fn state(&self, now: DateTime<Utc>) -> TokenState {
        if self.revoked {
            let reason = self
                .revocation_reason
                .as_deref()
                .and_then(|r| r.parse::<RevocationReason>().ok());
            return match reason {
                Some(RevocationReason::Logout) => TokenState::Revoked,
                _ => TokenState::Consumed,
            };
        }
        if now >= self.expires_at {
            return TokenState::Expired;
        }
        TokenState::Active
    }
}

/// A refresh token about to be persisted.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Freshly minted credentials for one principal.
///
/// `refresh_token` is the only copy of the plaintext value.
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: SecretString,
    pub expires_in: i64,
}

/// Token response body for register, login and refresh.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token.expose_secret().to_string(),
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: pair.expires_in,
        }
    }
}

/// Register and login request body.
///
/// Fields default to empty so a missing field is reported as a 400 by the
/// handler instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default = "empty_secret")]
    pub password: SecretString,
}

/// Refresh and logout request body.
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(default = "empty_secret")]
    pub refresh_token: SecretString,
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

/// Logout response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// `/me` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub sub: String,
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
}

/// `/ready` response body.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
