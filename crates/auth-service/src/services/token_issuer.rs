//! Mints access/refresh token pairs.

use crate::config::Config;
use crate::crypto::{self, KeyMaterial};
use crate::errors::AcError;
use crate::models::{NewRefreshToken, TokenPair};
use crate::observability::hash_for_correlation;
use crate::repositories::{with_timeout, RefreshTokenStore};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use common::jwt::{AccessClaims, TokenVerifier};
use common::secret::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Immutable issuance parameters.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub issuer: String,
    pub audience: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
    pub store_timeout: Duration,
}

impl TokenSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            access_ttl_seconds: config.access_token_ttl_seconds,
            refresh_ttl_seconds: config.refresh_token_ttl_seconds,
            store_timeout: config.store_timeout,
        }
    }
}

/// A signed pair whose refresh record has not been written yet.
#[derive(Debug)]
pub struct PreparedIssue {
    pub pair: TokenPair,
    pub record: NewRefreshToken,
}

pub struct TokenIssuer {
    keys: Arc<KeyMaterial>,
    settings: TokenSettings,
    store: Arc<dyn RefreshTokenStore>,
}

impl TokenIssuer {
    pub fn new(
        keys: Arc<KeyMaterial>,
        settings: TokenSettings,
        store: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        Self {
            keys,
            settings,
            store,
        }
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Verifier for tokens minted by this issuer.
    pub fn verifier(&self) -> TokenVerifier {
        self.keys
            .verifier(&self.settings.issuer, &self.settings.audience)
    }

    /// Issue a pair for an authenticated principal and persist the refresh hash.
    pub async fn issue(&self, principal_id: &str, roles: Vec<String>) -> Result<TokenPair, AcError> {
        self.issue_at(principal_id, roles, Utc::now()).await
    }

    /// Issue against an explicit clock.
    ///
    /// No pair is returned unless the refresh record was written. A store
    /// timeout stays `StoreUnavailable`; any other failure is `Issuance`.
    #[instrument(skip_all, fields(principal = %hash_for_correlation(principal_id)))]
    pub async fn issue_at(
        &self,
        principal_id: &str,
        roles: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AcError> {
        let prepared = self.prepare(principal_id, roles, now)?;

        with_timeout(
            "insert_refresh_token",
            self.settings.store_timeout,
            self.store.insert(&prepared.record),
        )
        .await
        .map_err(|e| match e {
            AcError::StoreUnavailable(_) => e,
            other => AcError::Issuance(format!("Failed to persist refresh token: {other}")),
        })?;

        tracing::debug!(target: "auth.issuer", "Token pair issued");
        Ok(prepared.pair)
    }

    /// Sign an access token and generate a refresh token without touching the store.
    pub fn prepare(
        &self,
        principal_id: &str,
        roles: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<PreparedIssue, AcError> {
        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.settings.access_ttl_seconds)
            .ok_or_else(|| AcError::Issuance("Access token expiry out of range".to_string()))?;
        let refresh_expires_at = ChronoDuration::try_seconds(self.settings.refresh_ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AcError::Issuance("Refresh token expiry out of range".to_string()))?;

        let claims = AccessClaims {
            sub: principal_id.to_string(),
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            roles,
            iat,
            exp,
        };

        let access_token = crypto::sign_access_token(&claims, self.keys.encoding_key())
            .map_err(|e| AcError::Issuance(e.to_string()))?;
        let refresh_token =
            crypto::generate_refresh_token().map_err(|e| AcError::Issuance(e.to_string()))?;

        let record = NewRefreshToken {
            token_hash: crypto::hash_refresh_token(refresh_token.expose_secret()),
            user_id: principal_id.to_string(),
            expires_at: refresh_expires_at,
        };

        Ok(PreparedIssue {
            pair: TokenPair {
                access_token,
                refresh_token,
                expires_in: self.settings.access_ttl_seconds,
            },
            record,
        })
    }
}
