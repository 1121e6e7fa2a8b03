//! Refresh token rotation and revocation.
//!
//! A refresh token moves from active to exactly one terminal state:
//! consumed (rotated), revoked (logout) or expired. Terminal states are final.

use crate::crypto::hash_refresh_token;
use crate::errors::AcError;
use crate::models::{TokenPair, TokenState};
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_refresh_redemption;
use crate::repositories::{with_timeout, RefreshTokenStore, UserRepository};
use crate::services::{RoleResolver, TokenIssuer};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::instrument;

/// Result of a successful redemption.
#[derive(Debug)]
pub struct Redemption {
    pub principal_id: String,
    pub roles: Vec<String>,
    pub tokens: TokenPair,
}

pub struct RefreshService {
    issuer: Arc<TokenIssuer>,
    roles: RoleResolver,
    users: Arc<dyn UserRepository>,
    store: Arc<dyn RefreshTokenStore>,
}

impl RefreshService {
    pub fn new(
        issuer: Arc<TokenIssuer>,
        roles: RoleResolver,
        users: Arc<dyn UserRepository>,
        store: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        Self {
            issuer,
            roles,
            users,
            store,
        }
    }

    /// Redeem a refresh token for a fresh pair.
    pub async fn redeem(&self, presented: &str) -> Result<Redemption, AcError> {
        self.redeem_at(presented, Utc::now()).await
    }

    /// Redeem against an explicit clock.
    ///
    /// Exactly one of any number of concurrent callers presenting the same
    /// token succeeds; the rest get `InvalidRefreshToken`. So does a caller
    /// whose principal is no longer active.
    #[instrument(skip_all, name = "auth.refresh.redeem")]
    pub async fn redeem_at(&self, presented: &str, now: DateTime<Utc>) -> Result<Redemption, AcError> {
        let result = self.rotate(presented, now).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(AcError::InvalidRefreshToken) => "invalid",
            Err(AcError::StoreUnavailable(_)) => "unavailable",
            Err(_) => "error",
        };
        record_refresh_redemption(outcome);

        result
    }

    async fn rotate(&self, presented: &str, now: DateTime<Utc>) -> Result<Redemption, AcError> {
        if presented.is_empty() {
            return Err(AcError::InvalidRefreshToken);
        }

        let token_hash = hash_refresh_token(presented);
        let timeout = self.issuer.settings().store_timeout;

        let record = with_timeout(
            "find_refresh_token",
            timeout,
            self.store.find_by_hash(&token_hash),
        )
        .await?
        .ok_or_else(|| {
            tracing::debug!(target: "auth.refresh", "Refresh token not found");
            AcError::InvalidRefreshToken
        })?;

        let state = record.state(now);
        if state != TokenState::Active {
            tracing::debug!(target: "auth.refresh", state = ?state, "Refresh token not redeemable");
            return Err(AcError::InvalidRefreshToken);
        }

        let active = with_timeout(
            "get_user_status",
            timeout,
            self.users.is_active(&record.user_id),
        )
        .await?;
        if !active {
            // Left untouched so the token works again if the principal is reactivated
            tracing::info!(
                target: "auth.refresh",
                principal = %hash_for_correlation(&record.user_id),
                "Refresh refused: principal not active"
            );
            return Err(AcError::InvalidRefreshToken);
        }

        let roles = self.roles.roles_for(&record.user_id).await?;
        let prepared = self.issuer.prepare(&record.user_id, roles.clone(), now)?;

        let winner = with_timeout(
            "consume_refresh_token",
            timeout,
            self.store
                .consume_and_replace(&token_hash, now, &prepared.record),
        )
        .await?;

        let Some(principal_id) = winner else {
            // Another request consumed or revoked it between lookup and update
            tracing::info!(
                target: "auth.refresh",
                principal = %hash_for_correlation(&record.user_id),
                "Refresh token lost redemption race"
            );
            return Err(AcError::InvalidRefreshToken);
        };

        tracing::info!(
            target: "auth.refresh",
            principal = %hash_for_correlation(&principal_id),
            "Refresh token rotated"
        );

        Ok(Redemption {
            principal_id,
            roles,
            tokens: prepared.pair,
        })
    }

    /// Revoke a refresh token (logout).
    ///
    /// Best effort: unknown, already terminal and unreachable-store cases are
    /// logged and otherwise ignored.
    #[instrument(skip_all, name = "auth.refresh.revoke")]
    pub async fn revoke(&self, presented: &str) {
        let token_hash = hash_refresh_token(presented);
        let timeout = self.issuer.settings().store_timeout;

        match with_timeout(
            "revoke_refresh_token",
            timeout,
            self.store.revoke(&token_hash, Utc::now()),
        )
        .await
        {
            Ok(true) => tracing::info!(target: "auth.refresh", "Refresh token revoked"),
            Ok(false) => {
                tracing::debug!(target: "auth.refresh", "No active refresh token to revoke");
            }
            Err(e) => {
                tracing::warn!(target: "auth.refresh", error = %e, "Refresh token revocation failed");
            }
        }
    }
}
