//! Postgres refresh token store.
//!
//! Terminal-state transitions are single conditional UPDATEs, so exactly one
//! caller wins a redemption even across service instances.

use crate::errors::AcError;
use crate::models::{NewRefreshToken, RefreshTokenRecord, RevocationReason};
use crate::repositories::{db_error, RefreshTokenStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn insert(&self, token: &NewRefreshToken) -> Result<(), AcError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, expires_at)
            VALUES ($1, $2::uuid, $3)
            "#,
        )
        .bind(&token.token_hash)
        .bind(&token.user_id)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert refresh token", e))?;

        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AcError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT
                token_hash, user_id::text AS user_id, expires_at, revoked,
                revoked_at, revocation_reason, created_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch refresh token", e))?;

        Ok(record)
    }

    async fn consume_and_replace(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
        replacement: &NewRefreshToken,
    ) -> Result<Option<String>, AcError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let consumed: Option<(String,)> = sqlx::query_as(
            r#"
            UPDATE refresh_tokens
            SET revoked = true, revoked_at = $2, revocation_reason = $3
            WHERE token_hash = $1
              AND revoked = false
              AND expires_at > $2
            RETURNING user_id::text
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .bind(RevocationReason::Rotated.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to consume refresh token", e))?;

        let Some((user_id,)) = consumed else {
            // Lost the race or the token was never redeemable; nothing written
            tx.rollback()
                .await
                .map_err(|e| db_error("Failed to roll back transaction", e))?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, expires_at)
            VALUES ($1, $2::uuid, $3)
            "#,
        )
        .bind(&replacement.token_hash)
        .bind(&user_id)
        .bind(replacement.expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to insert replacement refresh token", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit refresh rotation", e))?;

        Ok(Some(user_id))
    }

    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> Result<bool, AcError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = true, revoked_at = $2, revocation_reason = $3
            WHERE token_hash = $1 AND revoked = false
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .bind(RevocationReason::Logout.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to revoke refresh token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AcError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Store ping failed", e))?;
        Ok(())
    }
}
