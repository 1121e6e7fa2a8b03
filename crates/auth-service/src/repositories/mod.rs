//! Storage layer.
//!
//! Services only see the [`RefreshTokenStore`] and [`UserRepository`] traits.
//! Postgres implementations back the running service; the in-memory ones back
//! the test harness and fault injection.

pub mod memory;
pub mod refresh_tokens;
pub mod users;

pub use memory::{InMemoryRefreshTokenStore, InMemoryUserRepository};
pub use refresh_tokens::PgRefreshTokenStore;
pub use users::PgUserRepository;

use crate::errors::AcError;
use crate::models::{NewRefreshToken, RefreshTokenRecord, User};
use crate::observability::metrics::record_store_operation;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::{Duration, Instant};

/// Persistence for hashed refresh tokens.
///
/// Records are never deleted. `revoked` only ever goes from false to true.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn insert(&self, token: &NewRefreshToken) -> Result<(), AcError>;

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AcError>;

    /// Mark the token consumed and persist its replacement as one unit.
    ///
    /// The flip only applies to a record that is still active at `now`.
    /// Returns the owning principal when this caller won, `None` when the
    /// record was already consumed, revoked, expired or absent. Nothing is
    /// written in the `None` case.
    async fn consume_and_replace(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
        replacement: &NewRefreshToken,
    ) -> Result<Option<String>, AcError>;

    /// Revoke an active token (logout). Returns whether a record changed.
    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> Result<bool, AcError>;

    /// Cheap round trip used by the readiness poller.
    async fn ping(&self) -> Result<(), AcError>;
}

/// Principals and their role assignments.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create an active principal holding the `user` role.
    ///
    /// Returns `AcError::Conflict` when the email is already registered.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AcError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AcError>;

    /// Role names assigned to a principal, oldest assignment first.
    async fn role_names(&self, user_id: &str) -> Result<Vec<String>, AcError>;

    /// Whether the principal exists and may receive tokens. Unknown ids are
    /// not active.
    async fn is_active(&self, user_id: &str) -> Result<bool, AcError>;
}

/// Run one store call under a deadline and record its outcome.
///
/// A timeout surfaces as `AcError::StoreUnavailable`, never as a verdict on
/// the data. Dropping the inner future cancels the in-flight call.
pub async fn with_timeout<T, F>(operation: &'static str, timeout: Duration, call: F) -> Result<T, AcError>
where
    F: Future<Output = Result<T, AcError>>,
{
    let start = Instant::now();
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => {
            record_store_operation(operation, "success", start.elapsed());
            Ok(value)
        }
        Ok(Err(e)) => {
            record_store_operation(operation, "error", start.elapsed());
            Err(e)
        }
        Err(_) => {
            record_store_operation(operation, "timeout", start.elapsed());
            tracing::warn!(
                target: "auth.store",
                operation = operation,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "Store operation timed out"
            );
            Err(AcError::StoreUnavailable(format!(
                "{operation} timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}

/// Attach context to a sqlx error while keeping availability failures retryable.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> AcError {
    match AcError::from(err) {
        AcError::Database(msg) => AcError::Database(format!("{context}: {msg}")),
        other => other,
    }
}
