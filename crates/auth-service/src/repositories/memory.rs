//! In-memory stores for tests and fault injection.
//!
//! Each store guards its state with one mutex, so `consume_and_replace` is
//! atomic with respect to every other call on the same store.

use crate::errors::AcError;
use crate::models::{
    NewRefreshToken, RefreshTokenRecord, RevocationReason, User, USER_STATUS_ACTIVE,
};
use crate::repositories::users::DEFAULT_ROLE;
use crate::repositories::{RefreshTokenStore, UserRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

/// Injected latency and outages, applied before every call.
#[derive(Debug, Default)]
struct Faults {
    unavailable: AtomicBool,
    latency_ms: AtomicU64,
}

impl Faults {
    async fn apply(&self, operation: &str) -> Result<(), AcError> {
        let latency_ms = self.latency_ms.load(Ordering::SeqCst);
        if latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(latency_ms)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AcError::StoreUnavailable(format!(
                "{operation}: injected outage"
            )));
        }
        Ok(())
    }

    fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn set_latency(&self, latency: Duration) {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(ms, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AcError> {
    mutex.lock().map_err(|_| AcError::Internal)
}

// ============================================================================
// Refresh tokens
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    records: Mutex<HashMap<String, RefreshTokenRecord>>,
    faults: Faults,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.set_unavailable(unavailable);
    }

    /// Delay every subsequent call.
    pub fn set_latency(&self, latency: Duration) {
        self.faults.set_latency(latency);
    }

    /// Snapshot of one record, bypassing injected faults.
    pub fn record(&self, token_hash: &str) -> Option<RefreshTokenRecord> {
        lock(&self.records)
            .ok()
            .and_then(|records| records.get(token_hash).cloned())
    }

    /// Records for a principal that are still redeemable at `now`.
    pub fn active_count(&self, user_id: &str, now: DateTime<Utc>) -> usize {
        lock(&self.records)
            .map(|records| {
                records
                    .values()
                    .filter(|r| r.user_id == user_id && !r.revoked && r.expires_at > now)
                    .count()
            })
            .unwrap_or(0)
    }

    fn insert_locked(
        records: &mut HashMap<String, RefreshTokenRecord>,
        token: &NewRefreshToken,
    ) -> Result<(), AcError> {
        if records.contains_key(&token.token_hash) {
            return Err(AcError::Database(
                "Failed to insert refresh token: duplicate token_hash".to_string(),
            ));
        }
        records.insert(
            token.token_hash.clone(),
            RefreshTokenRecord {
                token_hash: token.token_hash.clone(),
                user_id: token.user_id.clone(),
                expires_at: token.expires_at,
                revoked: false,
                revoked_at: None,
                revocation_reason: None,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn mark_revoked(record: &mut RefreshTokenRecord, now: DateTime<Utc>, reason: RevocationReason) {
        record.revoked = true;
        record.revoked_at = Some(now);
        record.revocation_reason = Some(reason.as_str().to_string());
    }

    fn consume_locked(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
        replacement: &NewRefreshToken,
    ) -> Result<Option<String>, AcError> {
        let mut records = lock(&self.records)?;

        let user_id = match records.get(token_hash) {
            Some(r) if !r.revoked && r.expires_at > now => r.user_id.clone(),
            _ => return Ok(None),
        };

        let replacement = NewRefreshToken {
            user_id: user_id.clone(),
            ..replacement.clone()
        };
        Self::insert_locked(&mut records, &replacement)?;

        if let Some(record) = records.get_mut(token_hash) {
            Self::mark_revoked(record, now, RevocationReason::Rotated);
        }

        Ok(Some(user_id))
    }

    fn revoke_locked(&self, token_hash: &str, now: DateTime<Utc>) -> Result<bool, AcError> {
        let mut records = lock(&self.records)?;
        match records.get_mut(token_hash) {
            Some(record) if !record.revoked => {
                Self::mark_revoked(record, now, RevocationReason::Logout);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn insert(&self, token: &NewRefreshToken) -> Result<(), AcError> {
        self.faults.apply("insert_refresh_token").await?;
        let mut records = lock(&self.records)?;
        Self::insert_locked(&mut records, token)
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AcError> {
        self.faults.apply("find_refresh_token").await?;
        Ok(lock(&self.records)?.get(token_hash).cloned())
    }

    async fn consume_and_replace(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
        replacement: &NewRefreshToken,
    ) -> Result<Option<String>, AcError> {
        self.faults.apply("consume_refresh_token").await?;
        self.consume_locked(token_hash, now, replacement)
    }

    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> Result<bool, AcError> {
        self.faults.apply("revoke_refresh_token").await?;
        self.revoke_locked(token_hash, now)
    }

    async fn ping(&self) -> Result<(), AcError> {
        self.faults.apply("ping").await
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Default)]
struct UserTables {
    by_email: HashMap<String, User>,
    roles: HashMap<String, Vec<String>>,
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    tables: Mutex<UserTables>,
    faults: Faults,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.set_unavailable(unavailable);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.faults.set_latency(latency);
    }

    /// Seed a principal directly, with any status and no roles.
    pub fn insert_user(&self, email: &str, password_hash: &str, status: &str) -> Result<User, AcError> {
        let mut tables = lock(&self.tables)?;
        if tables.by_email.contains_key(email) {
            return Err(AcError::Conflict("Email is already registered".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            status: status.to_string(),
        };
        tables.by_email.insert(email.to_string(), user.clone());
        Ok(user)
    }

    /// Change a seeded principal's status.
    pub fn set_status(&self, email: &str, status: &str) -> Result<(), AcError> {
        let mut tables = lock(&self.tables)?;
        let user = tables
            .by_email
            .get_mut(email)
            .ok_or_else(|| AcError::BadRequest(format!("no such user: {email}")))?;
        user.status = status.to_string();
        Ok(())
    }

    /// Replace a principal's role assignments, in order.
    pub fn set_roles(&self, user_id: &str, roles: Vec<String>) -> Result<(), AcError> {
        lock(&self.tables)?.roles.insert(user_id.to_string(), roles);
        Ok(())
    }

    fn create_locked(&self, email: &str, password_hash: &str) -> Result<User, AcError> {
        let user = self.insert_user(email, password_hash, USER_STATUS_ACTIVE)?;
        self.set_roles(&user.id.to_string(), vec![DEFAULT_ROLE.to_string()])?;
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AcError> {
        self.faults.apply("create_user").await?;
        self.create_locked(email, password_hash)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AcError> {
        self.faults.apply("get_user_by_email").await?;
        Ok(lock(&self.tables)?.by_email.get(email).cloned())
    }

    async fn role_names(&self, user_id: &str) -> Result<Vec<String>, AcError> {
        self.faults.apply("get_user_roles").await?;
        Ok(lock(&self.tables)?
            .roles
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn is_active(&self, user_id: &str) -> Result<bool, AcError> {
        self.faults.apply("get_user_status").await?;
        Ok(lock(&self.tables)?
            .by_email
            .values()
            .any(|u| u.id.to_string() == user_id && u.is_active()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::crypto::hash_refresh_token;
    use chrono::Duration as ChronoDuration;

    fn new_token(value: &str, user_id: &str) -> NewRefreshToken {
        NewRefreshToken {
            token_hash: hash_refresh_token(value),
            user_id: user_id.to_string(),
            expires_at: Utc::now() + ChronoDuration::days(7),
        }
    }

    #[tokio::test]
    async fn test_consume_and_replace_single_use() {
        let store = InMemoryRefreshTokenStore::new();
        let old = new_token("old", "u1");
        store.insert(&old).await.unwrap();

        let first = store
            .consume_and_replace(&old.token_hash, Utc::now(), &new_token("a", "u1"))
            .await
            .unwrap();
        let second = store
            .consume_and_replace(&old.token_hash, Utc::now(), &new_token("b", "u1"))
            .await
            .unwrap();

        assert_eq!(first.as_deref(), Some("u1"));
        assert!(second.is_none());
        assert!(store.record(&hash_refresh_token("b")).is_none());
        assert_eq!(store.active_count("u1", Utc::now()), 1);
    }

    #[tokio::test]
    async fn test_revoke_then_consume_fails() {
        let store = InMemoryRefreshTokenStore::new();
        let token = new_token("t", "u1");
        store.insert(&token).await.unwrap();

        assert!(store.revoke(&token.token_hash, Utc::now()).await.unwrap());
        assert!(!store.revoke(&token.token_hash, Utc::now()).await.unwrap());

        let result = store
            .consume_and_replace(&token.token_hash, Utc::now(), &new_token("n", "u1"))
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(
            store.record(&token.token_hash).unwrap().revocation_reason.as_deref(),
            Some("logout")
        );
    }

    #[tokio::test]
    async fn test_injected_outage() {
        let store = InMemoryRefreshTokenStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.ping().await, Err(AcError::StoreUnavailable(_))));

        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_user_repository_roles() {
        let repo = InMemoryUserRepository::new();

        let user = repo.create_user("a@example.com", "hash").await.unwrap();
        assert_eq!(
            repo.role_names(&user.id.to_string()).await.unwrap(),
            vec!["user".to_string()]
        );

        let seeded = repo.insert_user("b@example.com", "hash", "active").unwrap();
        assert!(repo.role_names(&seeded.id.to_string()).await.unwrap().is_empty());

        let dup = repo.create_user("a@example.com", "hash").await;
        assert!(matches!(dup, Err(AcError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_user_repository_status() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create_user("a@example.com", "hash").await.unwrap();
        let id = user.id.to_string();
        assert!(repo.is_active(&id).await.unwrap());

        repo.set_status("a@example.com", "suspended").unwrap();
        assert!(!repo.is_active(&id).await.unwrap());

        assert!(!repo.is_active("u1").await.unwrap());
    }
}
