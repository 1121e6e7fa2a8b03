//! Registration and password login.

use crate::crypto::{self, DUMMY_PASSWORD_HASH};
use crate::errors::AcError;
use crate::models::TokenPair;
use crate::observability::hash_for_correlation;
use crate::observability::metrics::record_token_issuance;
use crate::repositories::{with_timeout, UserRepository};
use crate::services::{RoleResolver, TokenIssuer};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub struct UserService {
    users: Arc<dyn UserRepository>,
    roles: RoleResolver,
    issuer: Arc<TokenIssuer>,
    bcrypt_cost: u32,
}

/// Trimmed, lower-cased email and trimmed password.
fn normalize_credentials(email: &str, password: &str) -> Result<(String, String), AcError> {
    let email = email.trim().to_lowercase();
    let password = password.trim().to_string();

    if email.is_empty() || password.is_empty() {
        return Err(AcError::BadRequest(
            "email and password are required".to_string(),
        ));
    }
    Ok((email, password))
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: RoleResolver,
        issuer: Arc<TokenIssuer>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            roles,
            issuer,
            bcrypt_cost,
        }
    }

    /// Create a principal and log it in.
    ///
    /// # Errors
    ///
    /// - `BadRequest` for a missing field or a password shorter than 8 characters
    /// - `Conflict` when the email is already registered
    #[instrument(skip_all, name = "auth.user.register")]
    pub async fn register(&self, email: &str, password: &str) -> Result<TokenPair, AcError> {
        let start = Instant::now();
        let result = self.register_inner(email, password).await;
        let status = if result.is_ok() { "success" } else { "error" };
        record_token_issuance("register", status, start.elapsed());
        result
    }

    async fn register_inner(&self, email: &str, password: &str) -> Result<TokenPair, AcError> {
        let (email, password) = normalize_credentials(email, password)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AcError::BadRequest(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let password_hash = self.hash_blocking(password).await?;
        let timeout = self.issuer.settings().store_timeout;

        let user = with_timeout(
            "create_user",
            timeout,
            self.users.create_user(&email, &password_hash),
        )
        .await?;

        let user_id = user.id.to_string();
        tracing::info!(
            target: "auth.user",
            principal = %hash_for_correlation(&user_id),
            "User registered"
        );

        let roles = self.roles.roles_for(&user_id).await?;
        self.issuer.issue(&user_id, roles).await
    }

    /// Verify a password and issue a pair.
    ///
    /// Unknown emails still pay for one bcrypt verification so response
    /// timing does not reveal which accounts exist.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown email or wrong password
    /// - `PrincipalInactive` when the password matched but status is not active
    #[instrument(skip_all, name = "auth.user.login")]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AcError> {
        let start = Instant::now();
        let result = self.login_inner(email, password).await;
        let status = if result.is_ok() { "success" } else { "error" };
        record_token_issuance("login", status, start.elapsed());
        result
    }

    async fn login_inner(&self, email: &str, password: &str) -> Result<TokenPair, AcError> {
        let (email, password) = normalize_credentials(email, password)?;
        let timeout = self.issuer.settings().store_timeout;

        let user = with_timeout("get_user_by_email", timeout, self.users.get_by_email(&email)).await?;

        let Some(user) = user else {
            // Burn the same bcrypt work as a real check; the outcome is irrelevant
            let _ = self
                .verify_blocking(password, DUMMY_PASSWORD_HASH.to_string())
                .await;
            tracing::debug!(target: "auth.user", "Login failed: unknown email");
            return Err(AcError::InvalidCredentials);
        };

        let user_id = user.id.to_string();
        if !self.verify_blocking(password, user.password_hash.clone()).await? {
            tracing::info!(
                target: "auth.user",
                principal = %hash_for_correlation(&user_id),
                "Login failed: wrong password"
            );
            return Err(AcError::InvalidCredentials);
        }

        if !user.is_active() {
            tracing::info!(
                target: "auth.user",
                principal = %hash_for_correlation(&user_id),
                status = %user.status,
                "Login refused: principal not active"
            );
            return Err(AcError::PrincipalInactive);
        }

        let roles = self.roles.roles_for(&user_id).await?;
        self.issuer.issue(&user_id, roles).await
    }

    async fn hash_blocking(&self, password: String) -> Result<String, AcError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || crypto::hash_password(&password, cost))
            .await
            .map_err(|e| AcError::Crypto(format!("Password hashing task failed: {e}")))?
    }

    async fn verify_blocking(&self, password: String, hash: String) -> Result<bool, AcError> {
        tokio::task::spawn_blocking(move || crypto::verify_password(&password, &hash))
            .await
            .map_err(|e| AcError::Crypto(format!("Password verification task failed: {e}")))?
    }
}
