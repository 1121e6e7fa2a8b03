//! User repository for principals and role assignments.

use crate::errors::AcError;
use crate::models::{User, USER_STATUS_ACTIVE};
use crate::repositories::{db_error, UserRepository};
use async_trait::async_trait;
use sqlx::PgPool;

/// Role granted to every newly registered principal.
pub const DEFAULT_ROLE: &str = "user";

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_unique";

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AcError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, status
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .and_then(|db| db.constraint())
                .is_some_and(|c| c == EMAIL_UNIQUE_CONSTRAINT);
            if duplicate {
                AcError::Conflict("Email is already registered".to_string())
            } else {
                db_error("Failed to create user", e)
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, r.id FROM roles r WHERE r.name = $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user.id)
        .bind(DEFAULT_ROLE)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to assign default role", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit user creation", e))?;

        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AcError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, status
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch user by email", e))?;

        Ok(user)
    }

    async fn role_names(&self, user_id: &str) -> Result<Vec<String>, AcError> {
        let roles: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1::uuid
            ORDER BY ur.assigned_at, r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch user roles", e))?;

        Ok(roles.into_iter().map(|(r,)| r).collect())
    }

    async fn is_active(&self, user_id: &str) -> Result<bool, AcError> {
        let status: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT status
            FROM users
            WHERE id = $1::uuid
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch user status", e))?;

        Ok(status.is_some_and(|(s,)| s == USER_STATUS_ACTIVE))
    }
}
