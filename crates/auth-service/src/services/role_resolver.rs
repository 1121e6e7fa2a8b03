use crate::errors::AcError;
use crate::repositories::users::DEFAULT_ROLE;
use crate::repositories::{with_timeout, UserRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Maps a principal to its current role names.
///
/// Reads the assignment relation on every call; nothing is cached.
#[derive(Clone)]
pub struct RoleResolver {
    users: Arc<dyn UserRepository>,
    store_timeout: Duration,
}

impl RoleResolver {
    pub fn new(users: Arc<dyn UserRepository>, store_timeout: Duration) -> Self {
        Self {
            users,
            store_timeout,
        }
    }

    /// Role names in assignment order, duplicates kept. A principal with no
    /// assignments gets `["user"]`.
    #[instrument(skip_all)]
    pub async fn roles_for(&self, principal_id: &str) -> Result<Vec<String>, AcError> {
        let roles = with_timeout(
            "get_user_roles",
            self.store_timeout,
            self.users.role_names(principal_id),
        )
        .await?;

        if roles.is_empty() {
            return Ok(vec![DEFAULT_ROLE.to_string()]);
        }
        Ok(roles)
    }
}
