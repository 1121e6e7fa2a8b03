//! Observability for the auth service.
//!
//! # Privacy by Default
//!
//! Instrumented functions use `#[instrument(skip_all)]` and list safe fields
//! explicitly. Fields fall into three groups:
//! - **SAFE**: logged in plaintext (operation names, outcomes, status codes)
//! - **HASHED**: principal ids, via [`hash_for_correlation`]
//! - **NEVER**: passwords, refresh tokens, refresh token hashes, access tokens, keys

pub mod health;
pub mod metrics;

pub use health::HealthState;

use crate::errors::AcError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for principal ids that need correlation across log entries but
/// should not be stored in plaintext. Not a protection for secrets.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(digest.get(..4).unwrap_or_default())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad credentials, inactive principals, invalid or spent tokens
    Authentication,
    /// Malformed or conflicting client input
    Client,
    /// Store timeouts and outages
    Availability,
    /// Signing, hashing, database and other server-side failures
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Client => "client",
            ErrorCategory::Availability => "availability",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&AcError> for ErrorCategory {
    fn from(err: &AcError) -> Self {
        match err {
            AcError::InvalidCredentials
            | AcError::PrincipalInactive
            | AcError::InvalidToken(_)
            | AcError::InvalidRefreshToken => ErrorCategory::Authentication,
            AcError::BadRequest(_) | AcError::Conflict(_) => ErrorCategory::Client,
            AcError::StoreUnavailable(_) => ErrorCategory::Availability,
            AcError::Database(_) | AcError::Issuance(_) | AcError::Crypto(_) | AcError::Internal => {
                ErrorCategory::Internal
            }
        }
    }
}
