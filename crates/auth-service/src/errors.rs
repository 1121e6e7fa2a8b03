//! Auth service error types.
//!
//! Every variant maps to an HTTP status via the `IntoResponse` impl. Client
//! messages are generic; the underlying cause is logged server-side.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::jwt::JwtValidationError;
use serde::Serialize;
use thiserror::Error;

/// Seconds a client should wait before retrying after a store outage.
pub const RETRY_AFTER_SECONDS: u32 = 1;

#[derive(Debug, Error)]
pub enum AcError {
    #[error("Database error: {0}")]
    Database(String),

    /// The store timed out or could not be reached. Retryable.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Signing or persisting a freshly minted token pair failed.
    #[error("Token issuance failed: {0}")]
    Issuance(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Principal is not active")]
    PrincipalInactive,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Refresh token unknown, consumed, revoked or expired.
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl AcError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            AcError::Database(_) | AcError::Issuance(_) | AcError::Crypto(_) | AcError::Internal => {
                500
            }
            AcError::StoreUnavailable(_) => 503,
            AcError::InvalidCredentials
            | AcError::InvalidToken(_)
            | AcError::InvalidRefreshToken => 401,
            AcError::PrincipalInactive => 403,
            AcError::Conflict(_) => 409,
            AcError::BadRequest(_) => 400,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AcError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AcError::Database(err) => {
                tracing::error!(target: "auth.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            AcError::StoreUnavailable(reason) => {
                tracing::warn!(target: "auth.availability", reason = %reason, "Store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                )
            }
            AcError::Issuance(err) => {
                tracing::error!(target: "auth.issuance", error = %err, "Token issuance failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ISSUANCE_ERROR",
                    "Unable to issue tokens".to_string(),
                )
            }
            AcError::Crypto(err) => {
                tracing::error!(target: "auth.crypto", error = %err, "Cryptographic operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CRYPTO_ERROR",
                    "An internal cryptographic error occurred".to_string(),
                )
            }
            AcError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            AcError::PrincipalInactive => (
                StatusCode::FORBIDDEN,
                "PRINCIPAL_INACTIVE",
                "Account is not active".to_string(),
            ),
            AcError::InvalidToken(reason) => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", reason.clone())
            }
            AcError::InvalidRefreshToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_REFRESH_TOKEN",
                "The refresh token is invalid or expired".to_string(),
            ),
            AcError::Conflict(reason) => (StatusCode::CONFLICT, "CONFLICT", reason.clone()),
            AcError::BadRequest(reason) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone()),
            AcError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            let challenge = match self {
                AcError::InvalidCredentials => "Bearer realm=\"fintech-auth\"",
                _ => "Bearer realm=\"fintech-auth\", error=\"invalid_token\"",
            };
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
        }

        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECONDS));
        }

        response
    }
}

/// Pool exhaustion and I/O failures are availability problems, not data problems.
impl From<sqlx::Error> for AcError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AcError::StoreUnavailable(err.to_string())
            }
            other => AcError::Database(other.to_string()),
        }
    }
}

/// Every verification failure collapses to the same client-facing message.
impl From<JwtValidationError> for AcError {
    fn from(err: JwtValidationError) -> Self {
        AcError::InvalidToken(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;

    async fn read_body_json(body: Body) -> serde_json::Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AcError::Database("x".into()).status_code(), 500);
        assert_eq!(AcError::StoreUnavailable("x".into()).status_code(), 503);
        assert_eq!(AcError::Issuance("x".into()).status_code(), 500);
        assert_eq!(AcError::Crypto("x".into()).status_code(), 500);
        assert_eq!(AcError::InvalidCredentials.status_code(), 401);
        assert_eq!(AcError::PrincipalInactive.status_code(), 403);
        assert_eq!(AcError::InvalidToken("x".into()).status_code(), 401);
        assert_eq!(AcError::InvalidRefreshToken.status_code(), 401);
        assert_eq!(AcError::Conflict("x".into()).status_code(), 409);
        assert_eq!(AcError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(AcError::Internal.status_code(), 500);
    }

    #[tokio::test]
    async fn test_invalid_refresh_token_response() {
        let response = AcError::InvalidRefreshToken.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let auth_header = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(auth_header.contains("invalid_token"));

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "INVALID_REFRESH_TOKEN");
    }

    #[tokio::test]
    async fn test_store_unavailable_hides_reason_and_sets_retry_after() {
        let response =
            AcError::StoreUnavailable("pool timed out on db-primary:5432".into()).into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "1");

        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
        let message = body["error"]["message"].as_str().unwrap();
        assert!(!message.contains("db-primary"));
    }

    #[tokio::test]
    async fn test_issuance_error_is_generic() {
        let response = AcError::Issuance("insert failed: constraint xyz".into()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_body_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "ISSUANCE_ERROR");
        assert!(!body["error"]["message"].as_str().unwrap().contains("xyz"));
    }

    #[tokio::test]
    async fn test_invalid_credentials_challenge_has_no_token_error() {
        let response = AcError::InvalidCredentials.into_response();

        let auth_header = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(!auth_header.contains("invalid_token"));
    }

    #[tokio::test]
    async fn test_forbidden_has_no_challenge() {
        let response = AcError::PrincipalInactive.into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_jwt_errors_collapse_to_one_message() {
        let a = AcError::from(JwtValidationError::Expired);
        let b = AcError::from(JwtValidationError::AlgorithmMismatch);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_sqlx_pool_timeout_is_unavailable() {
        assert!(matches!(
            AcError::from(sqlx::Error::PoolTimedOut),
            AcError::StoreUnavailable(_)
        ));
        assert!(matches!(
            AcError::from(sqlx::Error::RowNotFound),
            AcError::Database(_)
        ));
    }
}
