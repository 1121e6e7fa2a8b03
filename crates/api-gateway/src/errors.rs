//! Gateway error type.
//!
//! Bodies are `{"error": "<code>"}` with no detail about which check failed.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GwError {
    /// No `Authorization` header, or a scheme other than bearer.
    #[error("Missing bearer token")]
    MissingBearerToken,

    #[error("Invalid token")]
    InvalidToken,
}

impl GwError {
    fn code(&self) -> &'static str {
        match self {
            GwError::MissingBearerToken => "missing_bearer_token",
            GwError::InvalidToken => "invalid_token",
        }
    }
}

impl IntoResponse for GwError {
    fn into_response(self) -> Response {
        let challenge = match self {
            GwError::MissingBearerToken => "Bearer realm=\"fintech-platform\"",
            GwError::InvalidToken => "Bearer realm=\"fintech-platform\", error=\"invalid_token\"",
        };

        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": self.code() })),
        )
            .into_response();
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
        response
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: GwError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_bearer_body() {
        let (status, body) = body_json(GwError::MissingBearerToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "missing_bearer_token"}));
    }

    #[tokio::test]
    async fn test_invalid_token_body_and_challenge() {
        let response = GwError::InvalidToken.into_response();
        assert!(response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("invalid_token"));

        let (status, body) = body_json(GwError::InvalidToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "invalid_token"}));
    }
}
