//! Bearer authentication for protected routes.
//!
//! Verifies the access token locally and stores the claims in request
//! extensions for downstream handlers.

use crate::errors::GwError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::IntoResponse,
};
use common::jwt::{extract_bearer_token, TokenVerifier};
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub verifier: TokenVerifier,
}

#[instrument(skip_all, name = "gw.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, GwError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| {
            tracing::debug!(target: "gw.middleware.auth", "Missing or non-bearer Authorization header");
            GwError::MissingBearerToken
        })?;

    let claims = state.verifier.verify(token).map_err(|e| {
        tracing::debug!(target: "gw.middleware.auth", reason = e.as_label(), "Access token rejected");
        GwError::InvalidToken
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
