//! Credential, refresh and introspection endpoints.

use crate::errors::AcError;
use crate::models::{
    CredentialsRequest, MeResponse, OkResponse, RefreshTokenRequest, TokenResponse,
};
use crate::observability::metrics::{record_error, record_token_validation};
use crate::observability::ErrorCategory;
use crate::routes::AppState;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use common::jwt::{extract_bearer_token, INVALID_TOKEN_MESSAGE};
use common::secret::ExposeSecret;
use std::sync::Arc;

/// Record the error metric for a failed operation and pass the error through.
fn track<T>(operation: &'static str, result: Result<T, AcError>) -> Result<T, AcError> {
    if let Err(e) = &result {
        record_error(operation, ErrorCategory::from(e).as_str(), e.status_code());
    }
    result
}

/// GET /
pub async fn root(State(state): State<Arc<AppState>>) -> String {
    format!(
        "{} running ({})",
        state.config.app_name, state.config.environment
    )
}

/// POST /register
#[tracing::instrument(skip_all, name = "auth.handler.register")]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AcError> {
    let pair = track(
        "register",
        state
            .users
            .register(&payload.email, payload.password.expose_secret())
            .await,
    )?;
    Ok((StatusCode::CREATED, Json(TokenResponse::from(pair))))
}

/// POST /login
#[tracing::instrument(skip_all, name = "auth.handler.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, AcError> {
    let pair = track(
        "login",
        state
            .users
            .login(&payload.email, payload.password.expose_secret())
            .await,
    )?;
    Ok(Json(TokenResponse::from(pair)))
}

/// POST /refresh
///
/// An empty token field is a malformed request (400), like `/logout`.
#[tracing::instrument(skip_all, name = "auth.handler.refresh")]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AcError> {
    let token = payload.refresh_token.expose_secret().trim();
    if token.is_empty() {
        return track(
            "refresh",
            Err(AcError::BadRequest("refresh_token is required".to_string())),
        );
    }

    let redemption = track("refresh", state.refresh.redeem(token).await)?;
    Ok(Json(TokenResponse::from(redemption.tokens)))
}

/// POST /logout
///
/// Succeeds for unknown, spent and already revoked tokens alike.
#[tracing::instrument(skip_all, name = "auth.handler.logout")]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<OkResponse>, AcError> {
    let token = payload.refresh_token.expose_secret().trim();
    if token.is_empty() {
        return track(
            "logout",
            Err(AcError::BadRequest("refresh_token is required".to_string())),
        );
    }

    state.refresh.revoke(token).await;
    Ok(Json(OkResponse { ok: true }))
}

/// GET /me
#[tracing::instrument(skip_all, name = "auth.handler.me")]
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, AcError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| {
            record_token_validation("error", Some("missing_bearer"));
            AcError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
        });
    let token = track("me", token)?;

    let claims = match state.verifier.verify(token) {
        Ok(claims) => {
            record_token_validation("success", None);
            claims
        }
        Err(e) => {
            record_token_validation("error", Some(e.as_label()));
            tracing::debug!(target: "auth.handler.me", error = %e, "Access token rejected");
            return track("me", Err(AcError::from(e)));
        }
    };

    Ok(Json(MeResponse {
        sub: claims.sub,
        roles: claims.roles,
        iss: claims.iss,
        aud: claims.aud,
        exp: claims.exp,
    }))
}
