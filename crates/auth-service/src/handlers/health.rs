//! Liveness and readiness endpoints.

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// GET /health
///
/// Process liveness only; no dependencies are checked.
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /ready
///
/// Reads the flags maintained by startup and the store health task. The
/// response never names the failing dependency's address or error.
#[tracing::instrument(skip_all, name = "auth.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if !state.health.keys_loaded() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                store: None,
                error: Some("Signing keys not loaded".to_string()),
            }),
        );
    }

    if !state.health.store_ready() {
        tracing::warn!(target: "auth.health", "Readiness check failed: store unavailable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                store: Some("unhealthy"),
                error: Some("Service dependencies unavailable".to_string()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            store: Some("healthy"),
            error: None,
        }),
    )
}
