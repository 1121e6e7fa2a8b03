//! Gateway handlers.

use crate::config::Config;
use axum::{extract::State, Extension, Json};
use chrono::{SecondsFormat, Utc};
use common::jwt::AccessClaims;
use serde_json::{json, Value};
use std::sync::Arc;

/// Routes advertised by `/`.
pub const ADVERTISED_ROUTES: [&str; 4] = ["/health", "/ready", "/v1/ping", "/v1/me"];

/// GET /
pub async fn root(State(config): State<Arc<Config>>) -> Json<Value> {
    Json(json!({
        "service": config.app_name,
        "env": config.environment,
        "routes": ADVERTISED_ROUTES,
    }))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

/// GET /ready
///
/// The gateway has no dependencies; the key was validated at startup.
pub async fn ready() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}

/// GET /v1/ping
pub async fn ping(State(config): State<Arc<Config>>) -> Json<Value> {
    Json(json!({
        "message": "pong",
        "app": config.app_name,
        "env": config.environment,
    }))
}

/// GET /v1/me (behind `require_auth`)
pub async fn me(Extension(claims): Extension<AccessClaims>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "claims": claims,
    }))
}
