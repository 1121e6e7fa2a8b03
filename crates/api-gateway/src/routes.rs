use crate::config::Config;
use crate::handlers;
use crate::middleware::{require_auth, AuthState};
use axum::{middleware, routing::get, Router};
use common::jwt::TokenVerifier;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the gateway router.
///
/// Public: `/`, `/health`, `/ready`, `/v1/ping`. Protected: `/v1/me`.
pub fn build_routes(config: Arc<Config>, verifier: TokenVerifier) -> Router {
    let auth_state = Arc::new(AuthState { verifier });

    let public_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/v1/ping", get(handlers::ping))
        .with_state(config);

    let protected_routes = Router::new()
        .route("/v1/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
}
