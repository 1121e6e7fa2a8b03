//! HTTP routes for the auth service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::crypto::KeyMaterial;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::observability::HealthState;
use crate::repositories::{RefreshTokenStore, UserRepository};
use crate::services::{RefreshService, RoleResolver, TokenIssuer, TokenSettings, UserService};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use common::jwt::TokenVerifier;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Upper bound on any single request, bcrypt included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<UserService>,
    pub refresh: Arc<RefreshService>,
    /// Verifier for this service's own access tokens (`/me`).
    pub verifier: TokenVerifier,
    pub health: Arc<HealthState>,
}

impl AppState {
    /// Wire the services over the given stores.
    ///
    /// Marks signing keys as loaded on `health`; store readiness is left to
    /// the health task.
    pub fn assemble(
        config: Config,
        keys: Arc<KeyMaterial>,
        store: Arc<dyn RefreshTokenStore>,
        user_repo: Arc<dyn UserRepository>,
        health: Arc<HealthState>,
    ) -> Self {
        let settings = TokenSettings::from_config(&config);
        let issuer = Arc::new(TokenIssuer::new(keys, settings, store.clone()));
        let roles = RoleResolver::new(user_repo.clone(), config.store_timeout);

        let users = Arc::new(UserService::new(
            user_repo.clone(),
            roles.clone(),
            issuer.clone(),
            config.bcrypt_cost,
        ));
        let refresh = Arc::new(RefreshService::new(issuer.clone(), roles, user_repo, store));
        let verifier = issuer.verifier();
        health.set_keys_loaded();

        Self {
            config,
            users,
            refresh,
            verifier,
            health,
        }
    }
}

/// Build the application routes.
///
/// - `/`, `/health`, `/ready`, `/metrics` - operational
/// - `/register`, `/login`, `/refresh`, `/logout` - credential endpoints
/// - `/me` - bearer-authenticated introspection
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let app_routes = Router::new()
        .route("/", get(handlers::auth_handler::root))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/register", post(handlers::auth_handler::register))
        .route("/login", post(handlers::auth_handler::login))
        .route("/refresh", post(handlers::auth_handler::refresh))
        .route("/logout", post(handlers::auth_handler::logout))
        .route("/me", get(handlers::auth_handler::me))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics::metrics_handler))
        .with_state(metrics_handle);

    // Bottom-to-top: metrics (outermost), timeout, trace
    app_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(middleware::from_fn(http_metrics_middleware))
}
