//! Test server harness for E2E testing
//!
//! Provides `TestAuthServer`, the real auth-service router bound to a random
//! local port over in-memory stores with fault injection.

use crate::crypto_fixtures::{PRIMARY_PRIVATE_KEY_PEM, PRIMARY_PUBLIC_KEY_PEM};
use crate::test_ids::{TEST_AUDIENCE, TEST_ISSUER};
use auth_service::config::{
    Config, DatabaseConfig, DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_REFRESH_TOKEN_TTL_SECONDS, MIN_BCRYPT_COST,
};
use auth_service::crypto::KeyMaterial;
use auth_service::models::TokenResponse;
use auth_service::observability::metrics::init_metrics_recorder;
use auth_service::observability::HealthState;
use auth_service::repositories::{InMemoryRefreshTokenStore, InMemoryUserRepository};
use auth_service::routes::{self, AppState};
use auth_service::tasks::store_health::check_once;
use common::secret::SecretString;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Store timeout used by the harness; short so outage tests stay fast.
pub const TEST_STORE_TIMEOUT: Duration = Duration::from_millis(500);

/// Config for tests: fixture keys, cheapest allowed bcrypt cost, no database.
pub fn test_config() -> Config {
    Config {
        app_name: "auth-service".to_string(),
        environment: "test".to_string(),
        bind_address: "127.0.0.1:0".to_string(),
        database: DatabaseConfig::Url(SecretString::from("postgres://unused@localhost/unused")),
        db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
        jwt_issuer: TEST_ISSUER.to_string(),
        jwt_audience: TEST_AUDIENCE.to_string(),
        access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
        refresh_token_ttl_seconds: DEFAULT_REFRESH_TOKEN_TTL_SECONDS,
        jwt_private_key_pem: SecretString::from(PRIMARY_PRIVATE_KEY_PEM),
        jwt_public_key_pem: PRIMARY_PUBLIC_KEY_PEM.to_string(),
        store_timeout: TEST_STORE_TIMEOUT,
        bcrypt_cost: MIN_BCRYPT_COST,
        health_check_interval: Duration::from_secs(1),
    }
}

/// Test harness for spawning the auth service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_flow() -> Result<()> {
///     let server = TestAuthServer::spawn().await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .post(format!("{}/login", server.url()))
///         .json(&json!({"email": "a@example.com", "password": "password123"}))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 401);
///     Ok(())
/// }
/// ```
pub struct TestAuthServer {
    addr: SocketAddr,
    config: Config,
    store: Arc<InMemoryRefreshTokenStore>,
    users: Arc<InMemoryUserRepository>,
    health: Arc<HealthState>,
    client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestAuthServer {
    /// Spawn a server with [`test_config`].
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_config(test_config()).await
    }

    /// Spawn a server with a caller-supplied config.
    ///
    /// The server binds to 127.0.0.1:0, runs one store health check so
    /// `/ready` starts accurate, and serves in a background task.
    pub async fn spawn_with_config(config: Config) -> Result<Self, anyhow::Error> {
        let keys = Arc::new(
            KeyMaterial::from_pem(&config.jwt_private_key_pem, &config.jwt_public_key_pem)
                .map_err(|e| anyhow::anyhow!("Failed to load test keys: {}", e))?,
        );

        let store = Arc::new(InMemoryRefreshTokenStore::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let health = Arc::new(HealthState::new());
        check_once(store.as_ref(), &health, config.store_timeout).await;

        let state = Arc::new(AppState::assemble(
            config.clone(),
            keys,
            store.clone(),
            users.clone(),
            health.clone(),
        ));

        // The global recorder can only be installed once per process; later
        // servers get a standalone recorder.
        let metrics_handle = init_metrics_recorder().unwrap_or_else(|_| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .build_recorder()
                .handle()
        });

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;
        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            store,
            users,
            health,
            client: reqwest::Client::new(),
            handle,
        })
    }

    /// Base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Refresh token store, for inspection and fault injection.
    pub fn store(&self) -> &InMemoryRefreshTokenStore {
        &self.store
    }

    /// User store, for seeding accounts and roles and for fault injection.
    pub fn users(&self) -> &InMemoryUserRepository {
        &self.users
    }

    pub fn health(&self) -> &HealthState {
        &self.health
    }

    /// Run one store health check now instead of waiting for a poll.
    pub async fn refresh_health(&self) -> bool {
        check_once(self.store.as_ref(), &self.health, self.config.store_timeout).await
    }

    /// POST a JSON body and return the raw response.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, anyhow::Error> {
        Ok(self
            .client
            .post(format!("{}{}", self.url(), path))
            .json(body)
            .send()
            .await?)
    }

    /// Register an account, failing unless the server answers 201.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse, anyhow::Error> {
        let response = self
            .post_json("/register", &json!({"email": email, "password": password}))
            .await?;
        anyhow::ensure!(
            response.status() == 201,
            "register returned {}",
            response.status()
        );
        Ok(response.json().await?)
    }

    /// Redeem a refresh token and return the raw response.
    pub async fn refresh(&self, refresh_token: &str) -> Result<reqwest::Response, anyhow::Error> {
        self.post_json("/refresh", &json!({"refresh_token": refresh_token}))
            .await
    }
}

impl Drop for TestAuthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
