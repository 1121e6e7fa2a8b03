//! Auth service
//!
//! Issues RS256 access tokens and rotating refresh tokens over HTTP.

use auth_service::config::Config;
use auth_service::crypto::KeyMaterial;
use auth_service::observability::metrics::init_metrics_recorder;
use auth_service::observability::HealthState;
use auth_service::repositories::{PgRefreshTokenStore, PgUserRepository, RefreshTokenStore};
use auth_service::routes::{self, AppState};
use auth_service::tasks::start_store_health_checker;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=info,tower_http=info".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    info!("Starting auth service");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    info!(
        app = %config.app_name,
        environment = %config.environment,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    let keys = Arc::new(
        KeyMaterial::from_pem(&config.jwt_private_key_pem, &config.jwt_public_key_pem).map_err(
            |e| {
                error!("Failed to load signing keys: {}", e);
                e
            },
        )?,
    );
    info!("Signing keys loaded");

    info!("Connecting to database...");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.store_timeout)
        .connect_with(config.database.connect_options()?)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            e
        })?;
    info!("Database connection established");

    let store: Arc<dyn RefreshTokenStore> = Arc::new(PgRefreshTokenStore::new(pool.clone()));
    let users = Arc::new(PgUserRepository::new(pool));
    let health = Arc::new(HealthState::new());

    let cancel_token = CancellationToken::new();
    let health_task = tokio::spawn(start_store_health_checker(
        store.clone(),
        health.clone(),
        config.health_check_interval,
        config.store_timeout,
        cancel_token.clone(),
    ));

    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::assemble(config, keys, store, users, health.clone()));
    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Auth service listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(health))
    .await?;

    cancel_token.cancel();
    if let Err(e) = health_task.await {
        error!("Store health task failed: {}", e);
    }

    info!("Auth service stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM and stop advertising readiness.
async fn shutdown_signal(health: Arc<HealthState>) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    health.set_not_ready();
}
