//! Store health poller.
//!
//! Pings the refresh token store on a fixed interval and publishes the result
//! to [`HealthState`] and the `auth_store_ready` gauge. Exits when the
//! cancellation token fires.

use crate::observability::metrics::set_store_ready;
use crate::observability::HealthState;
use crate::repositories::{with_timeout, RefreshTokenStore};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Run one ping and publish the result. Returns the new readiness.
pub async fn check_once(
    store: &dyn RefreshTokenStore,
    health: &HealthState,
    store_timeout: Duration,
) -> bool {
    let ready = match with_timeout("ping", store_timeout, store.ping()).await {
        Ok(()) => true,
        Err(e) => {
            warn!(target: "auth.tasks.store_health", error = %e, "Store health check failed");
            false
        }
    };

    if ready != health.store_ready() {
        info!(target: "auth.tasks.store_health", ready, "Store readiness changed");
    }
    health.set_store_ready(ready);
    set_store_ready(ready);
    ready
}

/// Poll the store until `cancel_token` is cancelled.
///
/// The first check runs immediately so readiness does not wait a full interval.
pub async fn start_store_health_checker(
    store: Arc<dyn RefreshTokenStore>,
    health: Arc<HealthState>,
    interval: Duration,
    store_timeout: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                check_once(store.as_ref(), &health, store_timeout).await;
            }
            _ = cancel_token.cancelled() => {
                info!(target: "auth.tasks.store_health", "Store health checker received shutdown signal, exiting");
                break;
            }
        }
    }
}
