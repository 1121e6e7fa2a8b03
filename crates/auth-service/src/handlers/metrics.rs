use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// GET /metrics
///
/// Prometheus text exposition. Unauthenticated; carries no secrets.
#[tracing::instrument(skip_all, name = "auth.metrics.handler")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
