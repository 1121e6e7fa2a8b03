//! Metrics definitions for the auth service
//!
//! All metrics follow Prometheus naming conventions:
//! - `auth_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `operation`: register, login, refresh for issuance; a fixed set of store calls
//! - `status`: success, error (store calls add timeout)
//! - `outcome`: success, invalid, unavailable, error
//! - `error_category`: see [`super::ErrorCategory`]
//! - `path`: known routes, everything else collapses to `/other`

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder and return its render handle.
///
/// Can only succeed once per process.
///
/// # Errors
///
/// Returns a description if bucket configuration or installation fails.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // HTTP buckets include bcrypt-bound register/login latency
        .set_buckets_for_metric(
            Matcher::Prefix("auth_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("auth_token_issuance".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.350, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        // Store calls are bounded by STORE_TIMEOUT_MS (at most 10s)
        .set_buckets_for_metric(
            Matcher::Prefix("auth_store_operation".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 3.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set store operation buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome
///
/// Metric: `auth_token_issuance_duration_seconds`, `auth_token_issuance_total`
/// Labels: `operation`, `status`
pub fn record_token_issuance(operation: &str, status: &str, duration: Duration) {
    histogram!("auth_token_issuance_duration_seconds", "operation" => operation.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("auth_token_issuance_total", "operation" => operation.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record access token validation outcome
///
/// Metric: `auth_token_validations_total`
/// Labels: `status`, `reason`
pub fn record_token_validation(status: &str, reason: Option<&str>) {
    let reason = reason.unwrap_or("none");
    counter!("auth_token_validations_total", "status" => status.to_string(), "reason" => reason.to_string())
        .increment(1);
}

/// Record a refresh token redemption
///
/// Metric: `auth_refresh_redemptions_total`
/// Labels: `outcome`
pub fn record_refresh_redemption(outcome: &str) {
    counter!("auth_refresh_redemptions_total", "outcome" => outcome.to_string()).increment(1);
}

// ============================================================================
// Store Metrics
// ============================================================================

/// Record a store call
///
/// Metric: `auth_store_operations_total`, `auth_store_operation_duration_seconds`
/// Labels: `operation`, `status`
pub fn record_store_operation(operation: &str, status: &str, duration: Duration) {
    histogram!("auth_store_operation_duration_seconds", "operation" => operation.to_string())
        .record(duration.as_secs_f64());

    counter!("auth_store_operations_total", "operation" => operation.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Set the store readiness gauge (1 ready, 0 not ready)
pub fn set_store_ready(ready: bool) {
    gauge!("auth_store_ready").set(if ready { 1.0 } else { 0.0 });
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record error by category
///
/// Metric: `auth_errors_total`
/// Labels: `operation`, `error_category`, `status_code`
pub fn record_error(operation: &str, error_category: &str, status_code: u16) {
    counter!("auth_errors_total",
        "operation" => operation.to_string(),
        "error_category" => error_category.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `auth_http_requests_total`, `auth_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
///
/// Captures framework-level rejections (415, 422, 404, 405) as well as
/// handler responses.
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let normalized_path = normalize_path(path);

    histogram!("auth_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path.to_string(),
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("auth_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Keep known routes, collapse everything else to `/other`.
fn normalize_path(path: &str) -> &'static str {
    match path {
        "/" => "/",
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        "/register" => "/register",
        "/login" => "/login",
        "/refresh" => "/refresh",
        "/logout" => "/logout",
        "/me" => "/me",
        _ => "/other",
    }
}
