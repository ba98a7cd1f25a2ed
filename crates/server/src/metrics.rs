//! Prometheus metrics
//!
//! The recorder is process-global; [`init_metrics`] installs it once and
//! later calls reuse the same handle.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

const REQUESTS_TOTAL: &str = "tutor_requests_total";
const STAGE_DURATION: &str = "tutor_stage_duration_seconds";
const FALLBACKS_TOTAL: &str = "tutor_stage_fallbacks_total";

/// Install the Prometheus recorder
///
/// Returns `None` when another recorder is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    PROMETHEUS
        .get_or_try_init(|| PrometheusBuilder::new().install_recorder())
        .map(Clone::clone)
        .map_err(|e| tracing::warn!(error = %e, "Failed to install Prometheus recorder"))
        .ok()
}

/// Count a `/chat` response by status code
pub fn record_request(status: StatusCode) {
    metrics::counter!(REQUESTS_TOTAL, "status" => status.as_u16().to_string()).increment(1);
}

/// Observe one stage latency
pub fn record_stage_latency(stage: &'static str, elapsed: Duration) {
    metrics::histogram!(STAGE_DURATION, "stage" => stage).record(elapsed.as_secs_f64());
}

/// Count a stage that fell back to its input
pub fn record_fallback(stage: &'static str) {
    metrics::counter!(FALLBACKS_TOTAL, "stage" => stage).increment(1);
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}
