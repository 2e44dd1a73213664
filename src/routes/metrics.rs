//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

use crate::streaming::StreamSummary;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    let _ = &*PROMETHEUS_HANDLE;
    register_metrics();
}

fn register_metrics() {
    metrics::describe_counter!(
        "courier_requests_total",
        "Total number of relay requests processed"
    );
    metrics::describe_histogram!(
        "courier_request_duration_seconds",
        "Time until the relay response head was ready"
    );
    metrics::describe_counter!(
        "courier_fetch_bytes_total",
        "Bytes streamed to callers by the fetch relay"
    );
    metrics::describe_counter!(
        "courier_fetch_truncated_total",
        "Fetch relay responses cut off at the byte cap"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record a finished relay request
pub fn record_request(route: &str, status: u16, duration_secs: f64) {
    metrics::counter!(
        "courier_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("courier_request_duration_seconds", "route" => route.to_string())
        .record(duration_secs);
}

/// Record the outcome of a capped fetch stream
pub fn record_fetch_stream(summary: StreamSummary) {
    metrics::counter!("courier_fetch_bytes_total").increment(summary.bytes_forwarded);
    if summary.truncated {
        metrics::counter!("courier_fetch_truncated_total").increment(1);
    }
}
