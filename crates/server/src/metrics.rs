//! Observability Metrics
//!
//! Prometheus metrics endpoint for monitoring.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global Prometheus handle
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize metrics recorder
///
/// Must be called once at startup before recording any metrics.
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder");

    // Register default metrics
    register_default_metrics();

    METRICS_HANDLE.get_or_init(|| handle.clone());
    handle
}

/// Get the global metrics handle
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Register default application metrics
fn register_default_metrics() {
    // Call lifecycle, recorded by the conversation manager
    counter!("calls_started").absolute(0);
    counter!("calls_completed").absolute(0);

    // Request metrics
    counter!("requests_total", "endpoint" => "answer").absolute(0);
    counter!("requests_total", "endpoint" => "health").absolute(0);

    // Latency metrics, recorded by the prediction client and synthesizer
    histogram!("prediction_latency_ms").record(0.0);
    histogram!("synthesis_ttfb_ms").record(0.0);
}

/// Record request to endpoint
pub fn record_request(endpoint: &'static str) {
    counter!("requests_total", "endpoint" => endpoint).increment(1);
}

/// Metrics endpoint handler
///
/// Returns Prometheus-formatted metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    match get_metrics_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            handle.render(),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_helpers() {
        // These should not panic
        record_request("test");
    }
}
