//! Prometheus exporter

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global recorder.
///
/// Safe to call more than once; later calls return the first handle.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Some(handle.clone());
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_default_metrics();
            Some(METRICS_HANDLE.get_or_init(|| handle).clone())
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
            None
        },
    }
}

fn register_default_metrics() {
    counter!("zailo_bot_messages_total").absolute(0);
    counter!("zailo_bot_notifications_total").absolute(0);
    counter!("zailo_bot_errors_total", "kind" => "gateway_timeout").absolute(0);
    counter!("zailo_bot_errors_total", "kind" => "gateway").absolute(0);
    counter!("zailo_bot_errors_total", "kind" => "transport_timeout").absolute(0);
    counter!("zailo_bot_errors_total", "kind" => "transport").absolute(0);
    histogram!("zailo_bot_turn_duration_seconds").record(0.0);
}

/// Record a webhook hit
pub fn record_webhook(endpoint: &'static str) {
    counter!("zailo_bot_webhook_requests_total", "endpoint" => endpoint).increment(1);
}

/// `GET /metrics`
pub async fn metrics_handler() -> impl IntoResponse {
    match METRICS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            "# metrics recorder not installed\n".to_string(),
        ),
    }
}
