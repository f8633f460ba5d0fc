//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::MetricsConfig;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder
///
/// Returns `None` when disabled or when a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("freight_reason_search_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!(path = %config.path, "Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize Prometheus metrics");
            None
        }
    }
}

/// Router serving the rendered metrics at `path`
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
///
/// `path` should be the matched route template so ids stay out of labels.
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", truncate_label(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record one completed search
pub fn record_search(cache_hit: bool, duration: Duration, result_count: usize) {
    let cache = if cache_hit { "hit" } else { "miss" };

    counter!("search_requests_total", "cache" => cache).increment(1);
    histogram!("search_duration_seconds", "cache" => cache).record(duration.as_secs_f64());
    histogram!("search_results").record(result_count as f64);
}

/// Parameters for embedding request metrics
pub struct EmbeddingMetricParams<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub duration: Duration,
    pub success: bool,
}

pub fn record_embedding_request(params: EmbeddingMetricParams) {
    let labels = [
        ("provider", params.provider.to_string()),
        ("model", params.model.to_string()),
        (
            "status",
            if params.success { "success" } else { "error" }.to_string(),
        ),
    ];

    counter!("embedding_requests_total", &labels).increment(1);
    histogram!("embedding_duration_seconds", &labels).record(params.duration.as_secs_f64());
}

fn truncate_label(path: &str) -> String {
    path.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_label_keeps_short_paths() {
        assert_eq!(truncate_label("/api/similar/{document_id}"), "/api/similar/{document_id}");
    }

    #[test]
    fn test_truncate_label_limits_length() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        assert_eq!(truncate_label(path).len(), 50);
    }

    #[test]
    fn test_disabled_metrics_returns_none() {
        let config = MetricsConfig {
            enabled: false,
            path: "/metrics".to_string(),
        };

        assert!(init_metrics(&config).is_none());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_search(true, Duration::from_millis(3), 2);
        record_http_request("GET", "/health", 200, Duration::from_millis(1));
        record_embedding_request(EmbeddingMetricParams {
            provider: "voyage",
            model: "voyage-3-large",
            duration: Duration::from_millis(40),
            success: false,
        });
    }
}
