//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_embedding_request, record_http_request,
    record_search, EmbeddingMetricParams, PrometheusMetrics,
};
