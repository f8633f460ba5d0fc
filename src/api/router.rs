use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::{analytics, health, search};
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Full API router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Search
        .route("/api/search", post(search::search))
        .route("/api/similar/{document_id}", get(search::similar))
        .route("/api/stats", get(search::stats))
        // Analytics
        .route("/api/analytics", get(analytics::summary))
        .route("/api/analytics/trends", get(analytics::trends))
        .route("/api/analytics/carriers", get(analytics::carriers))
        // Paths served by earlier releases
        .route("/api/health", get(health::health_check))
        .route("/api/trends", get(analytics::trends))
        .route_layer(middleware::from_fn(logging_middleware))
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// API router plus the Prometheus endpoint when metrics are enabled
pub fn create_router_with_metrics(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let router = create_router(state);

    match metrics {
        Some(m) => router.merge(create_metrics_router(m, metrics_path)),
        None => router,
    }
}
