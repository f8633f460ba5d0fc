//! Request logging middleware
//!
//! Runs inside `TraceLayer`, which already owns the request span; this
//! layer only emits the completion event.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{info, warn};

use super::route_path;

pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = route_path(&request);
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        warn!(method = %method, path = %path, status, duration_ms, request_id = ?request_id, "Request failed");
    } else {
        info!(method = %method, path = %path, status, duration_ms, request_id = ?request_id, "Request completed");
    }

    response
}
