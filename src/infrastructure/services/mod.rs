//! Infrastructure services

mod analytics_service;
mod similar_documents;
mod stats_service;
mod vector_search_service;

use std::future::Future;
use std::time::Duration;

use tracing::error;

use crate::domain::DomainError;

pub use analytics_service::AnalyticsService;
pub use similar_documents::SimilarDocumentResolver;
pub use stats_service::{coverage_ratio, SearchStats, StatsService};
pub use vector_search_service::{VectorSearchConfig, VectorSearchService};

/// Awaits a store call, failing with `Timeout` once `after` has elapsed
pub(crate) async fn bounded<T>(
    operation: &str,
    after: Duration,
    call: impl Future<Output = Result<T, DomainError>>,
) -> Result<T, DomainError> {
    match tokio::time::timeout(after, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!(operation = operation, error = %e, "Store call failed");
            Err(e)
        }
        Err(_) => {
            error!(operation = operation, timeout_ms = after.as_millis() as u64, "Store call timed out");
            Err(DomainError::timeout(operation, after))
        }
    }
}
