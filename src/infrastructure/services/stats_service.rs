//! Collection statistics

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{bounded, VectorSearchService};
use crate::domain::analytics::round2;
use crate::domain::store::DocumentStore;
use crate::domain::DomainError;

/// Document counts and embedding coverage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub total_documents: u64,
    pub embedded_documents: u64,
    /// `embedded / total` in `[0, 1]`, 0 for an empty collection
    pub embedding_coverage_ratio: f64,
    pub embedding_percentage: f64,
    pub cache_entries: usize,
}

/// Computes the coverage ratio, clamped to `[0, 1]`
pub fn coverage_ratio(embedded: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (embedded as f64 / total as f64).clamp(0.0, 1.0)
}

/// Read-only pass-through to the store counts; nothing is cached
#[derive(Debug, Clone)]
pub struct StatsService {
    store: Arc<dyn DocumentStore>,
    search: Arc<VectorSearchService>,
    timeout: Duration,
}

impl StatsService {
    pub fn new(search: Arc<VectorSearchService>) -> Self {
        Self {
            store: search.store().clone(),
            timeout: search.store_timeout(),
            search,
        }
    }

    pub async fn stats(&self) -> Result<SearchStats, DomainError> {
        let total_documents =
            bounded("document count", self.timeout, self.store.count_documents()).await?;
        let embedded_documents =
            bounded("embedded count", self.timeout, self.store.count_embedded()).await?;

        let ratio = coverage_ratio(embedded_documents, total_documents);

        let cache_entries = self.search.cache_entries().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read cache size");
            0
        });

        Ok(SearchStats {
            total_documents,
            embedded_documents,
            embedding_coverage_ratio: ratio,
            embedding_percentage: round2(ratio * 100.0),
            cache_entries,
        })
    }
}
