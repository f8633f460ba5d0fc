//! Application state for shared services

use std::sync::Arc;

use crate::domain::store::DocumentStore;
use crate::infrastructure::services::{
    AnalyticsService, SimilarDocumentResolver, StatsService, VectorSearchService,
};

/// Services built once at startup and cloned into every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub search: Arc<VectorSearchService>,
    pub similar: Arc<SimilarDocumentResolver>,
    pub stats: Arc<StatsService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppState {
    pub fn new(search: VectorSearchService, analytics: AnalyticsService) -> Self {
        let search = Arc::new(search);

        Self {
            similar: Arc::new(SimilarDocumentResolver::new(search.clone())),
            stats: Arc::new(StatsService::new(search.clone())),
            analytics: Arc::new(analytics),
            search,
        }
    }

    /// Store used by readiness checks
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        self.search.store()
    }
}
