//! Similar-document lookup on top of the search service

use std::sync::Arc;

use tracing::{debug, info};

use super::{bounded, VectorSearchService};
use crate::domain::search::SearchResultItem;
use crate::domain::DomainError;

/// Finds documents whose reason text is close to a given document's
#[derive(Debug, Clone)]
pub struct SimilarDocumentResolver {
    search: Arc<VectorSearchService>,
}

impl SimilarDocumentResolver {
    pub fn new(search: Arc<VectorSearchService>) -> Self {
        Self { search }
    }

    /// Returns up to `limit` documents similar to `document_id`, never
    /// including the document itself.
    ///
    /// The underlying search asks for one extra hit so that self-exclusion
    /// still leaves `limit` results; filtering runs after the cache.
    pub async fn find_similar(
        &self,
        document_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<SearchResultItem>, DomainError> {
        if document_id.trim().is_empty() {
            return Err(DomainError::validation("Document id must not be empty"));
        }

        let limits = self.search.limits();
        let limit = match limit {
            Some(0) => return Err(DomainError::validation("Limit must be at least 1")),
            Some(requested) => requested.min(limits.max_limit),
            None => limits.default_limit,
        };

        let document = bounded(
            "document lookup",
            self.search.store_timeout(),
            self.search.store().find_by_id(document_id),
        )
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Document '{}' not found", document_id)))?;

        let reason = self
            .search
            .mapper()
            .reason_text(&document.document)
            .ok_or_else(|| DomainError::no_reason_text(document_id))?;

        debug!(document_id = %document_id, reason = %reason, "Resolved reason for similarity");

        let mut results = self
            .search
            .search(&reason, Some(limit.saturating_add(1)))
            .await?;
        results.retain(|item| item.id != document_id);
        results.truncate(limit as usize);

        info!(
            document_id = %document_id,
            result_count = results.len(),
            "Similar documents resolved"
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::store::{MockDocumentStore, ScoredRecord};
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::embedding::EmbeddingClient;
    use crate::infrastructure::services::VectorSearchConfig;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn event(reason: &str) -> Value {
        json!({ "event": { "eventData": { "subTypeData": { "reason": reason } } } })
    }

    fn hit(id: &str, score: f32) -> ScoredRecord {
        ScoredRecord {
            id: id.to_string(),
            score,
            document: event("late delivery"),
        }
    }

    fn resolver(
        store: MockDocumentStore,
    ) -> (
        SimilarDocumentResolver,
        Arc<MockEmbeddingProvider>,
        Arc<MockDocumentStore>,
    ) {
        let provider = Arc::new(MockEmbeddingProvider::new("mock", 4));
        let store = Arc::new(store);
        let embedder = EmbeddingClient::new(provider.clone(), "m", 4, Duration::from_secs(1));
        let search = VectorSearchService::new(
            embedder,
            store.clone(),
            Arc::new(InMemoryCache::new()),
            VectorSearchConfig::default(),
        );

        (
            SimilarDocumentResolver::new(Arc::new(search)),
            provider,
            store,
        )
    }

    #[tokio::test]
    async fn test_excludes_source_document_and_truncates() {
        let store = MockDocumentStore::new()
            .with_document("A", event("late delivery"), true)
            .with_results(vec![hit("A", 1.0), hit("B", 0.9), hit("C", 0.8), hit("D", 0.7)]);
        let (resolver, provider, store) = resolver(store);

        let results = resolver.find_similar("A", Some(2)).await.unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "C"]);
        assert_eq!(provider.recorded_inputs(), vec!["late delivery"]);
        assert_eq!(store.last_query().unwrap().result_limit, 3);
    }

    #[tokio::test]
    async fn test_truncates_when_source_is_not_in_results() {
        let store = MockDocumentStore::new()
            .with_document("A", event("late delivery"), true)
            .with_results(vec![hit("B", 0.9), hit("C", 0.8), hit("D", 0.7)]);
        let (resolver, _, _) = resolver(store);

        let results = resolver.find_similar("A", Some(2)).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.id != "A"));
    }

    #[tokio::test]
    async fn test_missing_document_makes_no_search_calls() {
        let (resolver, provider, store) = resolver(MockDocumentStore::new());

        let result = resolver.find_similar("X", Some(10)).await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
        assert_eq!(provider.call_count(), 0);
        assert_eq!(store.search_count(), 0);
    }

    #[tokio::test]
    async fn test_document_without_reason() {
        let store = MockDocumentStore::new()
            .with_document("A", json!({ "event": {} }), true)
            .with_document("B", event("   "), true);
        let (resolver, provider, _) = resolver(store);

        assert!(matches!(
            resolver.find_similar("A", None).await,
            Err(DomainError::NoReasonText { .. })
        ));
        assert!(matches!(
            resolver.find_similar("B", None).await,
            Err(DomainError::NoReasonText { .. })
        ));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let (resolver, _, store) = resolver(MockDocumentStore::new());

        assert!(matches!(
            resolver.find_similar("", None).await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            resolver.find_similar("A", Some(0)).await,
            Err(DomainError::Validation { .. })
        ));
        assert_eq!(store.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let (resolver, _, _) = resolver(MockDocumentStore::new().failing());

        assert!(matches!(
            resolver.find_similar("A", None).await,
            Err(DomainError::SearchBackend { .. })
        ));
    }
}
