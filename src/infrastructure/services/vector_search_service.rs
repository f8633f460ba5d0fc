//! Vector search orchestration
//!
//! text -> cache lookup -> query embedding -> store similarity query ->
//! record mapping -> cache fill. Every failure surfaces to the caller as a
//! typed error; nothing is swallowed into an empty result set.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::bounded;
use crate::domain::cache::{
    Cache, CacheExt, CacheKeyGenerator, CacheKeyParams, FingerprintKeyGenerator,
};
use crate::domain::search::{
    EventRecordMappingV1, RecordMapper, SearchLimits, SearchQuery, SearchResultItem,
};
use crate::domain::store::{DocumentStore, VectorSearchQuery};
use crate::domain::DomainError;
use crate::infrastructure::embedding::EmbeddingClient;
use crate::infrastructure::observability::record_search;

/// Configuration for the search orchestrator
#[derive(Debug, Clone)]
pub struct VectorSearchConfig {
    /// Namespace prefix for cache keys
    pub namespace: String,
    pub index_name: String,
    pub vector_path: String,
    pub limits: SearchLimits,
    pub cache_ttl: Duration,
    /// Bound on each store call
    pub store_timeout: Duration,
}

impl Default for VectorSearchConfig {
    fn default() -> Self {
        Self {
            namespace: "search".to_string(),
            index_name: "default".to_string(),
            vector_path: "Reason_Embedded".to_string(),
            limits: SearchLimits::default(),
            cache_ttl: Duration::from_secs(3600),
            store_timeout: Duration::from_secs(10),
        }
    }
}

/// Search service, built once at startup and shared by every request
#[derive(Debug)]
pub struct VectorSearchService {
    embedder: EmbeddingClient,
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn Cache>,
    mapper: Arc<dyn RecordMapper>,
    key_generator: FingerprintKeyGenerator,
    config: VectorSearchConfig,
}

impl VectorSearchService {
    pub fn new(
        embedder: EmbeddingClient,
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn Cache>,
        config: VectorSearchConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            cache,
            mapper: Arc::new(EventRecordMappingV1::new()),
            key_generator: FingerprintKeyGenerator::new(),
            config,
        }
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.config.limits
    }

    pub fn mapper(&self) -> &dyn RecordMapper {
        self.mapper.as_ref()
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn store_timeout(&self) -> Duration {
        self.config.store_timeout
    }

    /// Cache key for a query text and an already-resolved limit
    ///
    /// The mapping version is part of the key, so a layout change never
    /// serves items shaped by the previous mapping.
    pub fn cache_key(&self, text: &str, limit: u32) -> String {
        let params = CacheKeyParams::for_search(text, limit, self.embedder.model())
            .with_component("mapping", self.mapper.version());
        self.key_generator
            .generate_with_namespace(&self.config.namespace, &params)
    }

    /// Number of cached result sets
    pub async fn cache_entries(&self) -> Result<usize, DomainError> {
        self.cache.size().await
    }

    /// Runs a similarity search for `text`
    ///
    /// `limit` defaults to the configured default and is clamped to the
    /// configured maximum. Identical queries within the cache TTL are served
    /// without calling the embedding provider or the store.
    pub async fn search(
        &self,
        text: &str,
        limit: Option<u32>,
    ) -> Result<Vec<SearchResultItem>, DomainError> {
        let started = Instant::now();
        let query = SearchQuery::new(text, limit, &self.config.limits)?;
        let key = self.cache_key(query.text(), query.limit());

        if let Some(cached) = self.cached(&key).await {
            self.finish(&query, started, true, cached.len());
            return Ok(cached);
        }

        let query_vector = self.embedder.embed(query.text()).await?;

        let vector_query = VectorSearchQuery {
            index_name: self.config.index_name.clone(),
            vector_path: self.config.vector_path.clone(),
            query_vector,
            candidate_pool_size: self.config.limits.candidate_count.max(query.limit()),
            result_limit: query.limit(),
        };

        let records = bounded(
            "vector search",
            self.config.store_timeout,
            self.store.vector_search(&vector_query),
        )
        .await?;

        let results: Vec<SearchResultItem> = records
            .iter()
            .map(|record| self.mapper.to_result_item(record))
            .collect();

        if let Err(e) = self.cache.set(&key, &results, self.config.cache_ttl).await {
            warn!(error = %e, "Failed to cache search results");
        }

        self.finish(&query, started, false, results.len());
        Ok(results)
    }

    /// Cache read; a failing cache behaves like a miss
    async fn cached(&self, key: &str) -> Option<Vec<SearchResultItem>> {
        match self.cache.get::<Vec<SearchResultItem>>(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "Search cache read failed, treating as miss");
                None
            }
        }
    }

    fn finish(&self, query: &SearchQuery, started: Instant, cache_hit: bool, result_count: usize) {
        let duration = started.elapsed();
        record_search(cache_hit, duration, result_count);

        info!(
            limit = query.limit(),
            duration_ms = duration.as_millis() as u64,
            result_count = result_count,
            cache_hit = cache_hit,
            "Vector search completed"
        );
        debug!(
            query = %query.text(),
            store = self.store.store_type(),
            mapping = self.mapper.version(),
            "Search details"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::store::{MockDocumentStore, ScoredRecord};
    use crate::infrastructure::cache::InMemoryCache;
    use serde_json::json;

    const DIMS: usize = 8;

    fn record(id: &str, score: f32, reason: &str) -> ScoredRecord {
        ScoredRecord {
            id: id.to_string(),
            score,
            document: json!({
                "event": {
                    "eventType": "PAYMENT_REJECTED",
                    "timestamp": "2024-03-05T10:15:00Z",
                    "eventData": {
                        "carrier": "ACME",
                        "subTypeData": { "reason": reason }
                    }
                }
            }),
        }
    }

    fn records() -> Vec<ScoredRecord> {
        vec![
            record("e1", 0.95, "validation failed"),
            record("e2", 0.90, "validation failed: missing PRO"),
            record("e3", 0.80, "invoice validation error"),
            record("e4", 0.70, "duplicate invoice"),
        ]
    }

    struct Fixture {
        provider: Arc<MockEmbeddingProvider>,
        store: Arc<MockDocumentStore>,
        service: VectorSearchService,
    }

    fn fixture_with(
        provider: MockEmbeddingProvider,
        store: MockDocumentStore,
        cache: Arc<dyn Cache>,
        model: &str,
    ) -> Fixture {
        let provider = Arc::new(provider);
        let store = Arc::new(store);
        let embedder = EmbeddingClient::new(provider.clone(), model, DIMS, Duration::from_secs(1));
        let service = VectorSearchService::new(
            embedder,
            store.clone(),
            cache,
            VectorSearchConfig::default(),
        );

        Fixture {
            provider,
            store,
            service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            MockEmbeddingProvider::new("mock", DIMS),
            MockDocumentStore::new().with_results(records()),
            Arc::new(InMemoryCache::new()),
            "voyage-3-large",
        )
    }

    #[tokio::test]
    async fn test_search_embeds_once_and_queries_store() {
        let f = fixture();

        let results = f.service.search("validation failed", Some(3)).await.unwrap();

        assert_eq!(f.provider.call_count(), 1);
        assert_eq!(f.provider.recorded_inputs(), vec!["validation failed"]);
        assert_eq!(f.store.search_count(), 1);

        let query = f.store.last_query().unwrap();
        assert_eq!(query.candidate_pool_size, 200);
        assert_eq!(query.result_limit, 3);
        assert_eq!(query.index_name, "default");
        assert_eq!(query.vector_path, "Reason_Embedded");
        assert_eq!(query.query_vector.len(), DIMS);

        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2", "e3"]);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(results[0].reason, "validation failed");
        assert_eq!(results[0].metadata.get("carrier"), Some(&json!("ACME")));
    }

    #[tokio::test]
    async fn test_repeated_search_is_served_from_cache() {
        let f = fixture();

        let first = f.service.search("validation failed", Some(3)).await.unwrap();
        let second = f.service.search("validation failed", Some(3)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(f.provider.call_count(), 1);
        assert_eq!(f.store.search_count(), 1);
        assert_eq!(f.service.cache_entries().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_different_limit_misses_cache() {
        let f = fixture();

        f.service.search("validation failed", Some(3)).await.unwrap();
        f.service.search("validation failed", Some(2)).await.unwrap();

        assert_eq!(f.provider.call_count(), 2);
        assert_eq!(f.store.search_count(), 2);
    }

    #[tokio::test]
    async fn test_default_and_clamped_limits() {
        let f = fixture();

        f.service.search("late", None).await.unwrap();
        assert_eq!(f.store.last_query().unwrap().result_limit, 10);

        f.service.search("late", Some(1_000)).await.unwrap();
        assert_eq!(f.store.last_query().unwrap().result_limit, 100);

        // Clamped requests share the key of the maximum
        f.service.search("late", Some(100)).await.unwrap();
        assert_eq!(f.store.search_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_queries_make_no_calls() {
        let f = fixture();

        assert!(matches!(
            f.service.search("  ", Some(3)).await,
            Err(DomainError::Validation { .. })
        ));
        assert!(matches!(
            f.service.search("late", Some(0)).await,
            Err(DomainError::Validation { .. })
        ));
        assert_eq!(f.provider.call_count(), 0);
        assert_eq!(f.store.search_count(), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_skips_store_and_cache() {
        let cache = Arc::new(MockCache::new());
        let f = fixture_with(
            MockEmbeddingProvider::new("mock", DIMS).with_error("quota exceeded"),
            MockDocumentStore::new().with_results(records()),
            cache.clone(),
            "voyage-3-large",
        );

        let result = f.service.search("validation failed", Some(3)).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
        assert_eq!(f.store.search_count(), 0);
        assert_eq!(cache.write_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_cached() {
        let cache = Arc::new(MockCache::new());
        let f = fixture_with(
            MockEmbeddingProvider::new("mock", DIMS),
            MockDocumentStore::new().failing(),
            cache.clone(),
            "voyage-3-large",
        );

        let result = f.service.search("validation failed", Some(3)).await;

        assert!(matches!(result, Err(DomainError::SearchBackend { .. })));
        assert_eq!(cache.write_count(), 0);
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let mut f = fixture_with(
            MockEmbeddingProvider::new("mock", DIMS),
            MockDocumentStore::new()
                .with_results(records())
                .with_delay(Duration::from_millis(200)),
            Arc::new(InMemoryCache::new()),
            "voyage-3-large",
        );
        f.service.config.store_timeout = Duration::from_millis(20);

        let result = f.service.search("validation failed", Some(3)).await;

        assert!(matches!(result, Err(DomainError::Timeout { .. })));
        assert_eq!(f.service.cache_entries().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cache_failure_does_not_fail_search() {
        let f = fixture_with(
            MockEmbeddingProvider::new("mock", DIMS),
            MockDocumentStore::new().with_results(records()),
            Arc::new(MockCache::new().with_error("cache offline")),
            "voyage-3-large",
        );

        let results = f.service.search("validation failed", Some(2)).await.unwrap();

        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_fields_default_instead_of_failing() {
        let f = fixture_with(
            MockEmbeddingProvider::new("mock", DIMS),
            MockDocumentStore::new().with_results(vec![ScoredRecord {
                id: "bare".to_string(),
                score: 0.5,
                document: json!({}),
            }]),
            Arc::new(InMemoryCache::new()),
            "voyage-3-large",
        );

        let results = f.service.search("anything", Some(5)).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].reason, "");
        assert!(results[0].metadata.is_empty());
        assert!(results[0].event_type.is_none());
    }

    #[tokio::test]
    async fn test_cache_key_depends_on_model() {
        let m1 = fixture();
        let m2 = fixture_with(
            MockEmbeddingProvider::new("mock", DIMS),
            MockDocumentStore::new(),
            Arc::new(InMemoryCache::new()),
            "voyage-3-lite",
        );

        assert_eq!(m1.service.cache_key("q", 5), m1.service.cache_key("q", 5));
        assert_ne!(m1.service.cache_key("q", 5), m1.service.cache_key("q", 6));
        assert_ne!(m1.service.cache_key("q", 5), m2.service.cache_key("q", 5));
        assert!(m1.service.cache_key("q", 5).starts_with("search:"));
    }

    #[tokio::test]
    async fn test_cache_key_covers_mapping_version() {
        let f = fixture();
        let expected = FingerprintKeyGenerator::new().generate_with_namespace(
            "search",
            &CacheKeyParams::for_search("q", 5, "voyage-3-large")
                .with_component("mapping", "event-v1"),
        );

        assert_eq!(f.service.cache_key("q", 5), expected);
    }

    #[tokio::test]
    async fn test_concurrent_identical_searches_agree() {
        let f = fixture();
        let service = &f.service;

        let outcomes = futures::future::join_all(
            (0..8).map(|_| service.search("validation failed", Some(3))),
        )
        .await;

        let first = outcomes[0].as_ref().unwrap();
        assert!(outcomes.iter().all(|o| o.as_ref().unwrap() == first));
        assert!(f.provider.call_count() >= 1 && f.provider.call_count() <= 8);
        assert_eq!(f.service.cache_entries().await.unwrap(), 1);

        let calls = f.provider.call_count();
        service.search("validation failed", Some(3)).await.unwrap();
        assert_eq!(f.provider.call_count(), calls);
    }
}
