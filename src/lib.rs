//! Freight Reason Search
//!
//! Semantic search over the free-text reasons attached to freight-payment
//! events:
//! - Query embedding through Voyage AI
//! - Nearest-neighbour search against pgvector (or an in-memory seed store)
//! - Fingerprint-keyed result cache with TTL and LRU eviction
//! - Similar-document lookup, collection stats and reason analytics

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use api::state::AppState;
use infrastructure::cache::{InMemoryCache, InMemoryCacheConfig};
use infrastructure::embedding::{EmbeddingClient, VoyageEmbeddingProvider};
use infrastructure::http_client::HttpClient;
use infrastructure::services::{AnalyticsService, VectorSearchConfig, VectorSearchService};
use infrastructure::store::create_store;

/// Builds every long-lived service once
///
/// Any failure here is a startup error: bad configuration, an unreachable
/// store or an unreadable seed file.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    let stores = create_store(&config.store).await?;

    let http_client = HttpClient::with_timeout(config.embedding.timeout())?;
    let provider = VoyageEmbeddingProvider::with_base_url(
        http_client,
        config.embedding.api_key.clone(),
        config.embedding.base_url.clone(),
    );
    if !provider.is_configured() {
        warn!("No embedding API key configured; searches will fail until one is set");
    }

    let embedder = EmbeddingClient::new(
        Arc::new(provider),
        config.embedding.model.clone(),
        config.store.vector_dimensions,
        config.embedding.timeout(),
    )
    .with_input_type(config.embedding.input_type);

    let cache = InMemoryCache::with_config(
        InMemoryCacheConfig::default()
            .with_max_capacity(config.cache.max_entries)
            .with_default_ttl(config.cache.ttl()),
    );

    let search = VectorSearchService::new(
        embedder,
        stores.documents.clone(),
        Arc::new(cache),
        VectorSearchConfig {
            index_name: config.store.vector_index_name.clone(),
            vector_path: config.store.vector_path.clone(),
            limits: config.search.limits(),
            cache_ttl: config.cache.ttl(),
            store_timeout: config.store.query_timeout(),
            ..VectorSearchConfig::default()
        },
    );

    let analytics = AnalyticsService::new(stores.documents, stores.analytics);

    info!(
        store = ?config.store.backend,
        model = %config.embedding.model,
        dimensions = config.store.vector_dimensions,
        "Services initialized"
    );

    Ok(AppState::new(search, analytics))
}
