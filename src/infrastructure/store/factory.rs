//! Document store factory

use std::sync::Arc;

use tracing::info;

use super::{InMemoryDocumentStore, PgvectorDocumentStore, PgvectorStoreConfig};
use crate::config::{StoreBackend, StoreConfig};
use crate::domain::analytics::AnalyticsStore;
use crate::domain::store::DocumentStore;
use crate::domain::DomainError;

/// One backend seen through both of its interfaces
#[derive(Debug, Clone)]
pub struct StoreHandles {
    pub documents: Arc<dyn DocumentStore>,
    pub analytics: Arc<dyn AnalyticsStore>,
}

impl StoreHandles {
    pub fn from_store<S>(store: S) -> Self
    where
        S: DocumentStore + AnalyticsStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            documents: store.clone(),
            analytics: store,
        }
    }
}

/// Builds the configured backend
pub async fn create_store(config: &StoreConfig) -> Result<StoreHandles, DomainError> {
    match config.backend {
        StoreBackend::Postgres => {
            let store = PgvectorDocumentStore::connect(&PgvectorStoreConfig {
                uri: config.uri.clone(),
                database: config.database.clone(),
                collection: config.collection.clone(),
                vector_path: config.vector_path.clone(),
                max_connections: config.max_connections,
                connect_timeout_secs: config.connect_timeout_secs,
            })
            .await?;

            info!(
                table = %config.collection,
                vector_column = %config.vector_path,
                index = %config.vector_index_name,
                "Connected pgvector document store"
            );
            Ok(StoreHandles::from_store(store))
        }
        StoreBackend::InMemory => {
            let path = config.seed_path.as_deref().ok_or_else(|| {
                DomainError::configuration("store.seed_path is required for the in_memory backend")
            })?;

            let store = InMemoryDocumentStore::load(path).await?;
            Ok(StoreHandles::from_store(store))
        }
    }
}
