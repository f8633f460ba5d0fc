//! Document store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// Similarity query handed to the store
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSearchQuery {
    /// Name of the vector index to search
    pub index_name: String,
    /// Field holding the stored vectors
    pub vector_path: String,
    pub query_vector: Vec<f32>,
    /// Nearest neighbours scanned before truncation
    pub candidate_pool_size: u32,
    /// Maximum number of records returned
    pub result_limit: u32,
}

/// Raw ranked record, before mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,
    pub score: f32,
    pub document: Value,
}

/// Record returned by a point lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub document: Value,
    pub has_embedding: bool,
}

/// Read access to the event collection
///
/// Connections are long-lived and shared; implementations must be safe to
/// call from many tasks at once.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Short backend name for logs
    fn store_type(&self) -> &'static str;

    /// Ranked nearest neighbours, best first
    async fn vector_search(
        &self,
        query: &VectorSearchQuery,
    ) -> Result<Vec<ScoredRecord>, DomainError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<StoredDocument>, DomainError>;

    async fn count_documents(&self) -> Result<u64, DomainError>;

    /// Documents that carry a stored vector
    async fn count_embedded(&self) -> Result<u64, DomainError>;

    async fn health_check(&self) -> Result<bool, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    pub struct MockDocumentStore {
        results: Mutex<Vec<ScoredRecord>>,
        documents: Mutex<HashMap<String, StoredDocument>>,
        fail: AtomicBool,
        delay: Option<Duration>,
        search_calls: AtomicUsize,
        lookup_calls: AtomicUsize,
        last_query: Mutex<Option<VectorSearchQuery>>,
    }

    impl MockDocumentStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Records returned by every `vector_search`, truncated to the limit
        pub fn with_results(self, results: Vec<ScoredRecord>) -> Self {
            *self.results.lock().unwrap() = results;
            self
        }

        pub fn with_document(self, id: &str, document: Value, has_embedding: bool) -> Self {
            self.documents.lock().unwrap().insert(
                id.to_string(),
                StoredDocument {
                    id: id.to_string(),
                    document,
                    has_embedding,
                },
            );
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn failing(self) -> Self {
            self.fail.store(true, Ordering::SeqCst);
            self
        }

        pub fn search_count(&self) -> usize {
            self.search_calls.load(Ordering::SeqCst)
        }

        pub fn lookup_count(&self) -> usize {
            self.lookup_calls.load(Ordering::SeqCst)
        }

        pub fn last_query(&self) -> Option<VectorSearchQuery> {
            self.last_query.lock().unwrap().clone()
        }

        fn check_fail(&self) -> Result<(), DomainError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(DomainError::search_backend("mock store unavailable"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DocumentStore for MockDocumentStore {
        fn store_type(&self) -> &'static str {
            "mock"
        }

        async fn vector_search(
            &self,
            query: &VectorSearchQuery,
        ) -> Result<Vec<ScoredRecord>, DomainError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.clone());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.check_fail()?;

            Ok(self
                .results
                .lock()
                .unwrap()
                .iter()
                .take(query.result_limit as usize)
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<StoredDocument>, DomainError> {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            self.check_fail()?;
            Ok(self.documents.lock().unwrap().get(id).cloned())
        }

        async fn count_documents(&self) -> Result<u64, DomainError> {
            self.check_fail()?;
            Ok(self.documents.lock().unwrap().len() as u64)
        }

        async fn count_embedded(&self) -> Result<u64, DomainError> {
            self.check_fail()?;
            Ok(self
                .documents
                .lock()
                .unwrap()
                .values()
                .filter(|doc| doc.has_embedding)
                .count() as u64)
        }

        async fn health_check(&self) -> Result<bool, DomainError> {
            Ok(!self.fail.load(Ordering::SeqCst))
        }
    }
}
