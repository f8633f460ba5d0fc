//! Document store domain - the boundary to the external vector store

mod repository;

pub use repository::{DocumentStore, ScoredRecord, StoredDocument, VectorSearchQuery};

#[cfg(test)]
pub use repository::mock::MockDocumentStore;
