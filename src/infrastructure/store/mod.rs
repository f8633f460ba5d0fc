//! Document store implementations

mod factory;
mod in_memory;
mod pgvector;

pub use factory::{create_store, StoreHandles};
pub use in_memory::{InMemoryDocumentStore, SeedRecord};
pub use pgvector::{is_safe_identifier, PgvectorDocumentStore, PgvectorStoreConfig};
