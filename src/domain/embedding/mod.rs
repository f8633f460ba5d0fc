//! Embedding provider domain models and traits

mod provider;
mod request;
mod response;

pub use provider::EmbeddingProvider;
pub use request::{EmbeddingRequest, InputType};
pub use response::{
    cosine_similarity, Embedding, EmbeddingResponse, EmbeddingUsage, VectorShapeError,
};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
