//! Embedding provider implementations

mod client;
mod voyage;

pub use client::EmbeddingClient;
pub use voyage::VoyageEmbeddingProvider;
