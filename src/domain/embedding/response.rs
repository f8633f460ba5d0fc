//! Embedding response types and query-vector extraction

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One vector, tagged with the position of its input text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    index: usize,
    embedding: Vec<f32>,
}

impl Embedding {
    pub fn new(index: usize, embedding: Vec<f32>) -> Self {
        Self { index, embedding }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn vector(&self) -> &[f32] {
        &self.embedding
    }

    pub fn into_vector(self) -> Vec<f32> {
        self.embedding
    }
}

/// Cosine of the angle between two vectors
///
/// Returns 0.0 for empty, mismatched or zero-norm inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    total_tokens: u32,
}

impl EmbeddingUsage {
    pub fn new(total_tokens: u32) -> Self {
        Self { total_tokens }
    }

    pub fn total_tokens(&self) -> u32 {
        self.total_tokens
    }
}

/// Why a response could not yield a query vector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorShapeError {
    #[error("Response contained no embeddings")]
    Missing,

    #[error("Response contained an empty vector")]
    Empty,

    #[error("Expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Vectors returned for one provider call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    model: String,
    data: Vec<Embedding>,
    usage: EmbeddingUsage,
}

impl EmbeddingResponse {
    pub fn new(model: String, data: Vec<Embedding>, usage: EmbeddingUsage) -> Self {
        Self { model, data, usage }
    }

    /// Model the provider reports having used
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.data
    }

    pub fn usage(&self) -> EmbeddingUsage {
        self.usage
    }

    /// Takes the vector of the first input and checks its size
    ///
    /// Providers may return batch items out of order, so the item tagged
    /// with index 0 wins over whatever sits first in the list.
    pub fn into_query_vector(
        self,
        expected_dimensions: usize,
    ) -> Result<Vec<f32>, VectorShapeError> {
        let mut data = self.data;
        let position = data
            .iter()
            .position(|embedding| embedding.index == 0)
            .unwrap_or(0);

        if data.is_empty() {
            return Err(VectorShapeError::Missing);
        }

        let vector = data.swap_remove(position).into_vector();

        if vector.is_empty() {
            return Err(VectorShapeError::Empty);
        }
        if vector.len() != expected_dimensions {
            return Err(VectorShapeError::DimensionMismatch {
                expected: expected_dimensions,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }
}
