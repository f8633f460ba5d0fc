//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// Trait for text embedding providers
///
/// Implementations make exactly one outbound call per `embed` and never
/// retry or cache.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate embeddings for the given input
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Native vector size of a model, `None` when the model is unknown
    fn dimensions(&self, model: &str) -> Option<usize>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::domain::embedding::{Embedding, EmbeddingUsage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Produces `dimensions`-sized vectors unless the request asks for
    /// another size
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        name: &'static str,
        dimensions: usize,
        known_dimensions: Option<usize>,
        error: Option<String>,
        empty_response: bool,
        delay: Option<Duration>,
        calls: AtomicUsize,
        inputs: Mutex<Vec<String>>,
        last_request: Mutex<Option<EmbeddingRequest>>,
    }

    impl MockEmbeddingProvider {
        pub fn new(name: &'static str, dimensions: usize) -> Self {
            Self {
                name,
                dimensions,
                known_dimensions: None,
                error: None,
                empty_response: false,
                delay: None,
                calls: AtomicUsize::new(0),
                inputs: Mutex::new(Vec::new()),
                last_request: Mutex::new(None),
            }
        }

        /// Reports a native size for every model
        pub fn with_known_dimensions(mut self, dimensions: usize) -> Self {
            self.known_dimensions = Some(dimensions);
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        /// Respond successfully but without any vectors
        pub fn with_empty_response(mut self) -> Self {
            self.empty_response = true;
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Every text passed to `embed`, in call order
        pub fn recorded_inputs(&self) -> Vec<String> {
            self.inputs.lock().unwrap().clone()
        }

        pub fn last_request(&self) -> Option<EmbeddingRequest> {
            self.last_request.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inputs.lock().unwrap().push(request.text().to_string());
            *self.last_request.lock().unwrap() = Some(request.clone());

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(ref error) = self.error {
                return Err(DomainError::provider(self.name, error));
            }

            if self.empty_response {
                return Ok(EmbeddingResponse::new(
                    request.model().to_string(),
                    Vec::new(),
                    EmbeddingUsage::default(),
                ));
            }

            // Deterministic vector derived from the text bytes
            let hash = request
                .text()
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_add(b as u64));
            let size = request.dimensions().unwrap_or(self.dimensions);
            let vector: Vec<f32> = (0..size)
                .map(|i| ((hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0) - 0.5)
                .collect();

            Ok(EmbeddingResponse::new(
                request.model().to_string(),
                vec![Embedding::new(0, vector)],
                EmbeddingUsage::new((request.text().len() / 4) as u32),
            ))
        }

        fn provider_name(&self) -> &'static str {
            self.name
        }

        fn dimensions(&self, _model: &str) -> Option<usize> {
            self.known_dimensions
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_honors_requested_size() {
            let provider = MockEmbeddingProvider::new("test", 8);

            let response = provider
                .embed(EmbeddingRequest::new("mock-embedding", "Hello").with_dimensions(3))
                .await
                .unwrap();

            assert_eq!(response.embeddings()[0].vector().len(), 3);
            assert_eq!(provider.recorded_inputs(), vec!["Hello"]);
        }

        #[tokio::test]
        async fn test_mock_provider_error_still_counts_call() {
            let provider = MockEmbeddingProvider::new("test", 8).with_error("API error");

            let result = provider
                .embed(EmbeddingRequest::new("mock-embedding", "Hello"))
                .await;

            assert!(matches!(result, Err(DomainError::Provider { .. })));
            assert_eq!(provider.call_count(), 1);
        }

        #[tokio::test]
        async fn test_deterministic_embeddings() {
            let provider = MockEmbeddingProvider::new("test", 16);

            let first = provider
                .embed(EmbeddingRequest::new("mock-embedding", "Hello"))
                .await
                .unwrap();
            let second = provider
                .embed(EmbeddingRequest::new("mock-embedding", "Hello"))
                .await
                .unwrap();

            assert_eq!(
                first.embeddings()[0].vector(),
                second.embeddings()[0].vector()
            );
        }
    }
}
