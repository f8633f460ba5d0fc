//! Query embedding adapter
//!
//! Turns one query text into one vector of the configured size. Wraps any
//! [`EmbeddingProvider`] with a timeout, response validation, logging and
//! metrics. It never retries and never caches.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::domain::embedding::{
    EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, InputType,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_embedding_request, EmbeddingMetricParams};

#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    input_type: InputType,
    dimensions: usize,
    timeout: Duration,
}

impl EmbeddingClient {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        model: impl Into<String>,
        dimensions: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            input_type: InputType::Query,
            dimensions,
            timeout,
        }
    }

    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Model identifier; part of every search cache key
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embeds a single text
    ///
    /// Fails with `ProviderUnavailable` or `Provider` as raised by the
    /// provider, with `Provider` when the response holds no usable vector
    /// of the expected size, and with `Timeout` when the call overruns.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let request = self.build_request(text);
        let started = Instant::now();

        let outcome = match tokio::time::timeout(self.timeout, self.provider.embed(request)).await
        {
            Ok(result) => result.and_then(|response| self.extract_vector(response)),
            Err(_) => Err(DomainError::timeout("embedding generation", self.timeout)),
        };

        let duration = started.elapsed();
        record_embedding_request(EmbeddingMetricParams {
            provider: self.provider.provider_name(),
            model: &self.model,
            duration,
            success: outcome.is_ok(),
        });

        match &outcome {
            Ok(_) => debug!(
                provider = self.provider.provider_name(),
                model = %self.model,
                duration_ms = duration.as_millis() as u64,
                "Generated query embedding"
            ),
            Err(e) => warn!(
                provider = self.provider.provider_name(),
                model = %self.model,
                duration_ms = duration.as_millis() as u64,
                error = %e,
                "Embedding generation failed"
            ),
        }

        outcome
    }

    /// Asks for the configured size only when the model is known to
    /// produce a different one
    fn build_request(&self, text: &str) -> EmbeddingRequest {
        let request =
            EmbeddingRequest::new(self.model.as_str(), text).with_input_type(self.input_type);

        match self.provider.dimensions(&self.model) {
            Some(native) if native != self.dimensions => {
                request.with_dimensions(self.dimensions)
            }
            _ => request,
        }
    }

    fn extract_vector(&self, response: EmbeddingResponse) -> Result<Vec<f32>, DomainError> {
        debug!(
            model = %response.model(),
            total_tokens = response.usage().total_tokens(),
            "Embedding response received"
        );

        response
            .into_query_vector(self.dimensions)
            .map_err(|e| DomainError::provider(self.provider.provider_name(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::infrastructure::embedding::VoyageEmbeddingProvider;
    use crate::infrastructure::http_client::HttpClient;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(provider: MockEmbeddingProvider, dimensions: usize) -> EmbeddingClient {
        EmbeddingClient::new(
            Arc::new(provider),
            "voyage-3-large",
            dimensions,
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_embed_returns_vector() {
        let provider = Arc::new(MockEmbeddingProvider::new("mock", 8));
        let client = EmbeddingClient::new(
            provider.clone(),
            "voyage-3-large",
            8,
            Duration::from_secs(1),
        );

        let vector = client.embed("validation failed").await.unwrap();

        assert_eq!(vector.len(), 8);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.recorded_inputs(), vec!["validation failed"]);
        assert_eq!(client.model(), "voyage-3-large");
    }

    #[tokio::test]
    async fn test_requests_configured_size_from_known_model() {
        let provider =
            Arc::new(MockEmbeddingProvider::new("mock", 1024).with_known_dimensions(1024));
        let client = EmbeddingClient::new(
            provider.clone(),
            "voyage-3-large",
            256,
            Duration::from_secs(1),
        );

        let vector = client.embed("late delivery").await.unwrap();

        assert_eq!(vector.len(), 256);
        assert_eq!(provider.last_request().unwrap().dimensions(), Some(256));
    }

    #[tokio::test]
    async fn test_native_size_sends_no_dimension_override() {
        let provider = Arc::new(MockEmbeddingProvider::new("mock", 8).with_known_dimensions(8));
        let client = EmbeddingClient::new(
            provider.clone(),
            "voyage-3-large",
            8,
            Duration::from_secs(1),
        );

        client.embed("late delivery").await.unwrap();

        assert_eq!(provider.last_request().unwrap().dimensions(), None);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_provider_error() {
        let result = client(MockEmbeddingProvider::new("mock", 4), 8)
            .embed("hello")
            .await;

        match result {
            Err(DomainError::Provider { message, .. }) => {
                assert!(message.contains("Expected 8 dimensions, got 4"))
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_response_is_provider_error() {
        let result = client(MockEmbeddingProvider::new("mock", 8).with_empty_response(), 8)
            .embed("hello")
            .await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_provider_error_passes_through() {
        let result = client(MockEmbeddingProvider::new("mock", 8).with_error("boom"), 8)
            .embed("hello")
            .await;

        assert!(result.unwrap_err().is_embedding_failure());
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let client = EmbeddingClient::new(
            Arc::new(MockEmbeddingProvider::new("mock", 8).with_delay(Duration::from_millis(200))),
            "voyage-3-large",
            8,
            Duration::from_millis(20),
        );

        let result = client.embed("hello").await;

        assert!(matches!(result, Err(DomainError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_slow_http_provider_times_out_with_shared_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "model": "voyage-3-large",
                        "data": [{ "index": 0, "embedding": [0.1, 0.2] }],
                        "usage": { "total_tokens": 2 }
                    }))
                    .set_delay(Duration::from_millis(400)),
            )
            .mount(&server)
            .await;

        // Same deadline on the HTTP client and the adapter, as wired at startup
        let timeout = Duration::from_millis(40);
        let provider = VoyageEmbeddingProvider::with_base_url(
            HttpClient::with_timeout(timeout).unwrap(),
            Some("live-key".into()),
            server.uri(),
        );
        let client = EmbeddingClient::new(Arc::new(provider), "voyage-3-large", 2, timeout);

        for _ in 0..5 {
            let result = client.embed("late delivery").await;
            assert!(
                matches!(result, Err(DomainError::Timeout { .. })),
                "expected timeout, got {:?}",
                result
            );
        }
    }
}
