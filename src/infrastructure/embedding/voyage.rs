//! Voyage AI embedding provider implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::embedding::{
    Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage,
};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

const PROVIDER_NAME: &str = "voyage";
const DEFAULT_VOYAGE_BASE_URL: &str = "https://api.voyageai.com";

/// Known Voyage embedding models and their native dimensions
const EMBEDDING_MODELS: &[(&str, usize)] = &[
    ("voyage-3-large", 1024),
    ("voyage-3", 1024),
    ("voyage-3-lite", 512),
    ("voyage-code-3", 1024),
    ("voyage-finance-2", 1024),
];

/// Voyage AI embedding provider
///
/// Constructed without an API key it stays usable but every `embed` fails
/// with `ProviderUnavailable` before any request is sent.
#[derive(Debug)]
pub struct VoyageEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: Option<String>,
    base_url: String,
}

impl<C: HttpClientTrait> VoyageEmbeddingProvider<C> {
    pub fn new(client: C, api_key: Option<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_VOYAGE_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = api_key
            .filter(|key| !key.trim().is_empty())
            .map(|key| format!("Bearer {}", key));
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    /// Whether an API key was supplied
    pub fn is_configured(&self) -> bool {
        self.auth_header.is_some()
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn build_request(&self, request: &EmbeddingRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model(),
            "input": [request.text()],
            "input_type": request.input_type().as_str(),
        });

        if let Some(dims) = request.dimensions() {
            body["output_dimension"] = serde_json::json!(dims);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<EmbeddingResponse, DomainError> {
        let response: VoyageEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(
                PROVIDER_NAME,
                format!("Failed to parse embedding response: {}", e),
            )
        })?;

        let mut embeddings: Vec<Embedding> = response
            .data
            .into_iter()
            .map(|d| Embedding::new(d.index, d.embedding))
            .collect();
        embeddings.sort_by_key(|e| e.index());

        Ok(EmbeddingResponse::new(
            response.model,
            embeddings,
            EmbeddingUsage::new(response.usage.total_tokens),
        ))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for VoyageEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let auth_header = self
            .auth_header
            .as_deref()
            .ok_or_else(|| DomainError::provider_unavailable(PROVIDER_NAME))?;

        let headers = vec![
            ("Authorization", auth_header),
            ("Content-Type", "application/json"),
        ];
        let body = self.build_request(&request);

        let response = self
            .client
            .post_json(&self.embeddings_url(), headers, &body)
            .await
            .map_err(|e| match e {
                DomainError::Provider { message, .. } => {
                    DomainError::provider(PROVIDER_NAME, message)
                }
                other => other,
            })?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn dimensions(&self, model: &str) -> Option<usize> {
        EMBEDDING_MODELS
            .iter()
            .find(|(name, _)| *name == model)
            .map(|(_, dims)| *dims)
    }
}

// Voyage API types for embeddings

#[derive(Debug, Serialize, Deserialize)]
struct VoyageEmbeddingResponse {
    model: String,
    data: Vec<VoyageEmbeddingData>,
    #[serde(default)]
    usage: VoyageEmbeddingUsage,
}

#[derive(Debug, Serialize, Deserialize)]
struct VoyageEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct VoyageEmbeddingUsage {
    total_tokens: u32,
}
