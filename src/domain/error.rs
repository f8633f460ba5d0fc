use std::time::Duration;

use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// No credential or client is configured for the embedding provider
    #[error("Provider unavailable: {provider} is not configured")]
    ProviderUnavailable { provider: String },

    /// The embedding call failed or returned a malformed response
    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Search backend error: {message}")]
    SearchBackend { message: String },

    #[error("Document '{document_id}' has no reason text")]
    NoReasonText { document_id: String },

    #[error("Timeout: {operation} did not complete within {}ms", .after.as_millis())]
    Timeout { operation: String, after: Duration },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn provider_unavailable(provider: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn search_backend(message: impl Into<String>) -> Self {
        Self::SearchBackend {
            message: message.into(),
        }
    }

    pub fn no_reason_text(document_id: impl Into<String>) -> Self {
        Self::NoReasonText {
            document_id: document_id.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after,
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for failures raised while producing the query embedding
    pub fn is_embedding_failure(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable { .. } | Self::Provider { .. }
        )
    }
}
