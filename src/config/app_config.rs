use std::time::Duration;

use serde::Deserialize;

use crate::domain::embedding::InputType;
use crate::domain::search::SearchLimits;
use crate::domain::DomainError;
use crate::infrastructure::store::is_safe_identifier;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Postgres,
    InMemory,
}

/// Document store connection and layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub uri: String,
    pub database: String,
    /// Table holding the event documents
    pub collection: String,
    /// Column holding the reason embeddings
    pub vector_path: String,
    pub vector_index_name: String,
    pub vector_dimensions: usize,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    /// Bound on every vector search and point lookup
    pub query_timeout_secs: u64,
    /// JSON seed file for the in-memory backend
    pub seed_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Without a key every search fails with `ProviderUnavailable`
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub input_type: InputType,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: u32,
    pub max_limit: u32,
    pub candidate_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_entries: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: "postgres://localhost:5432".to_string(),
            database: "ace".to_string(),
            collection: "references".to_string(),
            vector_path: "Reason_Embedded".to_string(),
            vector_index_name: "default".to_string(),
            vector_dimensions: 1024,
            max_connections: 10,
            connect_timeout_secs: 30,
            query_timeout_secs: 10,
            seed_path: None,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "voyage-3-large".to_string(),
            base_url: "https://api.voyageai.com".to_string(),
            input_type: InputType::Query,
            timeout_secs: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        let limits = SearchLimits::default();
        Self {
            default_limit: limits.default_limit,
            max_limit: limits.max_limit,
            candidate_count: limits.candidate_count,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            max_entries: 1000,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
            candidate_count: self.candidate_count,
        }
    }
}

impl StoreConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Longest accepted cache lifetime (30 days)
const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Rejects settings the services cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        let search = &self.search;
        if search.default_limit == 0 || search.max_limit == 0 {
            return Err(DomainError::configuration(
                "search.default_limit and search.max_limit must be at least 1",
            ));
        }
        if search.default_limit > search.max_limit {
            return Err(DomainError::configuration(format!(
                "search.default_limit ({}) exceeds search.max_limit ({})",
                search.default_limit, search.max_limit
            )));
        }
        if search.candidate_count < search.max_limit {
            return Err(DomainError::configuration(format!(
                "search.candidate_count ({}) must be at least search.max_limit ({})",
                search.candidate_count, search.max_limit
            )));
        }

        if self.store.vector_dimensions == 0 {
            return Err(DomainError::configuration(
                "store.vector_dimensions must be at least 1",
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(DomainError::configuration(
                "cache.max_entries must be at least 1",
            ));
        }
        if self.cache.ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(DomainError::configuration(format!(
                "cache.ttl_secs ({}) exceeds the maximum of {}",
                self.cache.ttl_secs, MAX_CACHE_TTL_SECS
            )));
        }

        for (field, value) in [
            ("store.collection", &self.store.collection),
            ("store.vector_path", &self.store.vector_path),
            ("store.vector_index_name", &self.store.vector_index_name),
        ] {
            if !is_safe_identifier(value) {
                return Err(DomainError::configuration(format!(
                    "{} '{}' is not a valid identifier",
                    field, value
                )));
            }
        }

        if self.store.backend == StoreBackend::InMemory && self.store.seed_path.is_none() {
            return Err(DomainError::configuration(
                "store.seed_path is required for the in_memory backend",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn from_toml(toml: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.store.vector_path, "Reason_Embedded");
        assert_eq!(config.store.vector_dimensions, 1024);
        assert_eq!(config.embedding.model, "voyage-3-large");
        assert!(config.embedding.api_key.is_none());
        assert_eq!(config.search.limits(), SearchLimits::default());
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert_eq!(config.cache.max_entries, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = from_toml(
            r#"
            [store]
            backend = "in_memory"
            seed_path = "data/events.json"

            [search]
            max_limit = 50

            [logging]
            format = "json"
            "#,
        );

        assert_eq!(config.store.backend, StoreBackend::InMemory);
        assert_eq!(config.store.collection, "references");
        assert_eq!(config.search.max_limit, 50);
        assert_eq!(config.search.default_limit, 10);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let mut config = AppConfig::default();
        config.search.default_limit = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.search.default_limit = 101;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.search.candidate_count = 99;
        assert!(matches!(
            config.validate(),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let mut config = AppConfig::default();
        config.store.vector_dimensions = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.cache.max_entries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_cache_ttl() {
        let mut config = AppConfig::default();
        config.cache.ttl_secs = MAX_CACHE_TTL_SECS;
        assert!(config.validate().is_ok());

        config.cache.ttl_secs = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
        assert!(err.to_string().contains("cache.ttl_secs"));
    }

    #[test]
    fn test_validate_rejects_unsafe_identifiers() {
        let mut config = AppConfig::default();
        config.store.collection = "references; DROP TABLE x".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("store.collection"));
    }

    #[test]
    fn test_in_memory_backend_requires_seed() {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::InMemory;

        assert!(config.validate().is_err());
    }
}
