//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheConfig, EmbeddingConfig, LogFormat, LoggingConfig, MetricsConfig,
    SearchConfig, ServerConfig, StoreBackend, StoreConfig,
};
