//! Domain layer - Core types, traits and errors

pub mod analytics;
pub mod cache;
pub mod embedding;
pub mod error;
pub mod search;
pub mod store;

pub use analytics::{
    AnalyticsStore, AnalyticsSummary, CarrierReport, CarrierStats, DailyCount, ReasonFrequency,
    ReasonTimeline, ReasonTrend, TimeAnalytics, TrendDirection, TrendReport,
};
pub use cache::{Cache, CacheExt, CacheKeyGenerator, CacheKeyParams, FingerprintKeyGenerator};
pub use embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, InputType};
pub use error::DomainError;
pub use search::{EventRecordMappingV1, RecordMapper, SearchLimits, SearchQuery, SearchResultItem};
pub use store::{DocumentStore, ScoredRecord, StoredDocument, VectorSearchQuery};
