//! Analytics store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CarrierStats, DailyCount, ReasonFrequency, ReasonTimeline};
use crate::domain::DomainError;

/// Aggregation queries over the event collection
#[async_trait]
pub trait AnalyticsStore: Send + Sync + Debug {
    /// Most frequent non-empty reasons, highest count first
    async fn top_reasons(&self, limit: u32) -> Result<Vec<ReasonFrequency>, DomainError>;

    /// Events per day for the most recent days that have events, newest first
    async fn daily_counts(&self, limit: u32) -> Result<Vec<DailyCount>, DomainError>;

    /// Per-day counts of the most frequent reasons since `since`
    async fn reason_timelines(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<ReasonTimeline>, DomainError>;

    /// Busiest carriers, highest event count first
    async fn carrier_stats(&self, limit: u32) -> Result<Vec<CarrierStats>, DomainError>;
}
