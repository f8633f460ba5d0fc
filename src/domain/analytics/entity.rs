//! Analytics report types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::TrendDirection;

/// How often a reason occurs, with its spread across carriers and statuses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonFrequency {
    pub reason: String,
    pub count: u64,
    pub carrier_count: u64,
    pub status_count: u64,
}

/// Event count for one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Per-day counts for a single reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonTimeline {
    pub reason: String,
    pub total_count: u64,
    pub daily_counts: Vec<DailyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonTrend {
    pub reason: String,
    pub total_count: u64,
    /// Oldest day first
    pub daily_counts: Vec<DailyCount>,
    pub trend_direction: TrendDirection,
    pub trend_percentage: f64,
}

impl ReasonTrend {
    /// Sorts the timeline by date and attaches its trend
    pub fn from_timeline(mut timeline: ReasonTimeline) -> Self {
        timeline.daily_counts.sort_by_key(|day| day.date);
        let (trend_direction, trend_percentage) = super::compute_trend(&timeline.daily_counts);

        Self {
            reason: timeline.reason,
            total_count: timeline.total_count,
            daily_counts: timeline.daily_counts,
            trend_direction,
            trend_percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierStats {
    pub carrier: String,
    pub total_events: u64,
    pub unique_reason_count: u64,
    pub unique_status_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeAnalytics {
    /// Most recent day first
    pub daily_counts: Vec<DailyCount>,
    pub total_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_documents: u64,
    pub embedded_documents: u64,
    pub embedding_percentage: f64,
    pub top_reasons: Vec<ReasonFrequency>,
    pub time_analytics: TimeAnalytics,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub period_days: u32,
    pub trending_reasons: Vec<ReasonTrend>,
    pub analysis_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierReport {
    pub carrier_stats: Vec<CarrierStats>,
    pub timestamp: DateTime<Utc>,
}
