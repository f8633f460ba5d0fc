//! Reporting over the event collection
//!
//! Unlike search, every sub-query here degrades to an empty value when the
//! store fails; the failure is logged and the rest of the report is still
//! returned.

use std::future::Future;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::error;

use super::stats_service::coverage_ratio;
use crate::domain::analytics::{
    round2, AnalyticsStore, AnalyticsSummary, CarrierReport, ReasonTrend, TimeAnalytics,
    TrendReport,
};
use crate::domain::store::DocumentStore;
use crate::domain::DomainError;

const TOP_REASONS: u32 = 20;
const RECENT_DAYS: u32 = 30;
const TRENDING_REASONS: u32 = 10;
const TOP_CARRIERS: u32 = 20;
const MAX_TREND_DAYS: u32 = 365;

#[derive(Debug, Clone)]
pub struct AnalyticsService {
    documents: Arc<dyn DocumentStore>,
    analytics: Arc<dyn AnalyticsStore>,
}

impl AnalyticsService {
    pub fn new(documents: Arc<dyn DocumentStore>, analytics: Arc<dyn AnalyticsStore>) -> Self {
        Self {
            documents,
            analytics,
        }
    }

    /// Counts, top reasons and recent daily volume
    pub async fn summary(&self) -> AnalyticsSummary {
        let total_documents = or_default("document count", self.documents.count_documents()).await;
        let embedded_documents =
            or_default("embedded count", self.documents.count_embedded()).await;
        let top_reasons = or_default("top reasons", self.analytics.top_reasons(TOP_REASONS)).await;
        let daily_counts =
            or_default("daily counts", self.analytics.daily_counts(RECENT_DAYS)).await;

        AnalyticsSummary {
            total_documents,
            embedded_documents,
            embedding_percentage: round2(
                coverage_ratio(embedded_documents, total_documents) * 100.0,
            ),
            top_reasons,
            time_analytics: TimeAnalytics {
                total_days: daily_counts.len(),
                daily_counts,
            },
            last_updated: Utc::now(),
        }
    }

    /// Trend of the most frequent reasons over the last `days` days
    pub async fn trends(&self, days: u32) -> Result<TrendReport, DomainError> {
        if !(1..=MAX_TREND_DAYS).contains(&days) {
            return Err(DomainError::validation(format!(
                "days must be between 1 and {}",
                MAX_TREND_DAYS
            )));
        }

        let now = Utc::now();
        let since = now - Duration::days(i64::from(days));
        let timelines = or_default(
            "reason timelines",
            self.analytics.reason_timelines(since, TRENDING_REASONS),
        )
        .await;

        Ok(TrendReport {
            period_days: days,
            trending_reasons: timelines.into_iter().map(ReasonTrend::from_timeline).collect(),
            analysis_timestamp: now,
        })
    }

    pub async fn carriers(&self) -> CarrierReport {
        CarrierReport {
            carrier_stats: or_default("carrier stats", self.analytics.carrier_stats(TOP_CARRIERS))
                .await,
            timestamp: Utc::now(),
        }
    }
}

async fn or_default<T: Default>(
    what: &str,
    query: impl Future<Output = Result<T, DomainError>>,
) -> T {
    match query.await {
        Ok(value) => value,
        Err(e) => {
            error!(query = what, error = %e, "Analytics query failed");
            T::default()
        }
    }
}
