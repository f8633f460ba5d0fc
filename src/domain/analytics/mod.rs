//! Analytics domain - reporting types over the event collection

mod entity;
mod repository;
mod trend;

pub use entity::{
    AnalyticsSummary, CarrierReport, CarrierStats, DailyCount, ReasonFrequency, ReasonTimeline,
    ReasonTrend, TimeAnalytics, TrendReport,
};
pub use repository::AnalyticsStore;
pub use trend::{compute_trend, round2, TrendDirection};

#[cfg(test)]
pub use repository::mock::MockAnalyticsStore;
