//! Analytics endpoints

use axum::extract::{Query, State};
use serde::Deserialize;

use super::state::AppState;
use super::types::{ApiError, Json};
use crate::domain::analytics::{AnalyticsSummary, CarrierReport, TrendReport};

const DEFAULT_TREND_DAYS: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub days: Option<u32>,
}

/// GET /api/analytics
pub async fn summary(State(state): State<AppState>) -> Json<AnalyticsSummary> {
    Json(state.analytics.summary().await)
}

/// GET /api/analytics/trends
pub async fn trends(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Result<Json<TrendReport>, ApiError> {
    let days = params.days.unwrap_or(DEFAULT_TREND_DAYS);
    Ok(Json(state.analytics.trends(days).await?))
}

/// GET /api/analytics/carriers
pub async fn carriers(State(state): State<AppState>) -> Json<CarrierReport> {
    Json(state.analytics.carriers().await)
}
