//! Search, similar-document and stats endpoints

use std::time::Instant;

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use super::types::{ApiError, Json};
use crate::domain::analytics::round2;
use crate::domain::search::SearchResultItem;
use crate::infrastructure::services::SearchStats;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
    pub total_results: usize,
    pub query: String,
    pub execution_time_ms: f64,
}

#[derive(Debug, Deserialize)]
pub struct SimilarParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarResponse {
    pub document_id: String,
    pub similar_documents: Vec<SearchResultItem>,
    pub total_results: usize,
}

/// POST /api/search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let started = Instant::now();
    let results = state.search.search(&request.query, request.limit).await?;

    Ok(Json(SearchResponse {
        total_results: results.len(),
        results,
        query: request.query,
        execution_time_ms: round2(started.elapsed().as_secs_f64() * 1000.0),
    }))
}

/// GET /api/similar/{document_id}
pub async fn similar(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
    Query(params): Query<SimilarParams>,
) -> Result<Json<SimilarResponse>, ApiError> {
    let similar_documents = state
        .similar
        .find_similar(&document_id, params.limit)
        .await?;

    Ok(Json(SimilarResponse {
        document_id,
        total_results: similar_documents.len(),
        similar_documents,
    }))
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<SearchStats>, ApiError> {
    Ok(Json(state.stats.stats().await?))
}
