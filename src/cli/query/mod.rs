//! One-shot query commands printing JSON to stdout

use serde::Serialize;

use crate::api::search::{SearchResponse, SimilarResponse};
use crate::api::AppState;
use crate::domain::analytics::round2;

pub async fn search(text: String, limit: Option<u32>) -> anyhow::Result<()> {
    let state = build_state().await?;
    let started = std::time::Instant::now();
    let results = state.search.search(&text, limit).await?;

    print_json(&SearchResponse {
        total_results: results.len(),
        results,
        query: text,
        execution_time_ms: round2(started.elapsed().as_secs_f64() * 1000.0),
    })
}

pub async fn similar(document_id: String, limit: Option<u32>) -> anyhow::Result<()> {
    let state = build_state().await?;
    let similar_documents = state.similar.find_similar(&document_id, limit).await?;

    print_json(&SimilarResponse {
        document_id,
        total_results: similar_documents.len(),
        similar_documents,
    })
}

pub async fn stats() -> anyhow::Result<()> {
    let state = build_state().await?;
    print_json(&state.stats.stats().await?)
}

async fn build_state() -> anyhow::Result<AppState> {
    let config = super::bootstrap()?;
    crate::build_services(&config).await
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
