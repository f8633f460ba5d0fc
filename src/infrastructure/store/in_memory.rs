//! In-memory document store for development and tests

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::analytics::{
    AnalyticsStore, CarrierStats, DailyCount, ReasonFrequency, ReasonTimeline,
};
use crate::domain::embedding::cosine_similarity;
use crate::domain::store::{DocumentStore, ScoredRecord, StoredDocument, VectorSearchQuery};
use crate::domain::DomainError;

const REASON_PATH: &str = "/event/eventData/subTypeData/reason";
const CARRIER_PATH: &str = "/event/eventData/carrier";
const STATUS_PATH: &str = "/event/eventData/status";
const TIMESTAMP_PATH: &str = "/event/timestamp";

/// One seeded record
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRecord {
    pub id: String,
    pub document: Value,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// Immutable store holding every record in memory
///
/// Similarity is exact cosine, rescaled to `(1 + cos) / 2` so scores fall in
/// `[0, 1]` with higher meaning closer.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    records: Vec<SeedRecord>,
    by_id: HashMap<String, usize>,
}

impl InMemoryDocumentStore {
    pub fn new(records: Vec<SeedRecord>) -> Self {
        let by_id = records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.id.clone(), idx))
            .collect();

        Self { records, by_id }
    }

    /// Parses a JSON array of `{id, document, embedding?}` records
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let records: Vec<SeedRecord> = serde_json::from_str(json).map_err(|e| {
            DomainError::configuration(format!("Invalid seed data: {}", e))
        })?;

        Ok(Self::new(records))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::configuration(format!(
                "Failed to read seed file {}: {}",
                path.display(),
                e
            ))
        })?;

        let store = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            records = store.records.len(),
            "Loaded in-memory document store"
        );
        Ok(store)
    }

    fn non_empty_text<'a>(document: &'a Value, pointer: &str) -> Option<&'a str> {
        document
            .pointer(pointer)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    fn event_time(document: &Value) -> Option<DateTime<Utc>> {
        document
            .pointer(TIMESTAMP_PATH)
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn store_type(&self) -> &'static str {
        "in_memory"
    }

    async fn vector_search(
        &self,
        query: &VectorSearchQuery,
    ) -> Result<Vec<ScoredRecord>, DomainError> {
        let mut scored: Vec<(f32, &SeedRecord)> = self
            .records
            .iter()
            .filter_map(|record| {
                let embedding = record.embedding.as_deref()?;
                if embedding.len() != query.query_vector.len() {
                    return None;
                }
                let cosine = cosine_similarity(&query.query_vector, embedding);
                Some(((1.0 + cosine) / 2.0, record))
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));

        Ok(scored
            .into_iter()
            .take(query.candidate_pool_size as usize)
            .take(query.result_limit as usize)
            .map(|(score, record)| ScoredRecord {
                id: record.id.clone(),
                score,
                document: record.document.clone(),
            })
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<StoredDocument>, DomainError> {
        Ok(self.by_id.get(id).map(|idx| {
            let record = &self.records[*idx];
            StoredDocument {
                id: record.id.clone(),
                document: record.document.clone(),
                has_embedding: record.embedding.is_some(),
            }
        }))
    }

    async fn count_documents(&self) -> Result<u64, DomainError> {
        Ok(self.records.len() as u64)
    }

    async fn count_embedded(&self) -> Result<u64, DomainError> {
        Ok(self.records.iter().filter(|r| r.embedding.is_some()).count() as u64)
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(true)
    }
}

#[derive(Default)]
struct GroupStats<'a> {
    count: u64,
    first: BTreeSet<&'a str>,
    second: BTreeSet<&'a str>,
}

/// Sorts by count descending, then key ascending, and keeps `limit`
fn rank<T>(
    mut items: Vec<(String, T)>,
    count: impl Fn(&T) -> u64,
    limit: u32,
) -> Vec<(String, T)> {
    items.sort_by(|a, b| count(&b.1).cmp(&count(&a.1)).then_with(|| a.0.cmp(&b.0)));
    items.truncate(limit as usize);
    items
}

#[async_trait]
impl AnalyticsStore for InMemoryDocumentStore {
    async fn top_reasons(&self, limit: u32) -> Result<Vec<ReasonFrequency>, DomainError> {
        let mut groups: HashMap<&str, GroupStats> = HashMap::new();

        for record in &self.records {
            let Some(reason) = Self::non_empty_text(&record.document, REASON_PATH) else {
                continue;
            };
            let group = groups.entry(reason).or_default();
            group.count += 1;
            if let Some(carrier) = record.document.pointer(CARRIER_PATH).and_then(Value::as_str) {
                group.first.insert(carrier);
            }
            if let Some(status) = record.document.pointer(STATUS_PATH).and_then(Value::as_str) {
                group.second.insert(status);
            }
        }

        let items: Vec<(String, GroupStats)> = groups
            .into_iter()
            .map(|(reason, group)| (reason.to_string(), group))
            .collect();

        Ok(rank(items, |g| g.count, limit)
            .into_iter()
            .map(|(reason, group)| ReasonFrequency {
                reason,
                count: group.count,
                carrier_count: group.first.len() as u64,
                status_count: group.second.len() as u64,
            })
            .collect())
    }

    async fn daily_counts(&self, limit: u32) -> Result<Vec<DailyCount>, DomainError> {
        let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for record in &self.records {
            if let Some(at) = Self::event_time(&record.document) {
                *days.entry(at.date_naive()).or_default() += 1;
            }
        }

        Ok(days
            .into_iter()
            .rev()
            .take(limit as usize)
            .map(|(date, count)| DailyCount { date, count })
            .collect())
    }

    async fn reason_timelines(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<ReasonTimeline>, DomainError> {
        let mut per_reason: HashMap<&str, BTreeMap<NaiveDate, u64>> = HashMap::new();

        for record in &self.records {
            let Some(reason) = Self::non_empty_text(&record.document, REASON_PATH) else {
                continue;
            };
            let Some(at) = Self::event_time(&record.document).filter(|at| *at >= since) else {
                continue;
            };
            *per_reason
                .entry(reason)
                .or_default()
                .entry(at.date_naive())
                .or_default() += 1;
        }

        let items: Vec<(String, BTreeMap<NaiveDate, u64>)> = per_reason
            .into_iter()
            .map(|(reason, days)| (reason.to_string(), days))
            .collect();

        Ok(rank(items, |days| days.values().sum::<u64>(), limit)
            .into_iter()
            .map(|(reason, days)| ReasonTimeline {
                reason,
                total_count: days.values().sum(),
                daily_counts: days
                    .into_iter()
                    .map(|(date, count)| DailyCount { date, count })
                    .collect(),
            })
            .collect())
    }

    async fn carrier_stats(&self, limit: u32) -> Result<Vec<CarrierStats>, DomainError> {
        let mut groups: HashMap<&str, GroupStats> = HashMap::new();

        for record in &self.records {
            let Some(carrier) = Self::non_empty_text(&record.document, CARRIER_PATH) else {
                continue;
            };
            let group = groups.entry(carrier).or_default();
            group.count += 1;
            if let Some(reason) = record.document.pointer(REASON_PATH).and_then(Value::as_str) {
                group.first.insert(reason);
            }
            if let Some(status) = record.document.pointer(STATUS_PATH).and_then(Value::as_str) {
                group.second.insert(status);
            }
        }

        let items: Vec<(String, GroupStats)> = groups
            .into_iter()
            .map(|(carrier, group)| (carrier.to_string(), group))
            .collect();

        Ok(rank(items, |g| g.count, limit)
            .into_iter()
            .map(|(carrier, group)| CarrierStats {
                carrier,
                total_events: group.count,
                unique_reason_count: group.first.len() as u64,
                unique_status_count: group.second.len() as u64,
            })
            .collect())
    }
}
