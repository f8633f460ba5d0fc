//! Versioned mapping from stored event documents to search results
//!
//! Stored documents are loosely typed JSON. Each mapping version pins the
//! paths it reads and the value used when a path is missing, so a schema
//! change means a new mapping rather than scattered lookups.

use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::SearchResultItem;
use crate::domain::store::ScoredRecord;

/// Maps a scored store record onto a [`SearchResultItem`]
pub trait RecordMapper: Send + Sync + Debug {
    /// Version tag of the document layout this mapper reads
    fn version(&self) -> &'static str;

    /// Builds the result item; never fails, missing paths take defaults
    fn to_result_item(&self, record: &ScoredRecord) -> SearchResultItem;

    /// Reason text of a document, `None` when absent or blank
    fn reason_text(&self, document: &Value) -> Option<String>;
}

const REASON_PATH: &str = "/event/eventData/subTypeData/reason";
const EVENT_TYPE_PATH: &str = "/event/eventType";
const TIMESTAMP_PATH: &str = "/event/timestamp";

/// Metadata keys and the paths they are read from
const METADATA_PATHS: [(&str, &str); 3] = [
    ("carrier", "/event/eventData/carrier"),
    ("status", "/event/eventData/status"),
    ("transaction_id", "/event/eventData/transactionId"),
];

/// Freight-payment event layout, first revision
///
/// | field        | path                                   | default     |
/// |--------------|----------------------------------------|-------------|
/// | reason       | `event.eventData.subTypeData.reason`   | `""`        |
/// | event_type   | `event.eventType`                      | `None`      |
/// | timestamp    | `event.timestamp` (RFC 3339)           | `None`      |
/// | metadata     | `event.eventData.{carrier,status,transactionId}` | key omitted |
#[derive(Debug, Clone, Copy, Default)]
pub struct EventRecordMappingV1;

impl EventRecordMappingV1 {
    pub fn new() -> Self {
        Self
    }
}

impl RecordMapper for EventRecordMappingV1 {
    fn version(&self) -> &'static str {
        "event-v1"
    }

    fn to_result_item(&self, record: &ScoredRecord) -> SearchResultItem {
        let document = &record.document;

        let reason = document
            .pointer(REASON_PATH)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let event_type = document
            .pointer(EVENT_TYPE_PATH)
            .and_then(Value::as_str)
            .map(str::to_string);

        let timestamp = document
            .pointer(TIMESTAMP_PATH)
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc));

        let metadata: BTreeMap<String, Value> = METADATA_PATHS
            .iter()
            .filter_map(|(key, path)| {
                document
                    .pointer(path)
                    .filter(|value| is_scalar(value))
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect();

        SearchResultItem {
            id: record.id.clone(),
            score: record.score,
            reason,
            event_type,
            timestamp,
            metadata,
        }
    }

    fn reason_text(&self, document: &Value) -> Option<String> {
        document
            .pointer(REASON_PATH)
            .and_then(Value::as_str)
            .filter(|reason| !reason.trim().is_empty())
            .map(str::to_string)
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}
