//! Normalized search result

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One ranked hit, in the shape every caller sees
///
/// Result sets keep the order the store returned them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: String,
    /// Higher is more similar
    pub score: f32,
    pub reason: String,
    pub event_type: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Scalar values only
    pub metadata: BTreeMap<String, Value>,
}
