//! Search query validation

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Result-count bounds applied to every search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Limit used when the caller gives none
    pub default_limit: u32,
    /// Upper bound; larger requests are clamped
    pub max_limit: u32,
    /// Nearest neighbours scanned by the store before truncation
    pub candidate_count: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            candidate_count: 200,
        }
    }
}

/// A validated search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    limit: u32,
}

impl SearchQuery {
    /// Validates the text and resolves the effective limit.
    ///
    /// A missing limit takes the default; a limit above the maximum is
    /// clamped to it. Blank text and a zero limit are rejected.
    pub fn new(
        text: impl Into<String>,
        limit: Option<u32>,
        limits: &SearchLimits,
    ) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::validation("Query text must not be empty"));
        }

        let limit = match limit {
            Some(0) => return Err(DomainError::validation("Limit must be at least 1")),
            Some(requested) => requested.min(limits.max_limit),
            None => limits.default_limit.min(limits.max_limit),
        };

        Ok(Self { text, limit })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}
