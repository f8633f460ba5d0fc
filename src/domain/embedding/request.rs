//! Embedding request types

use serde::{Deserialize, Serialize};

/// What the embedded text will be used for
///
/// Retrieval models embed queries and stored documents asymmetrically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Query,
    Document,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Query => "query",
            InputType::Document => "document",
        }
    }
}

/// Request to embed one text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    model: String,
    text: String,
    /// Query or document side of retrieval
    input_type: InputType,
    /// Output size, when it differs from the model's native size
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
            input_type: InputType::default(),
            dimensions: None,
        }
    }

    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Asks the provider to shorten or widen its vectors
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}
