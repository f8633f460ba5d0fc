//! Search domain - query validation, result shape and record mapping

mod mapping;
mod query;
mod result;

pub use mapping::{EventRecordMappingV1, RecordMapper};
pub use query::{SearchLimits, SearchQuery};
pub use result::SearchResultItem;
