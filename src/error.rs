use thiserror::Error;

use crate::types::DocId;

/// Errors raised while building or driving span cursors
#[derive(Debug, Error)]
pub enum SpanError {
    #[error("Invalid bounds: min {min} > max {max}")]
    InvalidBounds { min: u32, max: u32 },

    #[error("Invalid repetition: {0}")]
    InvalidRepetition(String),

    #[error("Cursor precondition violated: {0}")]
    Precondition(String),

    #[error("No current bucket (next_bucket() not called, exhausted, or bucket already taken)")]
    NoCurrentBucket,

    #[error("Bucket in document {doc} exceeds the limit of {limit} hits")]
    BucketTooLarge { doc: DocId, limit: usize },

    #[error("Unknown annotation: '{0}'")]
    UnknownAnnotation(String),

    #[error("Hit stream out of document order: {0}")]
    UnsortedInput(String),

    #[error("Index error: {0}")]
    Index(#[from] tantivy::TantivyError),
}

pub type Result<T> = std::result::Result<T, SpanError>;
