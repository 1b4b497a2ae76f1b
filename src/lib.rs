//! Span sequence matching over positional postings.
//!
//! Term hits (single-token spans) come from a [`query::TermSource`], either a
//! tantivy segment or an in-memory corpus. They are combined by the cursors in
//! [`spans`] (sequences, repetitions and expansions) into a cursor tree built
//! from a [`SpanPattern`] by the [`SpanAssembler`].

pub mod data;
pub mod engine;
pub mod error;
pub mod query;
pub mod results;
pub mod spans;
pub mod tantivy_integration;
pub mod types;

pub use data::{Document, DocumentParser};
pub use engine::{AnnotatedCorpus, EngineConfig, OverflowPolicy, SpanEngine, SpanLimits};
pub use error::{Result, SpanError};
pub use query::{SourceRegistry, SpanAssembler, SpanPattern, TermSource};
pub use results::{SentenceMatches, SpanMatch, SpanResults};
pub use spans::{BoxedSpans, SpanCursor};
pub use types::{DocId, Hit, SpanGuarantees, TokenPos};
