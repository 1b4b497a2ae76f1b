//! Engine module: configuration, index schema and search
//!
//! This module is organized into the following submodules:
//! - `constants`: Field name constants used across the codebase
//! - `config`: Engine configuration (annotations, bucket limits)
//! - `schema`: Index schema and field handles
//! - `corpus`: In-memory annotated corpus
//! - `core`: Core SpanEngine struct and constructors
//! - `document`: Document management methods (add, commit, stored fields)
//! - `execution`: Span search over index segments

pub mod config;
pub mod constants;
pub mod core;
pub mod corpus;
pub mod document;
pub mod execution;
pub mod schema;

pub use config::{EngineConfig, OverflowPolicy, SpanLimits};
pub use constants::*;
pub use core::SpanEngine;
pub use corpus::{AnnotatedCorpus, MemoryAnnotation};
pub use schema::{build_schema, register_tokenizers, SpanFields};
