pub mod document;
pub mod parser;

pub use document::{Document, Field, Sentence};
pub use parser::DocumentParser;
