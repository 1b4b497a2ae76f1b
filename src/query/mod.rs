pub mod assembler;
pub mod pattern;
pub mod registry;

pub use assembler::SpanAssembler;
pub use pattern::SpanPattern;
pub use registry::{SourceRegistry, TermSource};
