pub mod position_tokenizer;
pub mod postings_spans;
pub mod segment_source;

pub use position_tokenizer::{AnnotationTokenizer, TOKEN_SEPARATOR};
pub use postings_spans::PostingsSpans;
pub use segment_source::SegmentTermSource;
