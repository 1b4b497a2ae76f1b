pub mod span;
pub mod guarantees;

pub use span::{DocId, Hit, TokenPos};
pub use guarantees::SpanGuarantees;
