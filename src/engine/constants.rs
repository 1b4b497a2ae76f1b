//! Field and tokenizer names shared by indexing and search

pub const FIELD_WORD: &str = "word";
pub const FIELD_LEMMA: &str = "lemma";
pub const FIELD_POS: &str = "pos";
pub const FIELD_DOC_ID: &str = "doc_id";
pub const FIELD_SENTENCE_ID: &str = "sentence_id";
pub const FIELD_SENTENCE_LENGTH: &str = "sentence_length";

/// Bookkeeping fields; annotations may not use these names
pub const RESERVED_FIELDS: [&str; 3] = [FIELD_DOC_ID, FIELD_SENTENCE_ID, FIELD_SENTENCE_LENGTH];

pub const ANNOTATION_TOKENIZER: &str = "annotation_tokenizer";
