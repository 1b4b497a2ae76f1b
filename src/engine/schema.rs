//! Index schema for annotated sentences.
//!
//! One tantivy document per sentence: the parent document id, the sentence
//! index, the sentence length in tokens and one positional text field per
//! annotation.

use anyhow::{anyhow, Result};
use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, STORED, STRING};
use tantivy::Index;

use crate::engine::constants::*;
use crate::tantivy_integration::position_tokenizer::AnnotationTokenizer;

/// Build the schema for the given annotations
pub fn build_schema(annotations: &[String]) -> Result<Schema> {
    let mut builder = Schema::builder();
    builder.add_text_field(FIELD_DOC_ID, STRING | STORED);
    builder.add_u64_field(FIELD_SENTENCE_ID, STORED);
    builder.add_u64_field(FIELD_SENTENCE_LENGTH, STORED | FAST);

    for name in annotations {
        if RESERVED_FIELDS.contains(&name.as_str()) {
            return Err(anyhow!("Annotation name '{}' is reserved", name));
        }
        let indexing = TextFieldIndexing::default()
            .set_tokenizer(ANNOTATION_TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let options = TextOptions::default().set_indexing_options(indexing).set_stored();
        builder.add_text_field(name, options);
        log::debug!("Added annotation field '{}' with token positions", name);
    }
    Ok(builder.build())
}

/// The annotation tokenizer must be registered on every opened index
pub fn register_tokenizers(index: &Index) {
    index.tokenizers().register(ANNOTATION_TOKENIZER, AnnotationTokenizer);
}

/// Resolved field handles
#[derive(Debug, Clone)]
pub struct SpanFields {
    pub doc_id: Field,
    pub sentence_id: Field,
    pub sentence_length: Field,
    /// Annotation name and field, in configuration order
    pub annotations: Vec<(String, Field)>,
}

impl SpanFields {
    pub fn from_schema(schema: &Schema, annotations: &[String]) -> Result<Self> {
        let get = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| anyhow!("Field '{}' not found in index schema", name))
        };
        let annotations = annotations
            .iter()
            .map(|name| Ok((name.clone(), get(name)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            doc_id: get(FIELD_DOC_ID)?,
            sentence_id: get(FIELD_SENTENCE_ID)?,
            sentence_length: get(FIELD_SENTENCE_LENGTH)?,
            annotations,
        })
    }

    pub fn annotation(&self, name: &str) -> Option<Field> {
        self.annotations.iter().find(|(n, _)| n == name).map(|(_, field)| *field)
    }
}
