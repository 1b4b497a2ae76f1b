use anyhow::{anyhow, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tantivy::schema::TantivyDocument;

use crate::data::document::Document;
use crate::engine::schema::SpanFields;
use crate::tantivy_integration::position_tokenizer::encode_annotation;

/// Reads Odinson JSON documents and turns their sentences into index documents
pub struct DocumentParser {
    fields: SpanFields,
}

impl DocumentParser {
    pub fn new(fields: SpanFields) -> Self {
        Self { fields }
    }

    /// Check token counts against each sentence's declared length.
    ///
    /// An annotation longer than its sentence would produce hits past the
    /// sentence end, so it is rejected; a shorter one only leaves trailing
    /// tokens unannotated.
    pub fn validate_document(&self, doc: &Document) -> Result<()> {
        for (sentence_idx, sentence) in doc.sentences.iter().enumerate() {
            for (name, _) in &self.fields.annotations {
                let Some(tokens) = sentence.tokens(name) else {
                    log::debug!("Document '{}' sentence {}: no '{}' annotation", doc.id, sentence_idx, name);
                    continue;
                };
                let declared = sentence.num_tokens as usize;
                if tokens.len() > declared {
                    return Err(anyhow!(
                        "Document '{}' sentence {}: annotation '{}' has {} tokens but numTokens is {}",
                        doc.id,
                        sentence_idx,
                        name,
                        tokens.len(),
                        declared
                    ));
                }
                if tokens.len() < declared {
                    log::warn!(
                        "Document '{}' sentence {}: annotation '{}' has {} tokens but numTokens is {}",
                        doc.id,
                        sentence_idx,
                        name,
                        tokens.len(),
                        declared
                    );
                }
            }
        }
        Ok(())
    }

    /// Parse a JSON file, gzipped or not
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> Result<Vec<Document>> {
        let path = file_path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let mut magic = [0u8; 2];
        let gzipped = reader.read_exact(&mut magic).is_ok() && magic == [0x1f, 0x8b];

        // Reopen rather than seek so the magic bytes are read again
        let file = File::open(path)?;
        let documents = if gzipped {
            self.parse_reader(GzDecoder::new(file))?
        } else {
            self.parse_reader(file)?
        };
        log::debug!("Parsed {} document(s) from {}", documents.len(), path.display());
        Ok(documents)
    }

    /// Parse a single document, an array of documents, or JSON lines
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<Document>> {
        let mut content = String::new();
        BufReader::new(reader).read_to_string(&mut content)?;

        if let Ok(doc) = serde_json::from_str::<Document>(&content) {
            return Ok(vec![doc]);
        }
        if let Ok(docs) = serde_json::from_str::<Vec<Document>>(&content) {
            return Ok(docs);
        }
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<Document>(line).map_err(anyhow::Error::from))
            .collect()
    }

    /// One index document per sentence
    pub fn to_tantivy_documents(&self, doc: &Document) -> Result<Vec<TantivyDocument>> {
        self.validate_document(doc)?;
        let mut tantivy_docs = Vec::with_capacity(doc.sentences.len());
        for (sentence_idx, sentence) in doc.sentences.iter().enumerate() {
            let mut tantivy_doc = TantivyDocument::default();
            tantivy_doc.add_text(self.fields.doc_id, &doc.id);
            tantivy_doc.add_u64(self.fields.sentence_id, sentence_idx as u64);
            tantivy_doc.add_u64(self.fields.sentence_length, sentence.num_tokens as u64);
            for (name, field) in &self.fields.annotations {
                if let Some(tokens) = sentence.tokens(name) {
                    tantivy_doc.add_text(*field, encode_annotation(tokens));
                }
            }
            tantivy_docs.push(tantivy_doc);
        }
        Ok(tantivy_docs)
    }
}
