//! Document management methods for SpanEngine

use anyhow::{anyhow, Result};
use std::path::Path;
use tantivy::schema::{Field, TantivyDocument, Value};
use tantivy::{DocAddress, Searcher};

use crate::data::{Document, DocumentParser};
use crate::engine::core::SpanEngine;
use crate::results::SentenceMatches;
use crate::tantivy_integration::position_tokenizer::decode_annotation;

impl SpanEngine {
    fn parser(&self) -> DocumentParser {
        DocumentParser::new(self.fields.clone())
    }

    /// Add a document, one index entry per sentence. Returns the number of sentences added.
    pub fn add_document(&mut self, document: &Document) -> Result<usize> {
        let tantivy_docs = self.parser().to_tantivy_documents(document)?;
        let writer = self.writer.as_mut().ok_or_else(|| {
            anyhow!("Cannot add document: Engine is in READ-ONLY mode (index lock could not be acquired)")
        })?;
        let count = tantivy_docs.len();
        for tantivy_doc in tantivy_docs {
            writer.add_document(tantivy_doc)?;
        }
        log::debug!("Added document '{}' ({} sentences)", document.id, count);
        Ok(count)
    }

    pub fn add_documents(&mut self, documents: &[Document]) -> Result<usize> {
        let mut sentences = 0;
        for document in documents {
            sentences += self.add_document(document)?;
        }
        Ok(sentences)
    }

    /// Parse a JSON, JSON lines or gzipped file and add its documents.
    /// Returns the number of documents added.
    pub fn add_file(&mut self, path: &Path) -> Result<usize> {
        let documents = self.parser().parse_file(path)?;
        let sentences = self.add_documents(&documents)?;
        log::info!(
            "Indexed {} documents ({} sentences) from {}",
            documents.len(),
            sentences,
            path.display()
        );
        Ok(documents.len())
    }

    /// Commit changes and refresh the reader
    pub fn commit(&mut self) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| anyhow!("Cannot commit: Engine is in READ-ONLY mode"))?;
        let opstamp = writer.commit()?;
        self.reader = self.index.reader()?;
        log::info!("Committed index (opstamp {}, {} sentences)", opstamp, self.num_sentences());
        Ok(())
    }

    /// Load the stored fields of a sentence for reporting matches
    pub(crate) fn sentence_matches(
        &self,
        searcher: &Searcher,
        doc_address: DocAddress,
        sentence_length: usize,
    ) -> Result<SentenceMatches> {
        let doc: TantivyDocument = searcher.doc(doc_address)?;
        let document_id = stored_text(&doc, self.fields.doc_id).unwrap_or_else(|| "unknown".to_string());
        let sentence_id = doc
            .get_first(self.fields.sentence_id)
            .and_then(|value| value.as_u64())
            .unwrap_or(0);

        let mut tokens = self
            .fields
            .annotation(&self.config.default_annotation)
            .and_then(|field| stored_text(&doc, field))
            .map(|text| decode_annotation(&text))
            .unwrap_or_default();
        // Trailing tokens may be unannotated
        if tokens.len() < sentence_length {
            tokens.resize(sentence_length, String::new());
        }
        Ok(SentenceMatches::new(doc_address, document_id, sentence_id, tokens))
    }
}

fn stored_text(doc: &TantivyDocument, field: Field) -> Option<String> {
    doc.get_first(field).and_then(|value| value.as_str()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use crate::data::{Document, Sentence};
    use crate::engine::config::EngineConfig;
    use crate::engine::core::SpanEngine;
    use std::io::Write;
    use tantivy::DocAddress;

    fn strings(values: &str) -> Vec<String> {
        values.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_add_and_commit() {
        let mut engine = SpanEngine::create_in_ram(EngineConfig::default()).unwrap();
        let document = Document::new(
            "doc-7",
            vec![
                Sentence::from_annotations([("word", strings("Cats purr")), ("pos", strings("NNS VBP"))]),
                Sentence::from_annotations([("word", strings("Dogs bark loudly"))]),
            ],
        );
        assert_eq!(engine.add_document(&document).unwrap(), 2);
        engine.commit().unwrap();
        assert_eq!(engine.num_sentences(), 2);
    }

    #[test]
    fn test_sentence_matches_reads_stored_fields() {
        let mut engine = SpanEngine::create_in_ram(EngineConfig::default()).unwrap();
        let mut sentence = Sentence::from_annotations([("word", strings("a b"))]);
        sentence.num_tokens = 3;
        engine.add_document(&Document::new("d", vec![sentence])).unwrap();
        engine.commit().unwrap();

        let matches = engine.sentence_matches(&engine.searcher(), DocAddress::new(0, 0), 3).unwrap();
        assert_eq!(matches.document_id, "d");
        assert_eq!(matches.sentence_id, 0);
        assert_eq!(matches.tokens, vec!["a".to_string(), "b".to_string(), String::new()]);
    }

    #[test]
    fn test_add_file() {
        let document = Document::new("f", vec![Sentence::from_annotations([("word", strings("one two"))])]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", serde_json::to_string(&document).unwrap()).unwrap();

        let mut engine = SpanEngine::create_in_ram(EngineConfig::default()).unwrap();
        assert_eq!(engine.add_file(file.path()).unwrap(), 1);
        engine.commit().unwrap();
        assert_eq!(engine.num_sentences(), 1);
    }
}
