use std::sync::Arc;

use tantivy::fastfield::AliveBitSet;
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::{InvertedIndexReader, SegmentReader, TantivyError, Term};

use crate::error::Result;
use crate::query::TermSource;
use crate::spans::{BoxedSpans, HitSpans};
use crate::tantivy_integration::postings_spans::PostingsSpans;

/// Term source for one annotation field of one segment
pub struct SegmentTermSource {
    field: Field,
    inverted_index: Arc<InvertedIndexReader>,
    alive: Option<AliveBitSet>,
}

impl SegmentTermSource {
    pub fn new(segment: &SegmentReader, field: Field) -> Result<Self> {
        Ok(Self {
            field,
            inverted_index: segment.inverted_index(field)?,
            alive: segment.alive_bitset().cloned(),
        })
    }
}

impl TermSource for SegmentTermSource {
    fn term_spans(&self, value: &str) -> Result<BoxedSpans> {
        let term = Term::from_field_text(self.field, value);
        let postings = self
            .inverted_index
            .read_postings(&term, IndexRecordOption::WithFreqsAndPositions)
            .map_err(TantivyError::from)?;
        match postings {
            Some(postings) => Ok(Box::new(PostingsSpans::new(postings, self.alive.clone()))),
            None => {
                log::trace!("Term {:?} not in segment", value);
                Ok(Box::new(HitSpans::empty()))
            }
        }
    }
}

impl std::fmt::Debug for SegmentTermSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentTermSource").field("field", &self.field).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::schema::{build_schema, register_tokenizers};
    use crate::spans::{collect_hits, SpanCursor};
    use crate::tantivy_integration::position_tokenizer::encode_annotation;
    use crate::types::Hit;
    use tantivy::indexer::NoMergePolicy;
    use tantivy::{Index, IndexWriter, TantivyDocument};

    /// Index sentences of words and return the index with its word field
    fn index_sentences(sentences: &[&[&str]]) -> (Index, Field) {
        let schema = build_schema(&["word".to_string()]).unwrap();
        let word = schema.get_field("word").unwrap();
        let index = Index::create_in_ram(schema);
        register_tokenizers(&index);
        let mut writer: IndexWriter = index.writer_with_num_threads(1, 15_000_000).unwrap();
        for sentence in sentences {
            let mut doc = TantivyDocument::default();
            doc.add_text(word, encode_annotation(*sentence));
            writer.add_document(doc).unwrap();
        }
        writer.commit().unwrap();
        (index, word)
    }

    #[test]
    fn test_postings_become_single_token_hits() {
        let (index, word) = index_sentences(&[&["the", "cat", "saw", "the", "dog"], &["a", "cat"], &["the", "end"]]);
        let searcher = index.reader().unwrap().searcher();
        let source = SegmentTermSource::new(searcher.segment_reader(0), word).unwrap();

        let hits = collect_hits(source.term_spans("the").unwrap()).unwrap();
        assert_eq!(hits, vec![Hit::new(0, 0, 1), Hit::new(0, 3, 4), Hit::new(2, 0, 1)]);

        let mut cat = source.term_spans("cat").unwrap();
        assert!(cat.skip_to(1).unwrap());
        assert_eq!(cat.hit(), Some(Hit::new(1, 1, 2)));
        assert!(!cat.advance().unwrap());
    }

    #[test]
    fn test_unknown_term_gives_empty_cursor() {
        let (index, word) = index_sentences(&[&["only", "words"]]);
        let searcher = index.reader().unwrap().searcher();
        let source = SegmentTermSource::new(searcher.segment_reader(0), word).unwrap();
        assert!(collect_hits(source.term_spans("missing").unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_deleted_documents_are_skipped() {
        let (index, word) = index_sentences(&[&["x", "z"], &["y", "x"], &["x"]]);
        let mut writer: IndexWriter = index.writer_with_num_threads(1, 15_000_000).unwrap();
        writer.set_merge_policy(Box::new(NoMergePolicy));
        // Delete the sentence containing "y"
        writer.delete_term(Term::from_field_text(word, "y"));
        writer.commit().unwrap();

        let searcher = index.reader().unwrap().searcher();
        let source = SegmentTermSource::new(searcher.segment_reader(0), word).unwrap();
        let hits = collect_hits(source.term_spans("x").unwrap()).unwrap();
        assert_eq!(hits, vec![Hit::new(0, 0, 1), Hit::new(2, 0, 1)]);
    }
}
