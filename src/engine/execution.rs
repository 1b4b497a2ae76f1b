//! Span search over the index, one cursor tree per segment

use anyhow::Result;
use tantivy::{DocAddress, SegmentReader};

use crate::engine::constants::FIELD_SENTENCE_LENGTH;
use crate::engine::core::SpanEngine;
use crate::query::{SourceRegistry, SpanAssembler, SpanPattern};
use crate::results::{SentenceMatches, SpanResults};
use crate::spans::SpanIter;
use crate::tantivy_integration::SegmentTermSource;

impl SpanEngine {
    /// Run a pattern over every segment and return up to `limit` matches.
    ///
    /// `total_hits` counts every match, including those past the limit.
    /// Hits ending beyond their sentence are dropped before counting.
    pub fn search(&self, pattern: &SpanPattern, limit: usize) -> Result<SpanResults> {
        let searcher = self.reader.searcher();
        let mut results = SpanResults::empty();
        let mut returned = 0;

        for (segment_ord, segment_reader) in searcher.segment_readers().iter().enumerate() {
            let registry = self.segment_registry(segment_reader, pattern)?;
            let spans = SpanAssembler::new(&registry, self.config.limits).assemble(pattern)?;
            let lengths = segment_reader.fast_fields().u64(FIELD_SENTENCE_LENGTH)?;

            let mut current: Option<SentenceMatches> = None;
            for hit in SpanIter::new(spans) {
                let hit = hit?;
                let length = lengths.first(hit.doc).unwrap_or(0);
                if u64::from(hit.end) > length {
                    log::trace!("Dropping {:?} past sentence length {}", hit, length);
                    continue;
                }
                results.total_hits += 1;
                if returned >= limit {
                    continue;
                }

                let address = DocAddress::new(segment_ord as u32, hit.doc);
                if current.as_ref().map(|s| s.doc_address) != Some(address) {
                    results.sentences.extend(current.take());
                    current = Some(self.sentence_matches(&searcher, address, length as usize)?);
                }
                if let Some(sentence) = current.as_mut() {
                    if sentence.add_match(hit.start, hit.end) {
                        returned += 1;
                    }
                }
            }
            results.sentences.extend(current.take());
        }

        log::debug!(
            "Pattern {} matched {} hits ({} returned) in {} sentences",
            pattern,
            results.total_hits,
            returned,
            results.sentences.len()
        );
        Ok(results)
    }

    /// Term sources for the annotations a pattern uses. Annotations the index
    /// does not have are left out so assembly reports them.
    fn segment_registry(&self, segment_reader: &SegmentReader, pattern: &SpanPattern) -> Result<SourceRegistry<'static>> {
        let mut registry = SourceRegistry::new();
        for name in pattern.annotations() {
            if let Some(field) = self.fields.annotation(name) {
                registry.register(name, SegmentTermSource::new(segment_reader, field)?);
            }
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use crate::data::{Document, Sentence};
    use crate::engine::config::{EngineConfig, OverflowPolicy, SpanLimits};
    use crate::engine::core::SpanEngine;
    use crate::error::SpanError;
    use crate::query::SpanPattern;
    use crate::results::SpanResults;
    use crate::spans::Direction;

    fn strings(values: &str) -> Vec<String> {
        values.split_whitespace().map(str::to_string).collect()
    }

    fn engine_with(config: EngineConfig) -> SpanEngine {
        let mut engine = SpanEngine::create_in_ram(config).unwrap();
        let first = Document::new(
            "news-1",
            vec![
                Sentence::from_annotations([
                    ("word", strings("the big big cat sat")),
                    ("lemma", strings("the big big cat sit")),
                    ("pos", strings("DT JJ JJ NN VBD")),
                ]),
                Sentence::from_annotations([
                    ("word", strings("a cat sat on the mat")),
                    ("lemma", strings("a cat sit on the mat")),
                    ("pos", strings("DT NN VBD IN DT NN")),
                ]),
            ],
        );
        let second = Document::new(
            "news-2",
            vec![Sentence::from_annotations([
                ("word", strings("cats sit")),
                ("lemma", strings("cat sit")),
                ("pos", strings("NNS VBP")),
            ])],
        );
        engine.add_documents(&[first, second]).unwrap();
        engine.commit().unwrap();
        engine
    }

    fn engine() -> SpanEngine {
        engine_with(EngineConfig::default())
    }

    /// (document id, sentence id, start, end, text), sorted
    fn flatten(results: &SpanResults) -> Vec<(String, u64, u32, u32, String)> {
        let mut rows: Vec<_> = results
            .sentences
            .iter()
            .flat_map(|s| {
                s.matches
                    .iter()
                    .map(|m| (s.document_id.clone(), s.sentence_id, m.start, m.end, m.text.clone()))
            })
            .collect();
        rows.sort();
        rows
    }

    #[test]
    fn test_lemma_sequence() {
        let pattern = SpanPattern::sequence(vec![SpanPattern::term("lemma", "cat"), SpanPattern::term("lemma", "sit")]);
        let results = engine().search(&pattern, 10).unwrap();
        assert_eq!(results.total_hits, 3);
        assert_eq!(
            flatten(&results),
            vec![
                ("news-1".to_string(), 0, 3, 5, "cat sat".to_string()),
                ("news-1".to_string(), 1, 1, 3, "cat sat".to_string()),
                ("news-2".to_string(), 0, 0, 2, "cats sit".to_string()),
            ]
        );
    }

    #[test]
    fn test_repetition_over_pos() {
        let pattern = SpanPattern::sequence(vec![
            SpanPattern::repetition(SpanPattern::term("pos", "JJ"), 1, Some(2)),
            SpanPattern::term("pos", "NN"),
        ]);
        let results = engine().search(&pattern, 10).unwrap();
        assert_eq!(
            flatten(&results),
            vec![
                ("news-1".to_string(), 0, 1, 4, "big big cat".to_string()),
                ("news-1".to_string(), 0, 2, 4, "big cat".to_string()),
            ]
        );
        assert_eq!(results.sentences.len(), 1);
    }

    #[test]
    fn test_expansion_is_clipped_to_sentence() {
        let pattern = SpanPattern::expansion(SpanPattern::term("word", "sat"), Direction::Right, 1, Some(2));
        let results = engine().search(&pattern, 10).unwrap();
        // "sat" ends the first sentence, so only the second sentence matches
        assert_eq!(results.total_hits, 2);
        assert_eq!(
            flatten(&results),
            vec![
                ("news-1".to_string(), 1, 2, 4, "sat on".to_string()),
                ("news-1".to_string(), 1, 2, 5, "sat on the".to_string()),
            ]
        );
    }

    #[test]
    fn test_limit_keeps_total() {
        let results = engine().search(&SpanPattern::term("pos", "DT"), 2).unwrap();
        assert_eq!(results.total_hits, 3);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_unknown_annotation_is_reported() {
        let err = engine().search(&SpanPattern::term("ner", "PER"), 10).unwrap_err();
        assert!(matches!(err.downcast_ref::<SpanError>(), Some(SpanError::UnknownAnnotation(name)) if name == "ner"));
    }

    #[test]
    fn test_bucket_limit_truncates() {
        let config = EngineConfig {
            limits: SpanLimits::unlimited().with_max_bucket_hits(1, OverflowPolicy::Truncate),
            ..EngineConfig::default()
        };
        let pattern = SpanPattern::repetition(SpanPattern::term("pos", "JJ"), 1, None);
        let results = engine_with(config).search(&pattern, 10).unwrap();
        // The run "big big" is cut to its first token
        assert_eq!(flatten(&results), vec![("news-1".to_string(), 0, 1, 2, "big".to_string())]);
    }
}
