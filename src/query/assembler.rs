//! Turns a compiled pattern tree into a cursor tree.
//!
//! Leaves come from the source registry. Every raw combinator (sequence,
//! repetition, expansion) is wrapped in a start-sorting, deduplicating
//! per-document sort, and a sequence's left side is re-sorted by end first
//! when needed. A repetition or expansion that opens a sequence skips the
//! start sort and goes straight to the end sort. The top-level cursor is
//! therefore always sorted by document, start and end, without duplicates.

use crate::engine::config::SpanLimits;
use crate::error::{Result, SpanError};
use crate::query::{SourceRegistry, SpanPattern};
use crate::spans::{
    BoxedSpans, ExpansionSpans, PerDocumentSortedSpans, RepetitionSpans, SequenceSpans, SimpleSequenceSpans,
    SpanCursor, UniqueSpans,
};

pub struct SpanAssembler<'r, 'a> {
    registry: &'r SourceRegistry<'a>,
    limits: SpanLimits,
}

impl<'r, 'a> SpanAssembler<'r, 'a> {
    pub fn new(registry: &'r SourceRegistry<'a>, limits: SpanLimits) -> Self {
        Self { registry, limits }
    }

    /// Build the cursor tree for a pattern
    pub fn assemble(&self, pattern: &SpanPattern) -> Result<BoxedSpans> {
        let spans = self.build(pattern)?;
        log::debug!("Assembled {} into {:?}", pattern, spans.guarantees());
        Ok(spans)
    }

    fn build(&self, pattern: &SpanPattern) -> Result<BoxedSpans> {
        match pattern {
            SpanPattern::Term { annotation, value } => {
                let spans = self.registry.term_spans(annotation, value)?;
                self.sorted_unique(spans)
            }
            SpanPattern::Sequence { clauses } => {
                let Some((first, rest)) = clauses.split_first() else {
                    return Err(SpanError::Precondition("sequence without clauses".to_string()));
                };
                // The first clause is re-sorted by end for the join anyway
                let mut spans = if rest.is_empty() { self.build(first)? } else { self.build_raw(first)? };
                for clause in rest {
                    let right = self.build(clause)?;
                    spans = self.sequence(spans, right)?;
                }
                Ok(spans)
            }
            SpanPattern::Repetition { .. } | SpanPattern::Expansion { .. } => {
                let raw = self.build_raw(pattern)?;
                Ok(self.resort(raw))
            }
        }
    }

    /// Like `build`, but repetitions and expansions come back without their
    /// start-sorting wrapper
    fn build_raw(&self, pattern: &SpanPattern) -> Result<BoxedSpans> {
        match pattern {
            SpanPattern::Repetition { clause, min, max } => {
                let base = self.build(clause)?;
                Ok(Box::new(RepetitionSpans::new(base, *min, *max, self.limits)?))
            }
            SpanPattern::Expansion { clause, direction, min, max } => {
                let base = self.build(clause)?;
                Ok(Box::new(ExpansionSpans::new(base, *direction, *min, *max)?))
            }
            _ => self.build(pattern),
        }
    }

    /// Join two start-sorted, unique cursors
    fn sequence(&self, left: BoxedSpans, right: BoxedSpans) -> Result<BoxedSpans> {
        let lg = left.guarantees();
        let rg = right.guarantees();
        if SimpleSequenceSpans::accepts(&lg, &rg) {
            log::trace!("Using simple sequence for {:?} and {:?}", lg, rg);
            let simple = SimpleSequenceSpans::new(left, right)?;
            return self.sorted_unique(Box::new(simple));
        }
        let left: BoxedSpans = if lg.end_sorted {
            left
        } else {
            Box::new(PerDocumentSortedSpans::end_sorted(left, true, self.limits))
        };
        let raw = SequenceSpans::new(left, right, self.limits)?;
        Ok(self.resort(Box::new(raw)))
    }

    fn resort(&self, raw: BoxedSpans) -> BoxedSpans {
        Box::new(PerDocumentSortedSpans::start_sorted_unique(raw, self.limits))
    }

    /// Add whatever sorting or filtering is missing for start-sorted, unique output
    fn sorted_unique(&self, spans: BoxedSpans) -> Result<BoxedSpans> {
        let g = spans.guarantees();
        if !g.start_sorted {
            Ok(self.resort(spans))
        } else if !g.unique {
            Ok(Box::new(UniqueSpans::new(spans)?))
        } else {
            Ok(spans)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TermSource;
    use crate::spans::{collect_hits, Direction, HitSpans};
    use crate::types::{Hit, SpanGuarantees};
    use std::collections::HashMap;

    /// Term hits keyed by value, with the guarantees a real index would declare
    #[derive(Debug)]
    struct Terms(HashMap<&'static str, Vec<(u32, u32, u32)>>);

    impl TermSource for Terms {
        fn term_spans(&self, value: &str) -> Result<BoxedSpans> {
            let hits = self
                .0
                .get(value)
                .map(|v| v.iter().map(|&t| Hit::from(t)).collect())
                .unwrap_or_default();
            Ok(Box::new(HitSpans::with_guarantees(hits, SpanGuarantees::TERM)?))
        }
    }

    fn registry() -> SourceRegistry<'static> {
        // doc 0: the big big cat sat
        // doc 1: a cat sat on the mat
        let mut words = HashMap::new();
        words.insert("the", vec![(0, 0, 1), (1, 4, 5)]);
        words.insert("big", vec![(0, 1, 2), (0, 2, 3)]);
        words.insert("cat", vec![(0, 3, 4), (1, 1, 2)]);
        words.insert("sat", vec![(0, 4, 5), (1, 2, 3)]);
        words.insert("mat", vec![(1, 5, 6)]);
        let mut registry = SourceRegistry::new();
        registry.register("word", Terms(words));
        registry
    }

    fn search(pattern: &SpanPattern) -> Vec<(u32, u32, u32)> {
        let registry = registry();
        let spans = SpanAssembler::new(&registry, SpanLimits::unlimited()).assemble(pattern).unwrap();
        collect_hits(spans)
            .unwrap()
            .into_iter()
            .map(|h| (h.doc, h.start, h.end))
            .collect()
    }

    fn word(value: &str) -> SpanPattern {
        SpanPattern::term("word", value)
    }

    #[test]
    fn test_term() {
        assert_eq!(search(&word("cat")), vec![(0, 3, 4), (1, 1, 2)]);
    }

    #[test]
    fn test_sequence_of_terms() {
        let pattern = SpanPattern::sequence(vec![word("cat"), word("sat")]);
        assert_eq!(search(&pattern), vec![(0, 3, 5), (1, 1, 3)]);
    }

    #[test]
    fn test_repetition_inside_sequence() {
        let pattern = SpanPattern::sequence(vec![
            word("the"),
            SpanPattern::repetition(word("big"), 1, None),
            word("cat"),
        ]);
        assert_eq!(search(&pattern), vec![(0, 0, 4)]);
    }

    #[test]
    fn test_variable_length_left_side_is_end_sorted() {
        // big{1,2} has variable length, so its ends are not in start order
        let pattern = SpanPattern::sequence(vec![SpanPattern::repetition(word("big"), 1, Some(2)), word("cat")]);
        assert_eq!(search(&pattern), vec![(0, 1, 4), (0, 2, 4)]);
    }

    #[test]
    fn test_expansion_gap() {
        // "cat" followed by one or two arbitrary tokens, then "the"
        let pattern = SpanPattern::sequence(vec![
            SpanPattern::expansion(word("cat"), Direction::Right, 1, Some(2)),
            word("the"),
        ]);
        assert_eq!(search(&pattern), vec![(1, 1, 5)]);
        let pattern = SpanPattern::sequence(vec![
            SpanPattern::expansion(word("cat"), Direction::Right, 1, Some(1)),
            word("the"),
        ]);
        assert!(search(&pattern).is_empty());
        let pattern = SpanPattern::sequence(vec![
            SpanPattern::expansion(word("sat"), Direction::Right, 1, Some(2)),
            word("the"),
        ]);
        assert_eq!(search(&pattern), vec![(1, 2, 5)]);
    }

    #[test]
    fn test_leading_expansion_is_sorted_once() {
        let registry = registry();
        let pattern = SpanPattern::sequence(vec![
            SpanPattern::expansion(word("cat"), Direction::Right, 1, Some(2)),
            word("the"),
        ]);
        let spans = SpanAssembler::new(&registry, SpanLimits::unlimited()).assemble(&pattern).unwrap();
        let tree = format!("{:?}", spans);
        // Only the final output sort by start, and the left side's sort by end
        assert_eq!(tree.matches("order: StartPoint").count(), 1);
        assert_eq!(tree.matches("order: EndPoint").count(), 1);
        assert_eq!(collect_hits(spans).unwrap(), vec![Hit::new(1, 1, 5)]);
    }

    #[test]
    fn test_left_expansion_at_sentence_start() {
        let pattern = SpanPattern::expansion(word("big"), Direction::Left, 1, None);
        assert_eq!(search(&pattern), vec![(0, 0, 2), (0, 0, 3), (0, 1, 3)]);
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let registry = registry();
        let assembler = SpanAssembler::new(&registry, SpanLimits::unlimited());
        let err = assembler.assemble(&SpanPattern::sequence(vec![])).unwrap_err();
        assert!(matches!(err, SpanError::Precondition(_)));
    }

    #[test]
    fn test_errors_surface_at_construction() {
        let registry = registry();
        let assembler = SpanAssembler::new(&registry, SpanLimits::unlimited());
        let err = assembler.assemble(&SpanPattern::repetition(word("big"), 0, Some(2))).unwrap_err();
        assert!(matches!(err, SpanError::InvalidRepetition(_)));
        let err = assembler.assemble(&SpanPattern::term("lemma", "be")).unwrap_err();
        assert!(matches!(err, SpanError::UnknownAnnotation(_)));
    }
}
