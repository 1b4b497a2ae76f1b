//! Sequence of two clauses whose midpoints are unique on both sides.
//!
//! When every left hit has a distinct end and every right hit a distinct
//! start, each midpoint pairs at most one left hit with one right hit, so
//! both cursors can be merged hit for hit without bucketing.

use std::fmt;

use crate::error::{Result, SpanError};
use crate::spans::{BoxedSpans, SpanCursor};
use crate::types::{DocId, Hit, SpanGuarantees};

pub struct SimpleSequenceSpans {
    left: BoxedSpans,
    right: BoxedSpans,
    current: Option<Hit>,
    exhausted: bool,
    guarantees: SpanGuarantees,
}

impl SimpleSequenceSpans {
    /// Whether two inputs qualify for the merge
    pub fn accepts(left: &SpanGuarantees, right: &SpanGuarantees) -> bool {
        left.end_sorted && left.unique_end && right.start_sorted && right.unique_start
    }

    pub fn new(left: BoxedSpans, right: BoxedSpans) -> Result<Self> {
        let lg = left.guarantees();
        let rg = right.guarantees();
        if !Self::accepts(&lg, &rg) {
            return Err(SpanError::Precondition(format!(
                "simple sequence needs unique midpoints, got left {:?} and right {:?}",
                lg, rg
            )));
        }
        Ok(Self {
            left,
            right,
            current: None,
            exhausted: false,
            guarantees: combine(lg, rg),
        })
    }

    fn exhaust(&mut self) -> Result<bool> {
        self.exhausted = true;
        self.current = None;
        Ok(false)
    }

    /// Advance whichever side lags until a left end meets a right start
    fn synchronize(&mut self) -> Result<bool> {
        loop {
            let left = self.left.hit();
            let right = self.right.hit();
            let (Some(l), Some(r)) = (left, right) else {
                return self.exhaust();
            };
            let moved = if l.doc < r.doc {
                self.left.skip_to(r.doc)?
            } else if r.doc < l.doc {
                self.right.skip_to(l.doc)?
            } else if l.end < r.start {
                self.left.advance()?
            } else if r.start < l.end {
                self.right.advance()?
            } else {
                self.current = Some(Hit::new(l.doc, l.start, r.end));
                return Ok(true);
            };
            if !moved {
                return self.exhaust();
            }
        }
    }
}

fn combine(left: SpanGuarantees, right: SpanGuarantees) -> SpanGuarantees {
    SpanGuarantees {
        start_sorted: left.start_sorted && (left.unique_start || right.end_sorted),
        end_sorted: right.end_sorted && (right.unique_end || left.start_sorted),
        unique_start: left.unique_start,
        unique_end: right.unique_end,
        // One pair per midpoint
        unique: true,
        length: match (left.length, right.length) {
            (Some(l), Some(r)) => Some(l + r),
            _ => None,
        },
    }
}

impl SpanCursor for SimpleSequenceSpans {
    fn hit(&self) -> Option<Hit> {
        self.current
    }

    fn advance(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        // Both sides move: a used midpoint cannot match again
        if !(self.left.advance()? && self.right.advance()?) {
            return self.exhaust();
        }
        self.synchronize()
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if matches!(self.current, Some(hit) if hit.doc >= target) {
            return self.advance();
        }
        if !self.left.skip_to(target)? || !self.right.skip_to(target)? {
            return self.exhaust();
        }
        self.synchronize()
    }

    fn guarantees(&self) -> SpanGuarantees {
        self.guarantees
    }
}

impl fmt::Debug for SimpleSequenceSpans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleSequenceSpans")
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spans::{collect_hits, HitSpans};

    fn source(triples: &[(u32, u32, u32)]) -> BoxedSpans {
        Box::new(HitSpans::new(triples.iter().map(|&t| Hit::from(t)).collect()).unwrap())
    }

    #[test]
    fn test_merges_adjacent_tokens() {
        // "the" at 0, 4, 9 and "cat" at 1, 7, 10 in doc 0; doc 2 has "the cat"
        let spans = SimpleSequenceSpans::new(
            source(&[(0, 0, 1), (0, 4, 5), (0, 9, 10), (2, 3, 4)]),
            source(&[(0, 1, 2), (0, 7, 8), (0, 10, 11), (1, 0, 1), (2, 4, 5)]),
        )
        .unwrap();
        assert_eq!(
            collect_hits(spans).unwrap(),
            vec![Hit::new(0, 0, 2), Hit::new(0, 9, 11), Hit::new(2, 3, 5)]
        );
    }

    #[test]
    fn test_skip_to() {
        let mut spans = SimpleSequenceSpans::new(
            source(&[(0, 0, 1), (3, 2, 3), (5, 0, 1)]),
            source(&[(0, 1, 2), (3, 3, 4), (5, 1, 2)]),
        )
        .unwrap();
        assert!(spans.skip_to(1).unwrap());
        assert_eq!(spans.hit(), Some(Hit::new(3, 2, 4)));
        assert!(spans.skip_to(3).unwrap());
        assert_eq!(spans.hit(), Some(Hit::new(5, 0, 2)));
        assert!(!spans.advance().unwrap());
    }

    #[test]
    fn test_rejects_shared_midpoints() {
        let left = source(&[(0, 0, 2), (0, 1, 2)]);
        let err = SimpleSequenceSpans::new(left, source(&[(0, 2, 3)])).unwrap_err();
        assert!(matches!(err, SpanError::Precondition(_)));
    }
}
