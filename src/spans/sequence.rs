//! Sequence of two clauses meeting at a shared midpoint.
//!
//! Produces `(doc, left.start, right.end)` for every left hit and right hit
//! with `left.end == right.start`. The left cursor is walked in end order;
//! for each midpoint, all right hits starting there are gathered into a
//! per-start-point bucket and combined with every left hit ending there.
//!
//! Output may be out of order and may contain duplicates. Wrap it in a
//! start-sorting, deduplicating [`PerDocumentSortedSpans`] before exposing
//! it, and re-sort by end before using it as the left side of another
//! sequence.
//!
//! [`PerDocumentSortedSpans`]: crate::spans::PerDocumentSortedSpans

use std::fmt;

use crate::engine::config::SpanLimits;
use crate::error::{Result, SpanError};
use crate::spans::{BoxedSpans, SpanCursor, SpansInBuckets};
use crate::types::{DocId, Hit, SpanGuarantees};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceState {
    NotStarted,
    /// Combining the current left hit with `right.bucket()[index]`
    Matching { index: usize, hit: Hit },
    Exhausted,
}

pub struct SequenceSpans {
    left: BoxedSpans,
    right: SpansInBuckets,
    state: SequenceState,
    guarantees: SpanGuarantees,
}

impl SequenceSpans {
    /// `left` must be end-sorted, `right` start-sorted
    pub fn new(left: BoxedSpans, right: BoxedSpans, limits: SpanLimits) -> Result<Self> {
        let lg = left.guarantees();
        let rg = right.guarantees();
        if !lg.end_sorted {
            return Err(SpanError::Precondition(format!(
                "sequence needs an end-sorted left side, got {:?}",
                left
            )));
        }
        let right = SpansInBuckets::per_start_point(right, limits)?;
        Ok(Self {
            left,
            right,
            state: SequenceState::NotStarted,
            guarantees: combine(lg, rg),
        })
    }

    fn exhaust(&mut self) -> Result<bool> {
        self.state = SequenceState::Exhausted;
        Ok(false)
    }

    /// Emit the current left hit combined with the bucket hit at `index`
    fn emit(&mut self, index: usize) -> Result<bool> {
        let right = self.right.bucket()?[index];
        let hit = Hit::new(right.doc, self.left.start(), right.end);
        self.state = SequenceState::Matching { index, hit };
        Ok(true)
    }

    /// Move both sides forward until the left end meets a right start.
    ///
    /// Both sides must be positioned on entry.
    fn realign(&mut self) -> Result<bool> {
        loop {
            let Some(mut right_doc) = self.right.doc() else {
                return self.exhaust();
            };
            let mut left_doc = self.left.doc();
            while left_doc != right_doc {
                if left_doc < right_doc {
                    if !self.left.skip_to(right_doc)? {
                        return self.exhaust();
                    }
                    left_doc = self.left.doc();
                } else {
                    if !self.right.skip_to_bucket(left_doc)? {
                        return self.exhaust();
                    }
                    right_doc = match self.right.doc() {
                        Some(doc) => doc,
                        None => return self.exhaust(),
                    };
                }
            }

            // Same document: walk the midpoints
            loop {
                let left_end = self.left.end();
                let right_start = self.right.bucket()?[0].start;
                log::trace!("realign doc {}: left end {}, right start {}", left_doc, left_end, right_start);
                if right_start < left_end {
                    if !self.right.next_bucket()? {
                        return self.exhaust();
                    }
                    if self.right.doc() != Some(left_doc) {
                        break;
                    }
                } else if left_end < right_start {
                    if !self.left.advance()? {
                        return self.exhaust();
                    }
                    if self.left.doc() != left_doc {
                        break;
                    }
                } else {
                    return self.emit(0);
                }
            }
        }
    }
}

/// Guarantees of the raw sequence output
fn combine(left: SpanGuarantees, right: SpanGuarantees) -> SpanGuarantees {
    let unique_start = left.unique_start && right.unique_start;
    let unique_end = left.unique_end && right.unique_end;
    SpanGuarantees {
        // Left hits arrive in end order, which is start order only for fixed-length hits
        start_sorted: left.all_same_length() && left.unique,
        // Each midpoint yields one right hit, and right ends follow right starts
        end_sorted: right.all_same_length() && right.unique,
        unique_start,
        unique_end,
        unique: unique_start || unique_end,
        length: match (left.length, right.length) {
            (Some(l), Some(r)) => Some(l + r),
            _ => None,
        },
    }
}

impl SpanCursor for SequenceSpans {
    fn hit(&self) -> Option<Hit> {
        match self.state {
            SequenceState::Matching { hit, .. } => Some(hit),
            _ => None,
        }
    }

    fn advance(&mut self) -> Result<bool> {
        match self.state {
            SequenceState::Exhausted => Ok(false),
            SequenceState::NotStarted => {
                if !self.left.advance()? || !self.right.next_bucket()? {
                    return self.exhaust();
                }
                self.realign()
            }
            SequenceState::Matching { index, .. } => {
                if index + 1 < self.right.bucket()?.len() {
                    return self.emit(index + 1);
                }
                if !self.left.advance()? {
                    return self.exhaust();
                }
                // A left hit with the same end reuses the current bucket
                self.realign()
            }
        }
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        match self.state {
            SequenceState::Exhausted => Ok(false),
            SequenceState::Matching { hit, .. } if hit.doc >= target => self.advance(),
            SequenceState::NotStarted | SequenceState::Matching { .. } => {
                if !self.left.skip_to(target)? || !self.right.skip_to_bucket(target)? {
                    return self.exhaust();
                }
                self.realign()
            }
        }
    }

    fn guarantees(&self) -> SpanGuarantees {
        self.guarantees
    }
}

impl fmt::Debug for SequenceSpans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceSpans")
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}
