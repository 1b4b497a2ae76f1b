//! Back-to-back repetitions of a clause.
//!
//! The base hits are grouped into maximal runs where each hit starts where
//! the previous one ended. Within a run of length `L`, every start offset
//! `i` and every count `k` in `[min, min(max, L - i)]` yields the hit from
//! the start of element `i` to the end of element `i + k - 1`, ordered by
//! `i` then `k`.
//!
//! Runs are formed in start order, so a base with hits of different lengths
//! can split what would be a chain into separate runs. For example the base
//! `[0,1) [0,2) [1,2) [2,3)` forms the runs `[0,1)`, `[0,2)` and
//! `[1,2) [2,3)`, and two repetitions only yield `[1,3)`: the chains
//! `[0,1) [1,2)` and `[0,2) [2,3)` are never produced. Fixed-length bases
//! are not affected.

use std::fmt;

use crate::engine::config::SpanLimits;
use crate::error::{Result, SpanError};
use crate::spans::{BoxedSpans, SpanCursor, SpansInBuckets};
use crate::types::{DocId, Hit, SpanGuarantees};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepetitionState {
    NotStarted,
    /// `count` repetitions starting at run element `first`
    Matching { first: usize, count: u32, hit: Hit },
    Exhausted,
}

pub struct RepetitionSpans {
    runs: SpansInBuckets,
    min: u32,
    /// `None` is unbounded
    max: Option<u32>,
    state: RepetitionState,
    base: SpanGuarantees,
}

impl RepetitionSpans {
    /// The base clause must be start-sorted and duplicate free
    pub fn new(base: BoxedSpans, min: u32, max: Option<u32>, limits: SpanLimits) -> Result<Self> {
        if min < 1 {
            return Err(SpanError::InvalidRepetition(format!(
                "minimum must be at least 1, got {}",
                min
            )));
        }
        if let Some(max) = max {
            if min > max {
                return Err(SpanError::InvalidBounds { min, max });
            }
        }
        let g = base.guarantees();
        if !g.start_sorted || !g.hits_are_unique() {
            return Err(SpanError::Precondition(format!(
                "repetition needs a start-sorted, unique clause, got {:?}",
                base
            )));
        }
        Ok(Self {
            runs: SpansInBuckets::consecutive(base, limits),
            min,
            max,
            state: RepetitionState::NotStarted,
            base: g,
        })
    }

    fn exhaust(&mut self) -> Result<bool> {
        self.state = RepetitionState::Exhausted;
        Ok(false)
    }

    fn emit(&mut self, first: usize, count: u32) -> Result<bool> {
        let run = self.runs.bucket()?;
        let from = run[first];
        let to = run[first + count as usize - 1];
        let hit = Hit::new(from.doc, from.start, to.end);
        self.state = RepetitionState::Matching { first, count, hit };
        Ok(true)
    }

    /// Starting from the current run, find one long enough for `min` and emit its first hit
    fn first_in_run(&mut self, mut found: bool) -> Result<bool> {
        while found {
            if self.runs.bucket()?.len() >= self.min as usize {
                return self.emit(0, self.min);
            }
            found = self.runs.next_bucket()?;
        }
        self.exhaust()
    }
}

impl SpanCursor for RepetitionSpans {
    fn hit(&self) -> Option<Hit> {
        match self.state {
            RepetitionState::Matching { hit, .. } => Some(hit),
            _ => None,
        }
    }

    fn advance(&mut self) -> Result<bool> {
        match self.state {
            RepetitionState::Exhausted => Ok(false),
            RepetitionState::NotStarted => {
                let found = self.runs.next_bucket()?;
                self.first_in_run(found)
            }
            RepetitionState::Matching { mut first, count, .. } => {
                let run_len = self.runs.bucket()?.len();
                let mut count = count + 1;
                if self.max.is_some_and(|max| count > max) || first + count as usize > run_len {
                    first += 1;
                    count = self.min;
                }
                if first + count as usize <= run_len {
                    return self.emit(first, count);
                }
                let found = self.runs.next_bucket()?;
                self.first_in_run(found)
            }
        }
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        match self.state {
            RepetitionState::Exhausted => Ok(false),
            RepetitionState::Matching { hit, .. } if hit.doc >= target => self.advance(),
            _ => {
                // The current run, if any, lies before the target
                let found = self.runs.skip_to_bucket(target)?;
                self.first_in_run(found)
            }
        }
    }

    fn guarantees(&self) -> SpanGuarantees {
        let fixed = self.base.all_same_length();
        let single_count = self.max == Some(self.min);
        SpanGuarantees {
            start_sorted: fixed,
            end_sorted: fixed && single_count,
            unique_start: fixed && single_count && self.base.unique_start,
            unique_end: fixed && single_count && self.base.unique_end,
            unique: fixed,
            length: match self.base.length {
                Some(len) if single_count => Some(len * self.min),
                _ => None,
            },
        }
    }
}

impl fmt::Debug for RepetitionSpans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepetitionSpans")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("runs", &self.runs)
            .finish()
    }
}
