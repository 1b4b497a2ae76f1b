//! Span cursors and the combinators that build compound matches from them.
//!
//! Every cursor walks hits document by document and never moves backward.
//! Raw combinators (sequence, repetition, expansion) may produce hits out of
//! order or duplicated within a document; they are made safe to expose by
//! wrapping them in [`PerDocumentSortedSpans`].

use std::fmt;

use crate::error::Result;
use crate::types::{DocId, Hit, SpanGuarantees, TokenPos};

pub mod buckets;
pub mod expansion;
pub mod hits;
pub mod repetition;
pub mod sequence;
pub mod sequence_simple;
pub mod sorted;
pub mod unique;


pub use buckets::{BucketKind, SpansInBuckets};
pub use expansion::{Direction, ExpansionSpans};
pub use hits::HitSpans;
pub use repetition::RepetitionSpans;
pub use sequence::SequenceSpans;
pub use sequence_simple::SimpleSequenceSpans;
pub use sorted::{HitOrder, PerDocumentSortedSpans};
pub use unique::UniqueSpans;

/// Forward-only, skippable iteration over hits, sorted by document.
///
/// A cursor starts out unpositioned. `advance` moves to the next hit in the
/// corpus, `skip_to` moves to the first hit in a document at or after the
/// target. If the cursor is already in or past the target document,
/// `skip_to` still moves at least one hit forward. Both return `Ok(false)`
/// once the cursor is exhausted.
pub trait SpanCursor: fmt::Debug {
    /// The current hit, or `None` if not started or exhausted
    fn hit(&self) -> Option<Hit>;

    fn advance(&mut self) -> Result<bool>;

    fn skip_to(&mut self, target: DocId) -> Result<bool>;

    /// Ordering and uniqueness promises for the hits this cursor produces
    fn guarantees(&self) -> SpanGuarantees;

    /// Document of the current hit. Panics if the cursor is not positioned.
    fn doc(&self) -> DocId {
        positioned(self.hit()).doc
    }

    /// Start of the current hit. Panics if the cursor is not positioned.
    fn start(&self) -> TokenPos {
        positioned(self.hit()).start
    }

    /// End of the current hit. Panics if the cursor is not positioned.
    fn end(&self) -> TokenPos {
        positioned(self.hit()).end
    }
}

pub type BoxedSpans = Box<dyn SpanCursor>;

fn positioned(hit: Option<Hit>) -> Hit {
    match hit {
        Some(hit) => hit,
        None => panic!("span cursor read while not positioned on a hit"),
    }
}

impl<C: SpanCursor + ?Sized> SpanCursor for Box<C> {
    fn hit(&self) -> Option<Hit> {
        (**self).hit()
    }

    fn advance(&mut self) -> Result<bool> {
        (**self).advance()
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        (**self).skip_to(target)
    }

    fn guarantees(&self) -> SpanGuarantees {
        (**self).guarantees()
    }
}

/// Iterator adapter draining a cursor hit by hit
pub struct SpanIter<C> {
    cursor: C,
    done: bool,
}

impl<C: SpanCursor> SpanIter<C> {
    pub fn new(cursor: C) -> Self {
        Self { cursor, done: false }
    }
}

impl<C: SpanCursor> Iterator for SpanIter<C> {
    type Item = Result<Hit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.advance() {
            Ok(true) => self.cursor.hit().map(Ok),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Drain every remaining hit of a cursor
pub fn collect_hits<C: SpanCursor>(cursor: C) -> Result<Vec<Hit>> {
    SpanIter::new(cursor).collect()
}
