//! Drops repeated hits from an already sorted cursor without buffering.

use crate::error::{Result, SpanError};
use crate::spans::{BoxedSpans, SpanCursor};
use crate::types::{DocId, Hit, SpanGuarantees};

#[derive(Debug)]
pub struct UniqueSpans {
    source: BoxedSpans,
    previous: Option<Hit>,
}

impl UniqueSpans {
    /// The source must be sorted (by start or by end) so duplicates are adjacent
    pub fn new(source: BoxedSpans) -> Result<Self> {
        let g = source.guarantees();
        if !g.start_sorted && !g.end_sorted {
            return Err(SpanError::Precondition(format!(
                "unique filter needs a sorted source, got {:?}",
                source
            )));
        }
        Ok(Self { source, previous: None })
    }

    /// Move past hits equal to the one last returned
    fn skip_repeats(&mut self, mut found: bool) -> Result<bool> {
        while found {
            let hit = self.source.hit();
            if hit != self.previous {
                self.previous = hit;
                return Ok(true);
            }
            found = self.source.advance()?;
        }
        self.previous = None;
        Ok(false)
    }
}

impl SpanCursor for UniqueSpans {
    fn hit(&self) -> Option<Hit> {
        self.source.hit()
    }

    fn advance(&mut self) -> Result<bool> {
        let found = self.source.advance()?;
        self.skip_repeats(found)
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        let found = self.source.skip_to(target)?;
        self.skip_repeats(found)
    }

    fn guarantees(&self) -> SpanGuarantees {
        SpanGuarantees { unique: true, ..self.source.guarantees() }
    }
}
