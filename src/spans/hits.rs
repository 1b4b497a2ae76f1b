//! Cursor over a materialized list of hits.
//!
//! This is the in-memory counterpart of a term's postings: the corpus keeps
//! one hit list per annotation value and hands out these cursors. Tests use
//! it to feed combinators hand-written inputs, including unsorted ones.

use std::collections::HashSet;

use crate::error::{Result, SpanError};
use crate::spans::SpanCursor;
use crate::types::{DocId, Hit, SpanGuarantees};

#[derive(Debug, Clone)]
pub struct HitSpans {
    hits: Vec<Hit>,
    /// Index of the current hit; `None` before the first advance
    index: Option<usize>,
    guarantees: SpanGuarantees,
}

impl HitSpans {
    /// Wrap a hit list. Documents must be non-decreasing; the order within a
    /// document is free and the guarantees are derived from the data.
    pub fn new(hits: Vec<Hit>) -> Result<Self> {
        if let Some(pair) = hits.windows(2).find(|w| w[1].doc < w[0].doc) {
            return Err(SpanError::UnsortedInput(format!(
                "document {} follows document {}",
                pair[1].doc, pair[0].doc
            )));
        }
        let guarantees = inspect(&hits);
        Ok(Self { hits, index: None, guarantees })
    }

    /// Wrap a hit list with explicitly declared guarantees.
    ///
    /// The declaration is trusted; callers use this to make a cursor promise
    /// less than its data happens to satisfy.
    pub fn with_guarantees(hits: Vec<Hit>, guarantees: SpanGuarantees) -> Result<Self> {
        let mut spans = Self::new(hits)?;
        spans.guarantees = guarantees;
        Ok(spans)
    }

    pub fn empty() -> Self {
        Self { hits: Vec::new(), index: None, guarantees: SpanGuarantees::TERM }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    fn next_index(&self) -> usize {
        self.index.map_or(0, |i| i + 1)
    }
}

impl SpanCursor for HitSpans {
    fn hit(&self) -> Option<Hit> {
        self.index.and_then(|i| self.hits.get(i).copied())
    }

    fn advance(&mut self) -> Result<bool> {
        let next = self.next_index().min(self.hits.len());
        self.index = Some(next);
        Ok(next < self.hits.len())
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        if matches!(self.hit(), Some(hit) if hit.doc >= target) {
            return self.advance();
        }
        let from = self.next_index().min(self.hits.len());
        let offset = self.hits[from..].partition_point(|hit| hit.doc < target);
        self.index = Some(from + offset);
        Ok(from + offset < self.hits.len())
    }

    fn guarantees(&self) -> SpanGuarantees {
        self.guarantees
    }
}

fn inspect(hits: &[Hit]) -> SpanGuarantees {
    let same_doc = |w: &[Hit]| w[0].doc == w[1].doc;
    let start_sorted = hits
        .windows(2)
        .all(|w| !same_doc(w) || (w[0].start, w[0].end) <= (w[1].start, w[1].end));
    let end_sorted = hits
        .windows(2)
        .all(|w| !same_doc(w) || (w[0].end, w[0].start) <= (w[1].end, w[1].start));

    let mut starts = HashSet::with_capacity(hits.len());
    let mut ends = HashSet::with_capacity(hits.len());
    let mut seen = HashSet::with_capacity(hits.len());
    let mut unique_start = true;
    let mut unique_end = true;
    let mut unique = true;
    for hit in hits {
        unique_start &= starts.insert((hit.doc, hit.start));
        unique_end &= ends.insert((hit.doc, hit.end));
        unique &= seen.insert(*hit);
    }

    let length = match hits.first() {
        Some(first) if hits.iter().all(|h| h.length() == first.length()) => Some(first.length()),
        Some(_) => None,
        // An empty stream satisfies any length promise; single-token is the common case
        None => Some(1),
    };

    SpanGuarantees { start_sorted, end_sorted, unique_start, unique_end, unique, length }
}
