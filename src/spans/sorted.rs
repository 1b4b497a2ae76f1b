//! Per-document sort and duplicate elimination.
//!
//! Buffers every hit of one document, sorts the buffer and hands the hits
//! back out through the cursor contract. This is the only place whole
//! documents are held in memory, so its bucket size is what `SpanLimits`
//! caps.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::engine::config::SpanLimits;
use crate::error::Result;
use crate::spans::{BoxedSpans, SpanCursor, SpansInBuckets};
use crate::types::{DocId, Hit, SpanGuarantees};

pub type HitComparator = Arc<dyn Fn(&Hit, &Hit) -> Ordering + Send + Sync>;

/// Order applied within each document
#[derive(Clone)]
pub enum HitOrder {
    /// Start, then end
    StartPoint,
    /// End, then start
    EndPoint,
    /// Caller supplied, e.g. ordering by another annotation's term
    Custom(HitComparator),
}

impl HitOrder {
    pub fn custom<F>(compare: F) -> Self
    where
        F: Fn(&Hit, &Hit) -> Ordering + Send + Sync + 'static,
    {
        HitOrder::Custom(Arc::new(compare))
    }

    pub fn compare(&self, a: &Hit, b: &Hit) -> Ordering {
        match self {
            HitOrder::StartPoint => (a.start, a.end).cmp(&(b.start, b.end)),
            HitOrder::EndPoint => (a.end, a.start).cmp(&(b.end, b.start)),
            HitOrder::Custom(compare) => compare(a, b),
        }
    }

    fn apply(&self, guarantees: SpanGuarantees, deduplicated: bool) -> SpanGuarantees {
        match self {
            HitOrder::StartPoint => guarantees.sorted_by_start(deduplicated),
            HitOrder::EndPoint => guarantees.sorted_by_end(deduplicated),
            HitOrder::Custom(_) => SpanGuarantees {
                unique: guarantees.hits_are_unique() || deduplicated,
                length: guarantees.length,
                ..SpanGuarantees::NONE
            },
        }
    }
}

impl fmt::Debug for HitOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HitOrder::StartPoint => write!(f, "StartPoint"),
            HitOrder::EndPoint => write!(f, "EndPoint"),
            HitOrder::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

pub struct PerDocumentSortedSpans {
    buckets: SpansInBuckets,
    order: HitOrder,
    eliminate_duplicates: bool,
    /// Sorted hits of the current document
    hits: Vec<Hit>,
    position: Option<usize>,
    exhausted: bool,
}

impl PerDocumentSortedSpans {
    pub fn new(source: BoxedSpans, order: HitOrder, eliminate_duplicates: bool, limits: SpanLimits) -> Self {
        Self {
            buckets: SpansInBuckets::per_document(source, limits),
            order,
            eliminate_duplicates,
            hits: Vec::new(),
            position: None,
            exhausted: false,
        }
    }

    /// Sort by start then end, dropping duplicates
    pub fn start_sorted_unique(source: BoxedSpans, limits: SpanLimits) -> Self {
        Self::new(source, HitOrder::StartPoint, true, limits)
    }

    /// Sort by end then start
    pub fn end_sorted(source: BoxedSpans, eliminate_duplicates: bool, limits: SpanLimits) -> Self {
        Self::new(source, HitOrder::EndPoint, eliminate_duplicates, limits)
    }

    /// Take ownership of the bucket just gathered and sort it.
    /// Exact duplicates compare equal under the tie-break, so they end up adjacent.
    fn load_bucket(&mut self) -> Result<bool> {
        let mut hits = self.buckets.take_bucket()?;
        let order = &self.order;
        hits.sort_by(|a, b| order.compare(a, b).then_with(|| a.cmp(b)));
        if self.eliminate_duplicates {
            hits.dedup();
        }
        self.hits = hits;
        self.position = Some(0);
        Ok(true)
    }

    fn exhaust(&mut self) -> Result<bool> {
        self.exhausted = true;
        self.hits = Vec::new();
        self.position = None;
        Ok(false)
    }
}

impl SpanCursor for PerDocumentSortedSpans {
    fn hit(&self) -> Option<Hit> {
        self.position.and_then(|i| self.hits.get(i).copied())
    }

    fn advance(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if let Some(i) = self.position {
            if i + 1 < self.hits.len() {
                self.position = Some(i + 1);
                return Ok(true);
            }
        }
        if self.buckets.next_bucket()? {
            self.load_bucket()
        } else {
            self.exhaust()
        }
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if matches!(self.hit(), Some(hit) if hit.doc >= target) {
            return self.advance();
        }
        // The current bucket (if any) is behind the target, so this is a real skip
        if self.buckets.skip_to_bucket(target)? {
            self.load_bucket()
        } else {
            self.exhaust()
        }
    }

    fn guarantees(&self) -> SpanGuarantees {
        self.order.apply(self.buckets.guarantees(), self.eliminate_duplicates)
    }
}

impl fmt::Debug for PerDocumentSortedSpans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerDocumentSortedSpans")
            .field("order", &self.order)
            .field("eliminate_duplicates", &self.eliminate_duplicates)
            .field("buckets", &self.buckets)
            .finish()
    }
}
