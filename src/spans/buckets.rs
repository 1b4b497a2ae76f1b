//! Grouping a cursor's hits into buckets.
//!
//! A bucket is a materialized run of hits from one document that share a
//! grouping key. Buckets give random access to their hits but are only
//! visited sequentially, and a bucket is only valid until the next call that
//! moves the bucketing.
//!
//! Note that `skip_to_bucket` differs from [`SpanCursor::skip_to`]: if the
//! current bucket is already in or past the target document, it does nothing.

use std::fmt;

use crate::engine::config::{OverflowPolicy, SpanLimits};
use crate::error::{Result, SpanError};
use crate::spans::{BoxedSpans, SpanCursor};
use crate::types::{DocId, Hit, SpanGuarantees};

/// Which hits share a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketKind {
    /// All hits of one document
    PerDocument,
    /// A maximal run where each hit starts where the previous one ended
    Consecutive,
    /// All hits sharing a start position (source must be start-sorted)
    PerStartPoint,
}

impl BucketKind {
    fn belongs(&self, first: &Hit, prev: &Hit, next: &Hit) -> bool {
        if next.doc != first.doc {
            return false;
        }
        match self {
            BucketKind::PerDocument => true,
            BucketKind::Consecutive => next.start == prev.end,
            BucketKind::PerStartPoint => next.start == first.start,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BucketState {
    NotStarted,
    /// Positioned on a bucket; `taken` once the hits were moved out
    InBucket { doc: DocId, taken: bool },
    Exhausted,
}

/// Bucketing wrapper around a span cursor.
///
/// Between calls, the source sits on the first hit that did not fit in the
/// current bucket (or is exhausted), so the next bucket starts there.
pub struct SpansInBuckets {
    source: BoxedSpans,
    kind: BucketKind,
    limits: SpanLimits,
    bucket: Vec<Hit>,
    state: BucketState,
}

impl SpansInBuckets {
    pub fn per_document(source: BoxedSpans, limits: SpanLimits) -> Self {
        Self::new(source, BucketKind::PerDocument, limits)
    }

    pub fn consecutive(source: BoxedSpans, limits: SpanLimits) -> Self {
        Self::new(source, BucketKind::Consecutive, limits.for_runs())
    }

    pub fn per_start_point(source: BoxedSpans, limits: SpanLimits) -> Result<Self> {
        if !source.guarantees().start_sorted {
            return Err(SpanError::Precondition(format!(
                "per-start-point buckets need a start-sorted source, got {:?}",
                source
            )));
        }
        Ok(Self::new(source, BucketKind::PerStartPoint, limits))
    }

    fn new(source: BoxedSpans, kind: BucketKind, limits: SpanLimits) -> Self {
        Self {
            source,
            kind,
            limits,
            bucket: Vec::new(),
            state: BucketState::NotStarted,
        }
    }

    pub fn kind(&self) -> BucketKind {
        self.kind
    }

    /// Document of the current bucket
    pub fn doc(&self) -> Option<DocId> {
        match self.state {
            BucketState::InBucket { doc, .. } => Some(doc),
            _ => None,
        }
    }

    /// Hits in the current bucket, in source order
    pub fn bucket(&self) -> Result<&[Hit]> {
        match self.state {
            BucketState::InBucket { taken: false, .. } => Ok(&self.bucket),
            _ => Err(SpanError::NoCurrentBucket),
        }
    }

    /// Move the current bucket's hits out. The bucket stays positioned but
    /// its contents can no longer be read.
    pub fn take_bucket(&mut self) -> Result<Vec<Hit>> {
        match self.state {
            BucketState::InBucket { doc, taken: false } => {
                self.state = BucketState::InBucket { doc, taken: true };
                Ok(std::mem::take(&mut self.bucket))
            }
            _ => Err(SpanError::NoCurrentBucket),
        }
    }

    /// Guarantees of the underlying cursor
    pub fn guarantees(&self) -> SpanGuarantees {
        self.source.guarantees()
    }

    /// Go to the next bucket, possibly in a later document
    pub fn next_bucket(&mut self) -> Result<bool> {
        match self.state {
            BucketState::Exhausted => return Ok(false),
            BucketState::NotStarted => {
                if !self.source.advance()? {
                    return self.exhaust();
                }
            }
            BucketState::InBucket { .. } => {}
        }
        self.gather()
    }

    /// Go to the first bucket in document `target` or later.
    ///
    /// Does nothing if the current bucket is already there.
    pub fn skip_to_bucket(&mut self, target: DocId) -> Result<bool> {
        match self.state {
            BucketState::Exhausted => Ok(false),
            BucketState::InBucket { doc, .. } if doc >= target => Ok(true),
            BucketState::NotStarted => {
                if !self.source.skip_to(target)? {
                    return self.exhaust();
                }
                self.gather()
            }
            BucketState::InBucket { .. } => match self.source.hit() {
                None => self.exhaust(),
                // The hit after the bucket already qualifies; a raw skip would pass it
                Some(hit) if hit.doc >= target => self.gather(),
                Some(_) => {
                    if !self.source.skip_to(target)? {
                        return self.exhaust();
                    }
                    self.gather()
                }
            },
        }
    }

    fn exhaust(&mut self) -> Result<bool> {
        self.state = BucketState::Exhausted;
        self.bucket = Vec::new();
        Ok(false)
    }

    /// Gather hits from the source's current hit until one doesn't belong
    fn gather(&mut self) -> Result<bool> {
        let Some(first) = self.source.hit() else {
            return self.exhaust();
        };
        self.bucket.clear();
        self.bucket.push(first);

        let mut prev = first;
        let mut dropped = 0usize;
        while self.source.advance()? {
            let Some(next) = self.source.hit() else {
                break;
            };
            if !self.kind.belongs(&first, &prev, &next) {
                break;
            }
            prev = next;
            if let Some(limit) = self.limits.max_bucket_hits {
                if self.bucket.len() >= limit {
                    match self.limits.overflow {
                        OverflowPolicy::Reject => {
                            return Err(SpanError::BucketTooLarge { doc: first.doc, limit });
                        }
                        OverflowPolicy::Truncate => {
                            dropped += 1;
                            continue;
                        }
                    }
                }
            }
            self.bucket.push(next);
        }

        if dropped > 0 {
            log::warn!(
                "{:?} bucket in doc {} truncated to {} hits ({} dropped)",
                self.kind,
                first.doc,
                self.bucket.len(),
                dropped
            );
        }
        log::trace!("{:?} bucket in doc {}: {} hits", self.kind, first.doc, self.bucket.len());
        self.state = BucketState::InBucket { doc: first.doc, taken: false };
        Ok(true)
    }
}

impl fmt::Debug for SpansInBuckets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpansInBuckets")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}
