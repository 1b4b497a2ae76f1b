//! Single-token hits read from a term's positional postings.

use std::fmt;

use tantivy::fastfield::AliveBitSet;
use tantivy::postings::{Postings, SegmentPostings};
use tantivy::{DocSet, TERMINATED};

use crate::error::Result;
use crate::spans::SpanCursor;
use crate::types::{DocId, Hit, SpanGuarantees};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostingsState {
    /// Postings sit on their first document, positions not loaded yet
    NotStarted,
    InDoc(DocId),
    Exhausted,
}

/// Cursor over every occurrence of one term in a segment.
///
/// Each position `p` becomes the hit `(doc, p, p + 1)`. Deleted documents
/// are skipped. The postings stay on the current document until its
/// positions are used up.
pub struct PostingsSpans {
    postings: SegmentPostings,
    alive: Option<AliveBitSet>,
    positions: Vec<u32>,
    index: usize,
    state: PostingsState,
}

impl PostingsSpans {
    pub fn new(postings: SegmentPostings, alive: Option<AliveBitSet>) -> Self {
        Self {
            postings,
            alive,
            positions: Vec::with_capacity(16),
            index: 0,
            state: PostingsState::NotStarted,
        }
    }

    /// Load positions of the postings' current document, moving past
    /// deleted documents
    fn load_current(&mut self) -> Result<bool> {
        loop {
            let doc = self.postings.doc();
            if doc == TERMINATED {
                self.state = PostingsState::Exhausted;
                self.positions.clear();
                return Ok(false);
            }
            let deleted = self.alive.as_ref().is_some_and(|alive| alive.is_deleted(doc));
            if !deleted {
                self.postings.positions(&mut self.positions);
                if !self.positions.is_empty() {
                    self.index = 0;
                    self.state = PostingsState::InDoc(doc);
                    return Ok(true);
                }
            }
            self.postings.advance();
        }
    }
}

impl SpanCursor for PostingsSpans {
    fn hit(&self) -> Option<Hit> {
        match self.state {
            PostingsState::InDoc(doc) => self.positions.get(self.index).map(|&p| Hit::new(doc, p, p + 1)),
            _ => None,
        }
    }

    fn advance(&mut self) -> Result<bool> {
        match self.state {
            PostingsState::Exhausted => Ok(false),
            PostingsState::NotStarted => self.load_current(),
            PostingsState::InDoc(_) => {
                if self.index + 1 < self.positions.len() {
                    self.index += 1;
                    return Ok(true);
                }
                self.postings.advance();
                self.load_current()
            }
        }
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        match self.state {
            PostingsState::Exhausted => Ok(false),
            PostingsState::InDoc(doc) if doc >= target => self.advance(),
            PostingsState::NotStarted | PostingsState::InDoc(_) => {
                if self.postings.doc() < target {
                    self.postings.seek(target);
                }
                self.load_current()
            }
        }
    }

    fn guarantees(&self) -> SpanGuarantees {
        SpanGuarantees::TERM
    }
}

impl fmt::Debug for PostingsSpans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostingsSpans")
            .field("state", &self.state)
            .field("doc_freq", &self.postings.doc_freq())
            .finish()
    }
}
