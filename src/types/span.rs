use serde::{Deserialize, Serialize};

/// Document number within one segment
pub type DocId = tantivy::DocId;

/// Token position within a document
pub type TokenPos = u32;

/// A single match: `[start, end)` token range in a document.
///
/// The derived ordering is document, then start, then end. That is the
/// order every exposed cursor must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hit {
    pub doc: DocId,
    pub start: TokenPos,
    pub end: TokenPos,
}

impl Hit {
    pub fn new(doc: DocId, start: TokenPos, end: TokenPos) -> Self {
        debug_assert!(start <= end, "hit start {} after end {}", start, end);
        Self { doc, start, end }
    }

    pub fn length(&self) -> u32 {
        self.end - self.start
    }
}

impl From<(DocId, TokenPos, TokenPos)> for Hit {
    fn from((doc, start, end): (DocId, TokenPos, TokenPos)) -> Self {
        Hit::new(doc, start, end)
    }
}
