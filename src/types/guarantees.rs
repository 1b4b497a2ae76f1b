//! Ordering and uniqueness promises a cursor makes about its hits.
//!
//! Assembly consults these to decide where per-document sorting is needed
//! and when the cheaper simple sequence can be used.

/// What a cursor promises about the hits it produces within one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpanGuarantees {
    /// Sorted by start, then end
    pub start_sorted: bool,
    /// Sorted by end, then start
    pub end_sorted: bool,
    /// No two hits share a start position
    pub unique_start: bool,
    /// No two hits share an end position
    pub unique_end: bool,
    /// No duplicate hits
    pub unique: bool,
    /// Every hit has exactly this length
    pub length: Option<u32>,
}

impl SpanGuarantees {
    /// No promises at all
    pub const NONE: SpanGuarantees = SpanGuarantees {
        start_sorted: false,
        end_sorted: false,
        unique_start: false,
        unique_end: false,
        unique: false,
        length: None,
    };

    /// Single-token term postings: every order holds and every hit is unique
    pub const TERM: SpanGuarantees = SpanGuarantees {
        start_sorted: true,
        end_sorted: true,
        unique_start: true,
        unique_end: true,
        unique: true,
        length: Some(1),
    };

    /// Start-sorted and duplicate free, nothing else
    pub const SORTED_UNIQUE: SpanGuarantees = SpanGuarantees {
        start_sorted: true,
        end_sorted: false,
        unique_start: false,
        unique_end: false,
        unique: true,
        length: None,
    };

    pub fn all_same_length(&self) -> bool {
        self.length.is_some()
    }

    /// Hits are unique if they are explicitly so, or if either endpoint is unique
    pub fn hits_are_unique(&self) -> bool {
        self.unique || self.unique_start || self.unique_end
    }

    /// Guarantees after a per-document sort on start points
    pub fn sorted_by_start(self, deduplicated: bool) -> Self {
        let unique = self.hits_are_unique() || deduplicated;
        Self {
            start_sorted: true,
            end_sorted: self.all_same_length(),
            unique,
            ..self
        }
    }

    /// Guarantees after a per-document sort on end points
    pub fn sorted_by_end(self, deduplicated: bool) -> Self {
        let unique = self.hits_are_unique() || deduplicated;
        Self {
            start_sorted: self.all_same_length(),
            end_sorted: true,
            unique,
            ..self
        }
    }
}
