use serde::{Deserialize, Serialize};
use tantivy::DocAddress;

use crate::types::TokenPos;

/// One match within a sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanMatch {
    pub start: TokenPos,
    /// Exclusive
    pub end: TokenPos,
    /// Matched tokens of the default annotation, space separated
    pub text: String,
}

/// All matches found in one indexed sentence, in start order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceMatches {
    pub doc_address: DocAddress,
    /// Id of the document the sentence came from
    pub document_id: String,
    /// Index of the sentence within its document
    pub sentence_id: u64,
    /// Sentence tokens of the default annotation
    pub tokens: Vec<String>,
    pub matches: Vec<SpanMatch>,
}

impl SentenceMatches {
    pub fn new(doc_address: DocAddress, document_id: String, sentence_id: u64, tokens: Vec<String>) -> Self {
        Self {
            doc_address,
            document_id,
            sentence_id,
            tokens,
            matches: Vec::new(),
        }
    }

    pub fn sentence_text(&self) -> String {
        self.tokens.join(" ")
    }

    /// Text covered by `start..end`, or `None` if the range is outside the sentence
    pub fn match_text(&self, start: TokenPos, end: TokenPos) -> Option<String> {
        let (start, end) = (start as usize, end as usize);
        if start <= end && end <= self.tokens.len() {
            Some(self.tokens[start..end].join(" "))
        } else {
            None
        }
    }

    /// Record a match; returns false if it lies outside the sentence
    pub fn add_match(&mut self, start: TokenPos, end: TokenPos) -> bool {
        match self.match_text(start, end) {
            Some(text) => {
                self.matches.push(SpanMatch { start, end, text });
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanResults {
    /// Number of matches found, including those beyond the result limit
    pub total_hits: usize,
    pub sentences: Vec<SentenceMatches>,
}

impl SpanResults {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of matches returned
    pub fn len(&self) -> usize {
        self.sentences.iter().map(|s| s.matches.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    /// Short concordance-style listing
    pub fn summary(&self) -> String {
        let mut summary = format!("Total hits: {} ({} shown)\n", self.total_hits, self.len());
        for sentence in &self.sentences {
            summary.push_str(&format!(
                "{} #{}: {}\n",
                sentence.document_id,
                sentence.sentence_id,
                sentence.sentence_text()
            ));
            for m in &sentence.matches {
                summary.push_str(&format!("    [{}, {}) {}\n", m.start, m.end, m.text));
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence() -> SentenceMatches {
        let tokens = ["the", "cat", "sat"].iter().map(|s| s.to_string()).collect();
        SentenceMatches::new(DocAddress::new(0, 4), "doc1".to_string(), 2, tokens)
    }

    #[test]
    fn test_match_text() {
        let s = sentence();
        assert_eq!(s.match_text(1, 3).as_deref(), Some("cat sat"));
        assert_eq!(s.match_text(3, 3).as_deref(), Some(""));
        assert_eq!(s.match_text(2, 4), None);
    }

    #[test]
    fn test_add_match_rejects_out_of_range() {
        let mut s = sentence();
        assert!(s.add_match(0, 2));
        assert!(!s.add_match(2, 5));
        assert_eq!(s.matches.len(), 1);

        let results = SpanResults { total_hits: 2, sentences: vec![s] };
        assert_eq!(results.len(), 1);
        assert!(results.summary().contains("[0, 2) the cat"));
    }
}
