//! In-memory annotated corpus.
//!
//! Each added token sequence becomes one document, numbered in insertion
//! order. Every annotation keeps a hit list per value, which is exactly what
//! positional postings would give for a single-token term.

use std::collections::HashMap;

use crate::data::Document;
use crate::engine::config::SpanLimits;
use crate::error::{Result, SpanError};
use crate::query::{SourceRegistry, SpanAssembler, SpanPattern, TermSource};
use crate::spans::{BoxedSpans, HitSpans, SpanIter};
use crate::types::{DocId, Hit, SpanGuarantees, TokenPos};

/// Hit lists of one annotation, keyed by value
#[derive(Debug, Clone, Default)]
pub struct MemoryAnnotation {
    postings: HashMap<String, Vec<Hit>>,
}

impl MemoryAnnotation {
    fn add(&mut self, doc: DocId, values: &[String]) {
        for (position, value) in values.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let position = position as TokenPos;
            self.postings
                .entry(value.clone())
                .or_default()
                .push(Hit::new(doc, position, position + 1));
        }
    }

    /// Number of distinct values
    pub fn num_values(&self) -> usize {
        self.postings.len()
    }
}

impl TermSource for &MemoryAnnotation {
    fn term_spans(&self, value: &str) -> Result<BoxedSpans> {
        let hits = self.postings.get(value).cloned().unwrap_or_default();
        Ok(Box::new(HitSpans::with_guarantees(hits, SpanGuarantees::TERM)?))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnotatedCorpus {
    annotations: HashMap<String, MemoryAnnotation>,
    /// Token count per document
    lengths: Vec<TokenPos>,
    limits: SpanLimits,
}

impl AnnotatedCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SpanLimits) -> Self {
        Self { limits, ..Self::default() }
    }

    /// Add one document given as `(annotation, values)` pairs, one value per
    /// token. Its length is that of the longest annotation.
    pub fn add_document<I, S>(&mut self, annotations: I) -> DocId
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: Into<String>,
    {
        let doc = self.lengths.len() as DocId;
        let mut length = 0;
        for (name, values) in annotations {
            length = length.max(values.len() as TokenPos);
            self.annotations.entry(name.into()).or_default().add(doc, &values);
        }
        self.lengths.push(length);
        doc
    }

    /// Add whitespace separated words as a document with a `word` annotation
    pub fn add_text(&mut self, text: &str) -> DocId {
        let words = text.split_whitespace().map(str::to_string).collect();
        self.add_document([("word", words)])
    }

    /// Add every sentence of a parsed document as its own corpus document
    pub fn add_sentences(&mut self, document: &Document) -> Vec<DocId> {
        document
            .sentences
            .iter()
            .map(|sentence| {
                let doc = self.add_document(
                    sentence
                        .annotation_names()
                        .filter_map(|name| sentence.tokens(name).map(|tokens| (name, tokens.to_vec())))
                        .collect::<Vec<_>>(),
                );
                // numTokens wins over the annotation lengths
                self.lengths[doc as usize] = sentence.num_tokens;
                doc
            })
            .collect()
    }

    pub fn num_docs(&self) -> usize {
        self.lengths.len()
    }

    pub fn doc_length(&self, doc: DocId) -> Option<TokenPos> {
        self.lengths.get(doc as usize).copied()
    }

    pub fn annotation(&self, name: &str) -> Option<&MemoryAnnotation> {
        self.annotations.get(name)
    }

    /// Registry serving every annotation of the corpus
    pub fn registry(&self) -> SourceRegistry<'_> {
        let mut registry = SourceRegistry::new();
        for (name, annotation) in &self.annotations {
            registry.register(name.clone(), annotation);
        }
        registry
    }

    /// Every hit of the pattern in document, start, end order. Hits reaching
    /// past the end of their document are dropped.
    pub fn search(&self, pattern: &SpanPattern) -> Result<Vec<Hit>> {
        let registry = self.registry();
        let spans = SpanAssembler::new(&registry, self.limits).assemble(pattern)?;
        let mut hits = Vec::new();
        for hit in SpanIter::new(spans) {
            let hit = hit?;
            let length = self
                .doc_length(hit.doc)
                .ok_or_else(|| SpanError::Precondition(format!("hit in unknown document {}", hit.doc)))?;
            if hit.end <= length {
                hits.push(hit);
            }
        }
        log::debug!("{} matched {} hit(s) in {} document(s)", pattern, hits.len(), self.num_docs());
        Ok(hits)
    }
}
