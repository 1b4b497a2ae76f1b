use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, SpanError};
use crate::spans::BoxedSpans;

/// Provides single-token hit cursors for the values of one annotation
pub trait TermSource: fmt::Debug {
    /// Cursor over every token whose annotation equals `value`.
    /// Unknown values give an empty cursor, not an error.
    fn term_spans(&self, value: &str) -> Result<BoxedSpans>;
}

/// Maps annotation names (word, lemma, pos, ...) to the source serving them.
///
/// Built once per searcher and passed by reference into assembly.
#[derive(Debug, Default)]
pub struct SourceRegistry<'a> {
    sources: HashMap<String, Box<dyn TermSource + 'a>>,
}

impl<'a> SourceRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source, replacing any previous one for the same annotation
    pub fn register(&mut self, annotation: impl Into<String>, source: impl TermSource + 'a) {
        self.sources.insert(annotation.into(), Box::new(source));
    }

    pub fn get(&self, annotation: &str) -> Option<&dyn TermSource> {
        self.sources.get(annotation).map(|s| s.as_ref() as &dyn TermSource)
    }

    pub fn contains(&self, annotation: &str) -> bool {
        self.sources.contains_key(annotation)
    }

    pub fn annotations(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn term_spans(&self, annotation: &str, value: &str) -> Result<BoxedSpans> {
        match self.sources.get(annotation) {
            Some(source) => source.term_spans(value),
            None => Err(SpanError::UnknownAnnotation(annotation.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spans::{collect_hits, HitSpans};
    use crate::types::Hit;

    #[derive(Debug)]
    struct Fixed(Vec<Hit>);

    impl TermSource for Fixed {
        fn term_spans(&self, value: &str) -> Result<BoxedSpans> {
            let hits = if value == "x" { self.0.clone() } else { Vec::new() };
            Ok(Box::new(HitSpans::new(hits)?))
        }
    }

    #[test]
    fn test_lookup_by_annotation() {
        let mut registry = SourceRegistry::new();
        registry.register("word", Fixed(vec![Hit::new(0, 1, 2)]));
        assert!(registry.contains("word"));
        assert_eq!(collect_hits(registry.term_spans("word", "x").unwrap()).unwrap(), vec![Hit::new(0, 1, 2)]);
        assert!(collect_hits(registry.term_spans("word", "y").unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_annotation() {
        let registry = SourceRegistry::new();
        let err = registry.term_spans("lemma", "be").unwrap_err();
        assert!(matches!(err, SpanError::UnknownAnnotation(name) if name == "lemma"));
    }
}
