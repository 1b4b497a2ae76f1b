use serde::{Deserialize, Serialize};
use std::fmt;

use crate::spans::Direction;

/// Compiled pattern tree, as handed over by a query compiler.
///
/// Serialized as JSON with a `type` tag, e.g.
/// `{"type": "term", "annotation": "lemma", "value": "be"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpanPattern {
    /// Single tokens whose annotation has this value
    Term { annotation: String, value: String },
    /// Clauses matched back to back, left to right
    Sequence { clauses: Vec<SpanPattern> },
    /// `min..=max` consecutive matches of a clause; no `max` means unbounded
    Repetition {
        clause: Box<SpanPattern>,
        min: u32,
        #[serde(default)]
        max: Option<u32>,
    },
    /// A clause with `min..=max` arbitrary tokens added on one side
    Expansion {
        clause: Box<SpanPattern>,
        direction: Direction,
        min: u32,
        #[serde(default)]
        max: Option<u32>,
    },
}

impl SpanPattern {
    pub fn term(annotation: impl Into<String>, value: impl Into<String>) -> Self {
        SpanPattern::Term { annotation: annotation.into(), value: value.into() }
    }

    pub fn sequence(clauses: Vec<SpanPattern>) -> Self {
        SpanPattern::Sequence { clauses }
    }

    pub fn repetition(clause: SpanPattern, min: u32, max: Option<u32>) -> Self {
        SpanPattern::Repetition { clause: Box::new(clause), min, max }
    }

    pub fn expansion(clause: SpanPattern, direction: Direction, min: u32, max: Option<u32>) -> Self {
        SpanPattern::Expansion { clause: Box::new(clause), direction, min, max }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Annotation names referenced anywhere in the tree, in first-use order
    pub fn annotations(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_annotations(&mut names);
        names
    }

    fn collect_annotations<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            SpanPattern::Term { annotation, .. } => {
                if !names.contains(&annotation.as_str()) {
                    names.push(annotation);
                }
            }
            SpanPattern::Sequence { clauses } => {
                for clause in clauses {
                    clause.collect_annotations(names);
                }
            }
            SpanPattern::Repetition { clause, .. } | SpanPattern::Expansion { clause, .. } => {
                clause.collect_annotations(names);
            }
        }
    }
}

fn fmt_bounds(f: &mut fmt::Formatter<'_>, min: u32, max: Option<u32>) -> fmt::Result {
    match max {
        Some(max) if max == min => write!(f, "{{{}}}", min),
        Some(max) => write!(f, "{{{},{}}}", min, max),
        None => write!(f, "{{{},}}", min),
    }
}

/// Corpus-query-like rendering, for logs
impl fmt::Display for SpanPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanPattern::Term { annotation, value } => write!(f, "[{}=\"{}\"]", annotation, value),
            SpanPattern::Sequence { clauses } => {
                write!(f, "(")?;
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", clause)?;
                }
                write!(f, ")")
            }
            SpanPattern::Repetition { clause, min, max } => {
                write!(f, "{}", clause)?;
                fmt_bounds(f, *min, *max)
            }
            SpanPattern::Expansion { clause, direction, min, max } => {
                if *direction == Direction::Left {
                    write!(f, "[]")?;
                    fmt_bounds(f, *min, *max)?;
                    write!(f, " {}", clause)
                } else {
                    write!(f, "{} []", clause)?;
                    fmt_bounds(f, *min, *max)
                }
            }
        }
    }
}
