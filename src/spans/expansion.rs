//! Expanding hits by a variable number of tokens to the left or right.
//!
//! Each clause hit yields one hit per expansion amount in `[min, max]`,
//! smallest first. Left expansion stops at position 0. Right expansion
//! cannot see the document length, so hits may extend past the end of
//! the document; whoever drains the cursor has to discard those.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpanError};
use crate::spans::{BoxedSpans, SpanCursor};
use crate::types::{DocId, Hit, SpanGuarantees};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpansionState {
    NotStarted,
    /// `steps_left` further single-token expansions remain for the current clause hit
    Expanding { hit: Hit, steps_left: u32 },
    Exhausted,
}

pub struct ExpansionSpans {
    clause: BoxedSpans,
    direction: Direction,
    min: u32,
    max: Option<u32>,
    state: ExpansionState,
}

impl ExpansionSpans {
    /// `max: None` is unbounded, which only left expansion supports
    pub fn new(clause: BoxedSpans, direction: Direction, min: u32, max: Option<u32>) -> Result<Self> {
        match (direction, max) {
            (_, Some(max)) if min > max => return Err(SpanError::InvalidBounds { min, max }),
            (Direction::Right, None) => {
                return Err(SpanError::Precondition(
                    "right expansion needs a finite maximum".to_string(),
                ))
            }
            _ => {}
        }
        Ok(Self {
            clause,
            direction,
            min,
            max,
            state: ExpansionState::NotStarted,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Apply the minimum expansion to the clause hit, skipping clause hits
    /// that cannot be expanded that far
    fn reset(&mut self, mut found: bool) -> Result<bool> {
        while found {
            let Some(clause_hit) = self.clause.hit() else {
                break;
            };
            match self.direction {
                Direction::Left => {
                    if clause_hit.start >= self.min {
                        let start = clause_hit.start - self.min;
                        let steps_left = match self.max {
                            Some(max) => (max - self.min).min(start),
                            None => start,
                        };
                        let hit = Hit::new(clause_hit.doc, start, clause_hit.end);
                        self.state = ExpansionState::Expanding { hit, steps_left };
                        return Ok(true);
                    }
                    log::trace!("{:?} too close to document start for left expansion by {}", clause_hit, self.min);
                }
                Direction::Right => {
                    let end = clause_hit.end.saturating_add(self.min);
                    let steps_left = self.max.map_or(0, |max| max - self.min);
                    let hit = Hit::new(clause_hit.doc, clause_hit.start, end);
                    self.state = ExpansionState::Expanding { hit, steps_left };
                    return Ok(true);
                }
            }
            found = self.clause.advance()?;
        }
        self.state = ExpansionState::Exhausted;
        Ok(false)
    }
}

impl SpanCursor for ExpansionSpans {
    fn hit(&self) -> Option<Hit> {
        match self.state {
            ExpansionState::Expanding { hit, .. } => Some(hit),
            _ => None,
        }
    }

    fn advance(&mut self) -> Result<bool> {
        match self.state {
            ExpansionState::Exhausted => Ok(false),
            ExpansionState::Expanding { mut hit, steps_left } if steps_left > 0 => {
                match self.direction {
                    Direction::Left => hit.start -= 1,
                    Direction::Right => hit.end = hit.end.saturating_add(1),
                }
                self.state = ExpansionState::Expanding { hit, steps_left: steps_left - 1 };
                Ok(true)
            }
            _ => {
                let found = self.clause.advance()?;
                self.reset(found)
            }
        }
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        match self.state {
            ExpansionState::Exhausted => Ok(false),
            ExpansionState::Expanding { hit, .. } if hit.doc >= target => self.advance(),
            _ => {
                let found = self.clause.skip_to(target)?;
                self.reset(found)
            }
        }
    }

    fn guarantees(&self) -> SpanGuarantees {
        let clause = self.clause.guarantees();
        let fixed = self.max == Some(self.min);
        let (start_sorted, end_sorted) = match self.direction {
            // Ends grow within one clause hit, starts stay put
            Direction::Right => (
                clause.start_sorted && (fixed || clause.unique_start),
                clause.end_sorted && fixed,
            ),
            // Starts shrink within one clause hit, so neither order survives
            Direction::Left => (clause.start_sorted && fixed, clause.end_sorted && fixed),
        };
        SpanGuarantees {
            start_sorted,
            end_sorted,
            unique_start: clause.unique_start && fixed,
            unique_end: clause.unique_end && fixed,
            unique: clause.hits_are_unique() && fixed,
            length: match clause.length {
                Some(len) if fixed => Some(len + self.min),
                _ => None,
            },
        }
    }
}

impl fmt::Debug for ExpansionSpans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionSpans")
            .field("direction", &self.direction)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("clause", &self.clause)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spans::{collect_hits, HitSpans};

    fn source(triples: &[(u32, u32, u32)]) -> BoxedSpans {
        Box::new(HitSpans::new(triples.iter().map(|&t| Hit::from(t)).collect()).unwrap())
    }

    fn expand(triples: &[(u32, u32, u32)], direction: Direction, min: u32, max: Option<u32>) -> Vec<(u32, u32, u32)> {
        let spans = ExpansionSpans::new(source(triples), direction, min, max).unwrap();
        collect_hits(spans)
            .unwrap()
            .into_iter()
            .map(|h| (h.doc, h.start, h.end))
            .collect()
    }

    #[test]
    fn test_left_expansion_stops_at_document_start() {
        assert_eq!(expand(&[(0, 2, 5)], Direction::Left, 2, Some(4)), vec![(0, 0, 5)]);
        assert_eq!(
            expand(&[(0, 3, 4)], Direction::Left, 1, Some(2)),
            vec![(0, 2, 4), (0, 1, 4)]
        );
    }

    #[test]
    fn test_left_expansion_skips_hits_too_close_to_start() {
        assert_eq!(
            expand(&[(0, 1, 2), (0, 4, 5), (1, 0, 1)], Direction::Left, 2, Some(2)),
            vec![(0, 2, 5)]
        );
    }

    #[test]
    fn test_unbounded_left_expansion_reaches_position_zero() {
        assert_eq!(
            expand(&[(0, 2, 3)], Direction::Left, 0, None),
            vec![(0, 2, 3), (0, 1, 3), (0, 0, 3)]
        );
    }

    #[test]
    fn test_right_expansion_never_drops_hits() {
        assert_eq!(
            expand(&[(0, 8, 9), (2, 0, 1)], Direction::Right, 1, Some(3)),
            vec![(0, 8, 10), (0, 8, 11), (0, 8, 12), (2, 0, 2), (2, 0, 3), (2, 0, 4)]
        );
    }

    #[test]
    fn test_zero_expansion_keeps_hit() {
        assert_eq!(expand(&[(0, 3, 4)], Direction::Right, 0, Some(0)), vec![(0, 3, 4)]);
    }

    #[test]
    fn test_skip_to() {
        let mut spans =
            ExpansionSpans::new(source(&[(0, 1, 2), (3, 1, 2), (5, 0, 1)]), Direction::Right, 0, Some(1)).unwrap();
        assert!(spans.skip_to(2).unwrap());
        assert_eq!(spans.hit(), Some(Hit::new(3, 1, 2)));
        assert!(spans.skip_to(3).unwrap());
        assert_eq!(spans.hit(), Some(Hit::new(3, 1, 3)));
        assert!(spans.skip_to(3).unwrap());
        assert_eq!(spans.hit(), Some(Hit::new(5, 0, 1)));
    }

    #[test]
    fn test_construction_errors() {
        let err = ExpansionSpans::new(source(&[]), Direction::Left, 3, Some(1)).unwrap_err();
        assert!(matches!(err, SpanError::InvalidBounds { min: 3, max: 1 }));
        let err = ExpansionSpans::new(source(&[]), Direction::Right, 1, None).unwrap_err();
        assert!(matches!(err, SpanError::Precondition(_)));
    }

    #[test]
    fn test_guarantees_depend_on_direction() {
        let right = ExpansionSpans::new(source(&[]), Direction::Right, 1, Some(3)).unwrap();
        let g = right.guarantees();
        assert!(g.start_sorted && !g.end_sorted && !g.unique);
        assert_eq!(g.length, None);

        let left = ExpansionSpans::new(source(&[]), Direction::Left, 2, Some(2)).unwrap();
        let g = left.guarantees();
        assert!(g.start_sorted && g.end_sorted && g.unique);
        assert_eq!(g.length, Some(3));
    }

    #[test]
    fn test_left_expansion_is_not_end_sorted() {
        let left = ExpansionSpans::new(source(&[(0, 3, 4)]), Direction::Left, 1, Some(2)).unwrap();
        assert!(!left.guarantees().end_sorted);
        assert!(!left.guarantees().start_sorted);

        // Same end, starts decreasing: (end, start) order does not hold
        let hits = collect_hits(left).unwrap();
        assert_eq!(hits, vec![Hit::new(0, 2, 4), Hit::new(0, 1, 4)]);
        assert!(hits[0].start > hits[1].start);
    }
}
