//! Minimum-cost partial assignment between two feature sequences.
//!
//! Each slot of the shorter sequence picks one of its nearest candidates in the longer
//! sequence. When a pick collides with an earlier slot, the earlier slot is unassigned
//! and the search carries on, so every complete assignment is one-to-one. With a single
//! candidate per slot the enumeration yields exactly one assignment; wider candidate
//! lists multiply the leaves, which is why the search runs under a step budget.

use serde::Serialize;
use tracing::debug;

use crate::core::feature::FeatureSequence;
use crate::matching::normalize::normalize;
use crate::matching::scoring::{count_to_f64, CostMatrix, MatchScore, MISSING_MATCH_PENALTY};
use crate::matching::MatchError;

/// Candidates considered per shorter-sequence slot
pub const N_NEIGHBORS: usize = 1;

/// Default cap on slot placements for one comparison
pub const DEFAULT_MAX_SEARCH_STEPS: usize = 1 << 20;

/// One complete assignment: for each shorter-sequence slot, the longer-sequence index
/// it is paired with, or `None` when unassigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub slots: Vec<Option<usize>>,
}

impl Assignment {
    /// Number of slots paired with a longer-sequence feature
    #[must_use]
    pub fn assigned(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Total cost under `costs`, including penalties for both kinds of missing matches
    #[must_use]
    pub fn cost(&self, costs: &CostMatrix) -> f64 {
        let slot_cost: f64 = self
            .slots
            .iter()
            .enumerate()
            .map(|(row, slot)| match slot {
                Some(col) => costs.get(row, *col),
                None => MISSING_MATCH_PENALTY,
            })
            .sum();
        let unused = costs.cols().saturating_sub(self.assigned());
        slot_cost + count_to_f64(unused) * MISSING_MATCH_PENALTY
    }
}

/// One filled slot on the enumeration stack
#[derive(Debug)]
struct Frame {
    /// Position within this slot's candidate list
    choice: usize,
    /// Earlier slot unassigned by this placement
    displaced: Option<usize>,
}

/// Lazy depth-first enumeration of complete assignments.
///
/// Not restartable: once exhausted it keeps returning `None`.
#[derive(Debug)]
pub struct Assignments<'a> {
    candidates: &'a [Vec<usize>],
    prefix: Vec<Option<usize>>,
    frames: Vec<Frame>,
    started: bool,
    exhausted: bool,
    steps: usize,
}

impl<'a> Assignments<'a> {
    /// Enumerate over per-slot candidate lists; every list must be non-empty
    #[must_use]
    pub fn new(candidates: &'a [Vec<usize>]) -> Self {
        Self {
            candidates,
            prefix: Vec::with_capacity(candidates.len()),
            frames: Vec::with_capacity(candidates.len()),
            started: false,
            exhausted: false,
            steps: 0,
        }
    }

    /// Slot placements performed so far
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn place(&mut self, slot: usize, choice: usize) {
        let col = self.candidates[slot][choice];
        let displaced = self.prefix.iter().position(|&p| p == Some(col));
        if let Some(earlier) = displaced {
            self.prefix[earlier] = None;
        }
        self.prefix.push(Some(col));
        self.frames.push(Frame { choice, displaced });
        self.steps += 1;
    }

    fn pop(&mut self) -> Option<usize> {
        let frame = self.frames.pop()?;
        let col = self.prefix.pop().flatten();
        if let Some(earlier) = frame.displaced {
            self.prefix[earlier] = col;
        }
        Some(frame.choice)
    }

    /// Fill the remaining slots with their first candidate
    fn descend(&mut self) -> bool {
        while self.prefix.len() < self.candidates.len() {
            let slot = self.prefix.len();
            if self.candidates[slot].is_empty() {
                return false;
            }
            self.place(slot, 0);
        }
        true
    }

    /// Move the deepest slot that still has untried candidates to its next one
    fn backtrack(&mut self) -> bool {
        while let Some(choice) = self.pop() {
            let slot = self.prefix.len();
            if choice + 1 < self.candidates[slot].len() {
                self.place(slot, choice + 1);
                return true;
            }
        }
        false
    }
}

impl Iterator for Assignments<'_> {
    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        if self.exhausted {
            return None;
        }

        let advanced = if self.started {
            self.backtrack()
        } else {
            self.started = true;
            true
        };

        if advanced && self.descend() {
            Some(Assignment {
                slots: self.prefix.clone(),
            })
        } else {
            self.exhausted = true;
            None
        }
    }
}

/// Best assignment found for a pair of sequences
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub score: MatchScore,
    pub assignment: Assignment,
}

/// Backtracking search over nearest-neighbor assignments
#[derive(Debug, Clone, Copy)]
pub struct AssignmentSearch {
    neighbors: usize,
    max_steps: usize,
}

impl Default for AssignmentSearch {
    fn default() -> Self {
        Self {
            neighbors: N_NEIGHBORS,
            max_steps: DEFAULT_MAX_SEARCH_STEPS,
        }
    }
}

impl AssignmentSearch {
    /// `neighbors` is clamped to at least one candidate per slot
    #[must_use]
    pub fn new(neighbors: usize, max_steps: usize) -> Self {
        Self {
            neighbors: neighbors.max(1),
            max_steps,
        }
    }

    /// Score `first` against `second`.
    ///
    /// The shorter input always becomes the rows of the cost matrix; when `first` is
    /// longer the inputs are swapped. Each side is normalized on its own.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::SearchBudgetExceeded` if the enumeration needs more than
    /// the configured number of slot placements.
    pub fn compare(
        &self,
        first: &FeatureSequence,
        second: &FeatureSequence,
    ) -> Result<SearchOutcome, MatchError> {
        let swapped = first.len() > second.len();
        let (shorter, longer) = if swapped {
            (second, first)
        } else {
            (first, second)
        };

        if shorter.is_empty() {
            return Ok(SearchOutcome {
                score: MatchScore::empty(longer.len(), swapped),
                assignment: Assignment { slots: Vec::new() },
            });
        }

        let shorter = normalize(shorter)?;
        let longer = normalize(longer)?;
        let costs = CostMatrix::build(&shorter, &longer);

        let mut outcome = self.search(&costs)?;
        outcome.score.swapped = swapped;
        Ok(outcome)
    }

    /// Minimum-cost assignment over a prepared cost matrix.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::SearchBudgetExceeded` when the step budget runs out.
    pub fn search(&self, costs: &CostMatrix) -> Result<SearchOutcome, MatchError> {
        let candidates = costs.nearest_neighbors(self.neighbors);
        let mut assignments = Assignments::new(&candidates);

        let mut best: Option<(f64, Assignment)> = None;
        let mut leaves = 0usize;
        while let Some(assignment) = assignments.next() {
            if assignments.steps() > self.max_steps {
                return Err(MatchError::SearchBudgetExceeded(self.max_steps));
            }
            leaves += 1;

            let cost = assignment.cost(costs);
            if best.as_ref().map_or(true, |(b, _)| cost < *b) {
                best = Some((cost, assignment));
            }
        }

        debug!(
            rows = costs.rows(),
            cols = costs.cols(),
            leaves,
            steps = assignments.steps(),
            "assignment search finished"
        );

        // The first descent always reaches a leaf when every row has a candidate
        let (value, assignment) = best.unwrap_or_else(|| {
            (
                count_to_f64(costs.rows() + costs.cols()) * MISSING_MATCH_PENALTY,
                Assignment {
                    slots: vec![None; costs.rows()],
                },
            )
        });

        let assigned = assignment.assigned();
        Ok(SearchOutcome {
            score: MatchScore {
                value,
                assigned,
                unassigned: costs.rows() - assigned,
                unused: costs.cols().saturating_sub(assigned),
                swapped: false,
            },
            assignment,
        })
    }
}

/// Score two sketches with the default search settings.
///
/// # Errors
///
/// Returns `MatchError::SearchBudgetExceeded` if the default budget runs out.
pub fn match_sequences(
    first: &FeatureSequence,
    second: &FeatureSequence,
) -> Result<MatchScore, MatchError> {
    AssignmentSearch::default()
        .compare(first, second)
        .map(|outcome| outcome.score)
}
