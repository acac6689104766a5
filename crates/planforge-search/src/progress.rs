//! Best-value tracking across the search.

use std::collections::HashMap;

use crate::evaluation::{EvaluationContext, INFINITY};
use crate::evaluator::EvaluatorId;

/// Tracks the minimum value each evaluator has produced so far.
///
/// The engine consults this after inserting a successor; a new minimum
/// triggers a checkpoint line and a preferred-open-list boost.
#[derive(Debug, Default)]
pub struct SearchProgress {
    best_values: HashMap<EvaluatorId, i32>,
}

impl SearchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds every value computed in `ctx`; returns true if any evaluator
    /// reached a new minimum (first sightings count).
    pub fn check_progress(&mut self, ctx: &EvaluationContext<'_>) -> bool {
        let mut improved = false;
        for (id, value) in ctx.cached_values() {
            if value == INFINITY {
                continue;
            }
            match self.best_values.get_mut(&id) {
                Some(best) if value >= *best => {}
                Some(best) => {
                    *best = value;
                    improved = true;
                }
                None => {
                    self.best_values.insert(id, value);
                    improved = true;
                }
            }
        }
        improved
    }
}
