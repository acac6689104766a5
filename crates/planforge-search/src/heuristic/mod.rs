//! Built-in leaf heuristics.
//!
//! These are deliberately simple: they exist so that complete engines can be
//! configured and tested without an external heuristic library. Both cache
//! their estimates per state, which makes them usable as lazy re-evaluation
//! evaluators.

mod blind;
mod goal_count;

use std::collections::HashMap;
use std::sync::Mutex;

use planforge_core::StateId;

pub use blind::{BlindHeuristic, BlindHeuristicFactory};
pub use goal_count::{GoalCountHeuristic, GoalCountHeuristicFactory};

/// Per-state estimate cache shared by the leaf heuristics.
///
/// Interior mutability keeps [`crate::Evaluator::compute`] a `&self`
/// operation on shared evaluator handles.
#[derive(Debug, Default)]
pub struct EstimateCache {
    values: Mutex<HashMap<StateId, i32>>,
}

impl EstimateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, state: StateId) -> Option<i32> {
        self.values.lock().unwrap().get(&state).copied()
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.values.lock().unwrap().contains_key(&state)
    }

    pub fn insert(&self, state: StateId, value: i32) {
        self.values.lock().unwrap().insert(state, value);
    }
}
