//! The evaluator capability trait and the built-in evaluator algebra.
//!
//! Evaluators map an [`crate::EvaluationContext`] to an integer value (or
//! [`crate::INFINITY`] for a dead end) and optionally to a set of preferred
//! operators. They compose: `weighted`, `sum`, `max`, and `pref` wrap child
//! evaluators, `g` reads the context, and the leaf heuristics live in
//! [`crate::heuristic`].

mod g_evaluator;
mod max;
mod pref;
mod sum;
mod weighted;

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use planforge_core::{OperatorId, State};

use crate::evaluation::{EvaluationContext, EvaluationResult};

pub use g_evaluator::{GEvaluator, GEvaluatorFactory};
pub use max::{MaxEvaluator, MaxEvaluatorFactory};
pub use pref::{PrefEvaluator, PrefEvaluatorFactory};
pub use sum::{SumEvaluator, SumEvaluatorFactory};
pub use weighted::{WeightedEvaluator, WeightedEvaluatorFactory};

/// Identity of a live evaluator instance.
///
/// Unique per construction; context memos and path-dependent deduplication
/// key on it.
pub type EvaluatorId = u64;

pub(crate) fn next_evaluator_id() -> EvaluatorId {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// A task-specific evaluator.
pub trait Evaluator: fmt::Debug + Send + Sync {
    /// Stable identity of this instance.
    fn id(&self) -> EvaluatorId;

    fn description(&self) -> &str;

    /// Computes the value (and optionally preferred operators) for the
    /// state in `ctx`. Called at most once per context; reads of child
    /// values go back through the context memo.
    fn compute(&self, ctx: &mut EvaluationContext<'_>) -> EvaluationResult;

    /// True if an infinite value from this evaluator proves the state is
    /// unsolvable.
    fn dead_ends_are_reliable(&self) -> bool;

    /// True if this evaluator keeps per-state estimates across contexts.
    fn caches_estimates(&self) -> bool {
        false
    }

    fn is_estimate_cached(&self, _state: &State) -> bool {
        false
    }

    fn cached_estimate(&self, _state: &State) -> Option<i32> {
        None
    }

    /// True if values depend on the path taken to the state; such
    /// evaluators receive transition notifications from the engine.
    fn is_path_dependent(&self) -> bool {
        false
    }

    fn notify_initial_state(&self, _state: &State) {}

    fn notify_state_transition(&self, _parent: &State, _op: OperatorId, _succ: &State) {}

    /// Recurses into child evaluators via [`PathDependentSet::collect`].
    /// Leaves have no children and inherit the empty default.
    fn get_path_dependent_evaluators(&self, _evals: &mut PathDependentSet) {}
}

/// Collects path-dependent evaluators from an evaluator graph, deduplicating
/// leaves reachable through several parents.
#[derive(Debug, Default)]
pub struct PathDependentSet {
    evaluators: Vec<Arc<dyn Evaluator>>,
    seen: HashSet<EvaluatorId>,
}

impl PathDependentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `evaluator` if it is path-dependent, then recurses into its
    /// children.
    pub fn collect(&mut self, evaluator: &Arc<dyn Evaluator>) {
        if evaluator.is_path_dependent() && self.seen.insert(evaluator.id()) {
            self.evaluators.push(Arc::clone(evaluator));
        }
        evaluator.get_path_dependent_evaluators(self);
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    pub fn into_evaluators(self) -> Vec<Arc<dyn Evaluator>> {
        self.evaluators
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Table-driven heuristic for tests: looks up the value by the state's
    /// variable values.
    #[derive(Debug)]
    pub struct TableHeuristic {
        id: EvaluatorId,
        values: HashMap<Vec<i32>, i32>,
        default: i32,
        reliable: bool,
    }

    impl TableHeuristic {
        pub fn new(entries: &[(&[i32], i32)], default: i32) -> Self {
            Self {
                id: next_evaluator_id(),
                values: entries
                    .iter()
                    .map(|(values, h)| (values.to_vec(), *h))
                    .collect(),
                default,
                reliable: true,
            }
        }

        pub fn unreliable(mut self) -> Self {
            self.reliable = false;
            self
        }
    }

    impl Evaluator for TableHeuristic {
        fn id(&self) -> EvaluatorId {
            self.id
        }

        fn description(&self) -> &str {
            "table"
        }

        fn compute(&self, ctx: &mut EvaluationContext<'_>) -> EvaluationResult {
            let value = self
                .values
                .get(ctx.state().values())
                .copied()
                .unwrap_or(self.default);
            EvaluationResult::new(value)
        }

        fn dead_ends_are_reliable(&self) -> bool {
            self.reliable
        }
    }

    /// Path-dependent evaluator that records every notification.
    #[derive(Debug)]
    pub struct RecordingEvaluator {
        id: EvaluatorId,
        pub initial_states: Mutex<Vec<Vec<i32>>>,
        pub transitions: Mutex<Vec<(Vec<i32>, OperatorId, Vec<i32>)>>,
    }

    impl RecordingEvaluator {
        pub fn new() -> Self {
            Self {
                id: next_evaluator_id(),
                initial_states: Mutex::new(Vec::new()),
                transitions: Mutex::new(Vec::new()),
            }
        }
    }

    impl Evaluator for RecordingEvaluator {
        fn id(&self) -> EvaluatorId {
            self.id
        }

        fn description(&self) -> &str {
            "recording"
        }

        fn compute(&self, _ctx: &mut EvaluationContext<'_>) -> EvaluationResult {
            EvaluationResult::new(0)
        }

        fn dead_ends_are_reliable(&self) -> bool {
            true
        }

        fn is_path_dependent(&self) -> bool {
            true
        }

        fn notify_initial_state(&self, state: &State) {
            self.initial_states
                .lock()
                .unwrap()
                .push(state.values().to_vec());
        }

        fn notify_state_transition(&self, parent: &State, op: OperatorId, succ: &State) {
            self.transitions.lock().unwrap().push((
                parent.values().to_vec(),
                op,
                succ.values().to_vec(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingEvaluator;
    use super::*;

    #[test]
    fn path_dependent_set_deduplicates_shared_leaves() {
        let leaf: Arc<dyn Evaluator> = Arc::new(RecordingEvaluator::new());
        let parent_a: Arc<dyn Evaluator> =
            Arc::new(SumEvaluator::new(vec![Arc::clone(&leaf)]));
        let parent_b: Arc<dyn Evaluator> =
            Arc::new(MaxEvaluator::new(vec![Arc::clone(&leaf)]));

        let mut set = PathDependentSet::new();
        set.collect(&parent_a);
        set.collect(&parent_b);
        set.collect(&leaf);

        assert_eq!(set.len(), 1);
        let collected = set.into_evaluators();
        assert_eq!(collected[0].id(), leaf.id());
    }
}
