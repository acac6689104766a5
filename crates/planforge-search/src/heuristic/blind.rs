//! Blind heuristic.

use std::sync::Arc;

use planforge_core::{OperatorId, PlanningTask, State};

use crate::component::{component_key, ComponentMap, EvaluatorFactory};
use crate::evaluation::{EvaluationContext, EvaluationResult};
use crate::evaluator::{next_evaluator_id, Evaluator, EvaluatorId};
use crate::heuristic::EstimateCache;

/// Zero on goal states, the cheapest operator cost everywhere else.
///
/// Admissible and consistent; the baseline for optimal search.
#[derive(Debug)]
pub struct BlindHeuristic {
    id: EvaluatorId,
    task: Arc<PlanningTask>,
    min_operator_cost: i32,
    cache: EstimateCache,
}

impl BlindHeuristic {
    pub fn new(task: Arc<PlanningTask>) -> Self {
        let min_operator_cost = (0..task.num_operators())
            .map(|i| task.operator_cost(OperatorId::new(i)))
            .min()
            .unwrap_or(0);
        Self {
            id: next_evaluator_id(),
            task,
            min_operator_cost,
            cache: EstimateCache::new(),
        }
    }
}

impl Evaluator for BlindHeuristic {
    fn id(&self) -> EvaluatorId {
        self.id
    }

    fn description(&self) -> &str {
        "blind"
    }

    fn compute(&self, ctx: &mut EvaluationContext<'_>) -> EvaluationResult {
        let state = ctx.state();
        if let Some(value) = self.cache.get(state.id()) {
            return EvaluationResult::new(value).uncounted();
        }
        let value = if self.task.is_goal(state) {
            0
        } else {
            self.min_operator_cost
        };
        self.cache.insert(state.id(), value);
        EvaluationResult::new(value)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }

    fn caches_estimates(&self) -> bool {
        true
    }

    fn is_estimate_cached(&self, state: &State) -> bool {
        self.cache.contains(state.id())
    }

    fn cached_estimate(&self, state: &State) -> Option<i32> {
        self.cache.get(state.id())
    }
}

/// Task-independent twin of [`BlindHeuristic`].
#[derive(Debug)]
pub struct BlindHeuristicFactory {
    description: String,
}

impl BlindHeuristicFactory {
    pub fn new() -> Self {
        Self {
            description: "blind".to_string(),
        }
    }
}

impl Default for BlindHeuristicFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluatorFactory for BlindHeuristicFactory {
    fn description(&self) -> &str {
        &self.description
    }

    fn bind(&self, task: &Arc<PlanningTask>, components: &mut ComponentMap) -> Arc<dyn Evaluator> {
        components.get_or_bind(component_key(self), |_| {
            Arc::new(BlindHeuristic::new(Arc::clone(task))) as Arc<dyn Evaluator>
        })
    }
}
