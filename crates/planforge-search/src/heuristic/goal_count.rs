//! Goal-count heuristic.

use std::sync::Arc;

use planforge_core::{OperatorId, PlanningTask, State};

use crate::component::{component_key, ComponentMap, EvaluatorFactory};
use crate::evaluation::{EvaluationContext, EvaluationResult};
use crate::evaluator::{next_evaluator_id, Evaluator, EvaluatorId};
use crate::heuristic::EstimateCache;

/// Number of unsatisfied goal facts.
///
/// Inadmissible but cheap. When asked for preferred operators it marks the
/// applicable operators that make an unsatisfied goal fact true.
#[derive(Debug)]
pub struct GoalCountHeuristic {
    id: EvaluatorId,
    task: Arc<PlanningTask>,
    cache: EstimateCache,
}

impl GoalCountHeuristic {
    pub fn new(task: Arc<PlanningTask>) -> Self {
        Self {
            id: next_evaluator_id(),
            task,
            cache: EstimateCache::new(),
        }
    }

    fn unsatisfied_goals(&self, state: &State) -> i32 {
        self.task
            .goal()
            .iter()
            .filter(|fact| !state.satisfies(fact))
            .count() as i32
    }

    fn goal_achieving_operators(&self, state: &State) -> Vec<OperatorId> {
        let mut preferred = Vec::new();
        for (index, op) in self.task.operators().iter().enumerate() {
            if !op.is_applicable(state) {
                continue;
            }
            let achieves_goal = op.effects.iter().any(|effect| {
                self.task.goal().contains(&effect.fact)
                    && !state.satisfies(&effect.fact)
                    && effect.conditions.iter().all(|c| state.satisfies(c))
            });
            if achieves_goal {
                preferred.push(OperatorId::new(index));
            }
        }
        preferred
    }
}

impl Evaluator for GoalCountHeuristic {
    fn id(&self) -> EvaluatorId {
        self.id
    }

    fn description(&self) -> &str {
        "goal_count"
    }

    fn compute(&self, ctx: &mut EvaluationContext<'_>) -> EvaluationResult {
        let state = ctx.state();
        if !ctx.calculate_preferred() {
            if let Some(value) = self.cache.get(state.id()) {
                return EvaluationResult::new(value).uncounted();
            }
        }
        let value = self.unsatisfied_goals(state);
        self.cache.insert(state.id(), value);
        if ctx.calculate_preferred() {
            EvaluationResult::new(value)
                .with_preferred_operators(self.goal_achieving_operators(state))
        } else {
            EvaluationResult::new(value)
        }
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

/// Task-independent twin of [`GoalCountHeuristic`].
#[derive(Debug)]
pub struct GoalCountHeuristicFactory {
    description: String,
}

impl GoalCountHeuristicFactory {
    pub fn new() -> Self {
        Self {
            description: "goal_count".to_string(),
        }
    }
}

impl Default for GoalCountHeuristicFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluatorFactory for GoalCountHeuristicFactory {
    fn description(&self) -> &str {
        &self.description
    }

    fn bind(&self, task: &Arc<PlanningTask>, components: &mut ComponentMap) -> Arc<dyn Evaluator> {
        components.get_or_bind(component_key(self), |_| {
            Arc::new(GoalCountHeuristic::new(Arc::clone(task))) as Arc<dyn Evaluator>
        })
    }
}
