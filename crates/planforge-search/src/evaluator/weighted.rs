//! Weighted evaluator: a child value scaled by an integer weight.

use std::sync::Arc;

use planforge_core::PlanningTask;

use crate::component::{component_key, ComponentMap, EvaluatorFactory};
use crate::evaluation::{EvaluationContext, EvaluationResult, INFINITY};
use crate::evaluator::{next_evaluator_id, Evaluator, EvaluatorId, PathDependentSet};

/// Multiplies the child evaluator's value by `weight`.
///
/// Infinity absorbs the multiplication. Produces no preferred operators.
#[derive(Debug)]
pub struct WeightedEvaluator {
    id: EvaluatorId,
    description: String,
    evaluator: Arc<dyn Evaluator>,
    weight: i32,
}

impl WeightedEvaluator {
    pub fn new(evaluator: Arc<dyn Evaluator>, weight: i32) -> Self {
        Self {
            id: next_evaluator_id(),
            description: format!("{} * {}", weight, evaluator.description()),
            evaluator,
            weight,
        }
    }
}

impl Evaluator for WeightedEvaluator {
    fn id(&self) -> EvaluatorId {
        self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn compute(&self, ctx: &mut EvaluationContext<'_>) -> EvaluationResult {
        let value = ctx.value_or_infinity(&self.evaluator);
        if value == INFINITY {
            return EvaluationResult::infinite();
        }
        let Some(product) = value.checked_mul(self.weight) else {
            panic!("weighted evaluator overflow: {} * {}", value, self.weight);
        };
        EvaluationResult::new(product)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        self.evaluator.dead_ends_are_reliable()
    }

    fn get_path_dependent_evaluators(&self, evals: &mut PathDependentSet) {
        evals.collect(&self.evaluator);
    }
}

/// Task-independent twin of [`WeightedEvaluator`].
#[derive(Debug)]
pub struct WeightedEvaluatorFactory {
    evaluator: Arc<dyn EvaluatorFactory>,
    weight: i32,
}

impl WeightedEvaluatorFactory {
    pub fn new(evaluator: Arc<dyn EvaluatorFactory>, weight: i32) -> Self {
        Self { evaluator, weight }
    }
}

impl EvaluatorFactory for WeightedEvaluatorFactory {
    fn description(&self) -> &str {
        "weighted"
    }

    fn bind(&self, task: &Arc<PlanningTask>, components: &mut ComponentMap) -> Arc<dyn Evaluator> {
        components.get_or_bind(component_key(self), |components| {
            let child = self.evaluator.bind(task, components);
            Arc::new(WeightedEvaluator::new(child, self.weight)) as Arc<dyn Evaluator>
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::test_support::TableHeuristic;
    use crate::statistics::SearchStatistics;
    use planforge_core::test_utils::TaskBuilder;
    use planforge_core::StateRegistry;

    fn state_and_stats() -> (planforge_core::State, SearchStatistics) {
        let mut builder = TaskBuilder::new();
        let v = builder.variable("v", 2);
        builder.goal(v, 1);
        let task = builder.build();
        (
            StateRegistry::new(task).initial_state(),
            SearchStatistics::new(),
        )
    }

    #[test]
    fn scales_finite_values() {
        let (state, stats) = state_and_stats();
        let child: Arc<dyn Evaluator> = Arc::new(TableHeuristic::new(&[], 6));
        let weighted: Arc<dyn Evaluator> = Arc::new(WeightedEvaluator::new(child, 3));

        let mut ctx = EvaluationContext::new(&state, 0, false, &stats);
        assert_eq!(ctx.value(&weighted), 18);
    }

    #[test]
    fn infinity_absorbs_the_weight() {
        let (state, stats) = state_and_stats();
        let child: Arc<dyn Evaluator> = Arc::new(TableHeuristic::new(&[], INFINITY));
        let weighted: Arc<dyn Evaluator> = Arc::new(WeightedEvaluator::new(child, 3));

        let mut ctx = EvaluationContext::new(&state, 0, false, &stats);
        assert_eq!(ctx.value_or_infinity(&weighted), INFINITY);
    }

    #[test]
    #[should_panic(expected = "weighted evaluator overflow")]
    fn overflow_is_a_fatal_assertion() {
        let (state, stats) = state_and_stats();
        let child: Arc<dyn Evaluator> = Arc::new(TableHeuristic::new(&[], INFINITY / 2));
        let weighted: Arc<dyn Evaluator> = Arc::new(WeightedEvaluator::new(child, 4));

        let mut ctx = EvaluationContext::new(&state, 0, false, &stats);
        let _ = ctx.value_or_infinity(&weighted);
    }

    #[test]
    fn reliability_is_inherited() {
        let reliable: Arc<dyn Evaluator> = Arc::new(TableHeuristic::new(&[], 1));
        let unreliable: Arc<dyn Evaluator> = Arc::new(TableHeuristic::new(&[], 1).unreliable());

        assert!(WeightedEvaluator::new(reliable, 2).dead_ends_are_reliable());
        assert!(!WeightedEvaluator::new(unreliable, 2).dead_ends_are_reliable());
    }
}
