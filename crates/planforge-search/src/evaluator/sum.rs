//! Sum evaluator.

use std::sync::Arc;

use planforge_core::PlanningTask;

use crate::component::{component_key, ComponentMap, EvaluatorFactory};
use crate::evaluation::{EvaluationContext, EvaluationResult, INFINITY};
use crate::evaluator::{next_evaluator_id, Evaluator, EvaluatorId, PathDependentSet};

/// Sum of the child evaluators' values.
///
/// Short-circuits at the first infinite child. An infinite sum is only a
/// reliable dead end when every child is reliable, since the infinity may
/// stem from any of them.
#[derive(Debug)]
pub struct SumEvaluator {
    id: EvaluatorId,
    subevaluators: Vec<Arc<dyn Evaluator>>,
}

impl SumEvaluator {
    pub fn new(subevaluators: Vec<Arc<dyn Evaluator>>) -> Self {
        assert!(!subevaluators.is_empty(), "sum of zero evaluators");
        Self {
            id: next_evaluator_id(),
            subevaluators,
        }
    }
}

impl Evaluator for SumEvaluator {
    fn id(&self) -> EvaluatorId {
        self.id
    }

    fn description(&self) -> &str {
        "sum"
    }

    fn compute(&self, ctx: &mut EvaluationContext<'_>) -> EvaluationResult {
        let mut total: i32 = 0;
        for evaluator in &self.subevaluators {
            let value = ctx.value_or_infinity(evaluator);
            if value == INFINITY {
                return EvaluationResult::infinite();
            }
            let Some(sum) = total.checked_add(value) else {
                panic!("sum evaluator overflow: {} + {}", total, value);
            };
            total = sum;
        }
        EvaluationResult::new(total)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        self.subevaluators
            .iter()
            .all(|evaluator| evaluator.dead_ends_are_reliable())
    }

    fn get_path_dependent_evaluators(&self, evals: &mut PathDependentSet) {
        for evaluator in &self.subevaluators {
            evals.collect(evaluator);
        }
    }
}

/// Task-independent twin of [`SumEvaluator`].
#[derive(Debug)]
pub struct SumEvaluatorFactory {
    subevaluators: Vec<Arc<dyn EvaluatorFactory>>,
}

impl SumEvaluatorFactory {
    pub fn new(subevaluators: Vec<Arc<dyn EvaluatorFactory>>) -> Self {
        Self { subevaluators }
    }
}

impl EvaluatorFactory for SumEvaluatorFactory {
    fn description(&self) -> &str {
        "sum"
    }

    fn bind(&self, task: &Arc<PlanningTask>, components: &mut ComponentMap) -> Arc<dyn Evaluator> {
        components.get_or_bind(component_key(self), |components| {
            let children = self
                .subevaluators
                .iter()
                .map(|factory| factory.bind(task, components))
                .collect();
            Arc::new(SumEvaluator::new(children)) as Arc<dyn Evaluator>
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::test_support::TableHeuristic;
    use crate::evaluator::GEvaluator;
    use crate::statistics::SearchStatistics;
    use planforge_core::test_utils::TaskBuilder;
    use planforge_core::StateRegistry;

    fn fixture() -> (planforge_core::State, SearchStatistics) {
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
    fn sums_children() {
        let (state, stats) = fixture();
        let sum: Arc<dyn Evaluator> = Arc::new(SumEvaluator::new(vec![
            Arc::new(GEvaluator::new()),
            Arc::new(TableHeuristic::new(&[], 5)),
        ]));

        let mut ctx = EvaluationContext::new(&state, 3, false, &stats);
        assert_eq!(ctx.value(&sum), 8);
    }

    #[test]
    fn infinite_child_makes_the_sum_infinite() {
        let (state, stats) = fixture();
        let sum: Arc<dyn Evaluator> = Arc::new(SumEvaluator::new(vec![
            Arc::new(TableHeuristic::new(&[], INFINITY)),
            Arc::new(TableHeuristic::new(&[], 1)),
        ]));

        let mut ctx = EvaluationContext::new(&state, 0, false, &stats);
        assert_eq!(ctx.value_or_infinity(&sum), INFINITY);
    }

    #[test]
    fn reliability_requires_all_children_reliable() {
        let reliable: Arc<dyn Evaluator> = Arc::new(TableHeuristic::new(&[], 1));
        let unreliable: Arc<dyn Evaluator> = Arc::new(TableHeuristic::new(&[], 1).unreliable());

        assert!(SumEvaluator::new(vec![Arc::clone(&reliable)]).dead_ends_are_reliable());
        assert!(!SumEvaluator::new(vec![reliable, unreliable]).dead_ends_are_reliable());
    }
}
