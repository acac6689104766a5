//! Max evaluator.

use std::sync::Arc;

use planforge_core::PlanningTask;

use crate::component::{component_key, ComponentMap, EvaluatorFactory};
use crate::evaluation::{EvaluationContext, EvaluationResult, INFINITY};
use crate::evaluator::{next_evaluator_id, Evaluator, EvaluatorId, PathDependentSet};

/// Maximum of the child evaluators' values, short-circuiting on infinity.
#[derive(Debug)]
pub struct MaxEvaluator {
    id: EvaluatorId,
    subevaluators: Vec<Arc<dyn Evaluator>>,
}

impl MaxEvaluator {
    pub fn new(subevaluators: Vec<Arc<dyn Evaluator>>) -> Self {
        assert!(!subevaluators.is_empty(), "max of zero evaluators");
        Self {
            id: next_evaluator_id(),
            subevaluators,
        }
    }
}

impl Evaluator for MaxEvaluator {
    fn id(&self) -> EvaluatorId {
        self.id
    }

    fn description(&self) -> &str {
        "max"
    }

    fn compute(&self, ctx: &mut EvaluationContext<'_>) -> EvaluationResult {
        let mut best = i32::MIN;
        for evaluator in &self.subevaluators {
            let value = ctx.value_or_infinity(evaluator);
            if value == INFINITY {
                return EvaluationResult::infinite();
            }
            best = best.max(value);
        }
        EvaluationResult::new(best)
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

/// Task-independent twin of [`MaxEvaluator`].
#[derive(Debug)]
pub struct MaxEvaluatorFactory {
    subevaluators: Vec<Arc<dyn EvaluatorFactory>>,
}

impl MaxEvaluatorFactory {
    pub fn new(subevaluators: Vec<Arc<dyn EvaluatorFactory>>) -> Self {
        Self { subevaluators }
    }
}

impl EvaluatorFactory for MaxEvaluatorFactory {
    fn description(&self) -> &str {
        "max"
    }

    fn bind(&self, task: &Arc<PlanningTask>, components: &mut ComponentMap) -> Arc<dyn Evaluator> {
        components.get_or_bind(component_key(self), |components| {
            let children = self
                .subevaluators
                .iter()
                .map(|factory| factory.bind(task, components))
                .collect();
            Arc::new(MaxEvaluator::new(children)) as Arc<dyn Evaluator>
        })
    }
}
