//! Preferred-operator collection evaluator.

use std::sync::Arc;

use planforge_core::PlanningTask;

use crate::component::{component_key, ComponentMap, EvaluatorFactory};
use crate::evaluation::{EvaluationContext, EvaluationResult};
use crate::evaluator::{next_evaluator_id, Evaluator, EvaluatorId, PathDependentSet};
use crate::ordered_set::OrderedSet;

/// Unions the preferred operators of its children; the value is always zero.
///
/// Useful to feed several heuristics' preferred operators into one
/// preferred-only open list.
#[derive(Debug)]
pub struct PrefEvaluator {
    id: EvaluatorId,
    subevaluators: Vec<Arc<dyn Evaluator>>,
}

impl PrefEvaluator {
    pub fn new(subevaluators: Vec<Arc<dyn Evaluator>>) -> Self {
        Self {
            id: next_evaluator_id(),
            subevaluators,
        }
    }
}

impl Evaluator for PrefEvaluator {
    fn id(&self) -> EvaluatorId {
        self.id
    }

    fn description(&self) -> &str {
        "pref"
    }

    fn compute(&self, ctx: &mut EvaluationContext<'_>) -> EvaluationResult {
        let mut preferred = OrderedSet::new();
        for evaluator in &self.subevaluators {
            for op in ctx.preferred_operators(evaluator) {
                preferred.insert(op);
            }
        }
        EvaluationResult::new(0).with_preferred_operators(preferred.into_vec())
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }

    fn get_path_dependent_evaluators(&self, evals: &mut PathDependentSet) {
        for evaluator in &self.subevaluators {
            evals.collect(evaluator);
        }
    }
}

/// Task-independent twin of [`PrefEvaluator`].
#[derive(Debug)]
pub struct PrefEvaluatorFactory {
    subevaluators: Vec<Arc<dyn EvaluatorFactory>>,
}

impl PrefEvaluatorFactory {
    pub fn new(subevaluators: Vec<Arc<dyn EvaluatorFactory>>) -> Self {
        Self { subevaluators }
    }
}

impl EvaluatorFactory for PrefEvaluatorFactory {
    fn description(&self) -> &str {
        "pref"
    }

    fn bind(&self, task: &Arc<PlanningTask>, components: &mut ComponentMap) -> Arc<dyn Evaluator> {
        components.get_or_bind(component_key(self), |components| {
            let children = self
                .subevaluators
                .iter()
                .map(|factory| factory.bind(task, components))
                .collect();
            Arc::new(PrefEvaluator::new(children)) as Arc<dyn Evaluator>
        })
    }
}
