//! The g evaluator: the cost of the path the state was reached on.

use std::sync::Arc;

use planforge_core::PlanningTask;

use crate::component::{component_key, ComponentMap, EvaluatorFactory};
use crate::evaluation::{EvaluationContext, EvaluationResult};
use crate::evaluator::{next_evaluator_id, Evaluator, EvaluatorId};

/// Returns the g value from the evaluation context.
#[derive(Debug)]
pub struct GEvaluator {
    id: EvaluatorId,
}

impl GEvaluator {
    pub fn new() -> Self {
        Self {
            id: next_evaluator_id(),
        }
    }
}

impl Default for GEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for GEvaluator {
    fn id(&self) -> EvaluatorId {
        self.id
    }

    fn description(&self) -> &str {
        "g"
    }

    fn compute(&self, ctx: &mut EvaluationContext<'_>) -> EvaluationResult {
        EvaluationResult::new(ctx.g())
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }
}

/// Task-independent twin of [`GEvaluator`].
///
/// Carries its description as data; factory identity is the live node's
/// address, so the node must not be zero-sized.
#[derive(Debug)]
pub struct GEvaluatorFactory {
    description: String,
}

impl GEvaluatorFactory {
    pub fn new() -> Self {
        Self {
            description: "g".to_string(),
        }
    }
}

impl Default for GEvaluatorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluatorFactory for GEvaluatorFactory {
    fn description(&self) -> &str {
        &self.description
    }

    fn bind(&self, _task: &Arc<PlanningTask>, components: &mut ComponentMap) -> Arc<dyn Evaluator> {
        components.get_or_bind(component_key(self), |_| {
            Arc::new(GEvaluator::new()) as Arc<dyn Evaluator>
        })
    }
}
