//! Evaluation results and the per-evaluation context.

use std::collections::HashMap;
use std::sync::Arc;

use planforge_core::{OperatorId, State};

use crate::evaluator::{Evaluator, EvaluatorId};
use crate::statistics::SearchStatistics;

/// Distinguished evaluator value encoding a dead end.
///
/// Must be checked before any arithmetic; multiplication by a positive
/// weight and summation preserve it explicitly.
pub const INFINITY: i32 = i32::MAX;

/// The outcome of one evaluator computation.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    value: i32,
    preferred_operators: Vec<OperatorId>,
    count_evaluation: bool,
}

impl EvaluationResult {
    pub fn new(value: i32) -> Self {
        Self {
            value,
            preferred_operators: Vec::new(),
            count_evaluation: true,
        }
    }

    /// A dead-end result.
    pub fn infinite() -> Self {
        Self::new(INFINITY)
    }

    pub fn with_preferred_operators(mut self, preferred_operators: Vec<OperatorId>) -> Self {
        self.preferred_operators = preferred_operators;
        self
    }

    /// Marks this result as not counting towards the evaluation statistics
    /// (used for cache hits).
    pub fn uncounted(mut self) -> Self {
        self.count_evaluation = false;
        self
    }

    #[inline]
    pub fn value(&self) -> i32 {
        self.value
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.value == INFINITY
    }

    pub fn preferred_operators(&self) -> &[OperatorId] {
        &self.preferred_operators
    }

    pub fn counts_as_evaluation(&self) -> bool {
        self.count_evaluation
    }
}

/// Transient bundle for evaluating one state reached with one g value.
///
/// The context memoizes evaluator results, so a shared evaluator computes at
/// most once per context no matter how many parents query it. Contexts are
/// not kept across search steps.
pub struct EvaluationContext<'a> {
    state: &'a State,
    g: i32,
    preferred: bool,
    calculate_preferred: bool,
    statistics: &'a SearchStatistics,
    cache: HashMap<EvaluatorId, EvaluationResult>,
}

impl<'a> EvaluationContext<'a> {
    /// A context that will not be asked for preferred operators.
    pub fn new(state: &'a State, g: i32, preferred: bool, statistics: &'a SearchStatistics) -> Self {
        Self {
            state,
            g,
            preferred,
            calculate_preferred: false,
            statistics,
            cache: HashMap::new(),
        }
    }

    /// A context whose evaluators should also collect preferred operators.
    pub fn with_preferred_operators(
        state: &'a State,
        g: i32,
        preferred: bool,
        statistics: &'a SearchStatistics,
    ) -> Self {
        Self {
            calculate_preferred: true,
            ..Self::new(state, g, preferred, statistics)
        }
    }

    #[inline]
    pub fn state(&self) -> &State {
        self.state
    }

    /// Cost of the path this state was reached on.
    #[inline]
    pub fn g(&self) -> i32 {
        self.g
    }

    /// Whether the state was reached via a preferred operator.
    #[inline]
    pub fn is_preferred(&self) -> bool {
        self.preferred
    }

    #[inline]
    pub fn calculate_preferred(&self) -> bool {
        self.calculate_preferred
    }

    fn ensure(&mut self, evaluator: &Arc<dyn Evaluator>) {
        if self.cache.contains_key(&evaluator.id()) {
            return;
        }
        let result = evaluator.compute(self);
        if result.counts_as_evaluation() {
            self.statistics.inc_evaluations();
        }
        self.cache.insert(evaluator.id(), result);
    }

    /// The evaluator's value, which may be [`INFINITY`].
    pub fn value_or_infinity(&mut self, evaluator: &Arc<dyn Evaluator>) -> i32 {
        self.ensure(evaluator);
        self.cache[&evaluator.id()].value()
    }

    /// The evaluator's value, asserting it is finite.
    pub fn value(&mut self, evaluator: &Arc<dyn Evaluator>) -> i32 {
        let value = self.value_or_infinity(evaluator);
        assert!(
            value != INFINITY,
            "evaluator '{}' unexpectedly reported a dead end",
            evaluator.description()
        );
        value
    }

    pub fn is_infinite(&mut self, evaluator: &Arc<dyn Evaluator>) -> bool {
        self.value_or_infinity(evaluator) == INFINITY
    }

    /// The preferred operators the evaluator reported in this context.
    pub fn preferred_operators(&mut self, evaluator: &Arc<dyn Evaluator>) -> Vec<OperatorId> {
        self.ensure(evaluator);
        self.cache[&evaluator.id()].preferred_operators().to_vec()
    }

    /// Iterates over all `(evaluator, value)` pairs computed in this context.
    pub fn cached_values(&self) -> impl Iterator<Item = (EvaluatorId, i32)> + '_ {
        self.cache.iter().map(|(&id, result)| (id, result.value()))
    }
}
