//! Lexicographic multi-evaluator open list.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use planforge_core::{PlanningTask, StateId};

use crate::component::{ComponentMap, EvaluatorFactory, OpenListFactory};
use crate::evaluation::EvaluationContext;
use crate::evaluator::{Evaluator, PathDependentSet};
use crate::open_list::{OpenList, StateOpenList};

/// Open list keyed by a tuple of evaluator values, compared
/// lexicographically, with FIFO tie-breaking on full-key ties.
///
/// A context counts as a dead end as soon as any component is infinite.
#[derive(Debug)]
pub struct TieBreakingOpenList<E> {
    evaluators: Vec<Arc<dyn Evaluator>>,
    buckets: BTreeMap<Vec<i32>, VecDeque<E>>,
    size: usize,
    pref_only: bool,
}

impl<E> TieBreakingOpenList<E> {
    pub fn new(evaluators: Vec<Arc<dyn Evaluator>>, pref_only: bool) -> Self {
        assert!(!evaluators.is_empty(), "tie-breaking over zero evaluators");
        Self {
            evaluators,
            buckets: BTreeMap::new(),
            size: 0,
            pref_only,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }
}

impl<E: fmt::Debug + Send> OpenList<E> for TieBreakingOpenList<E> {
    fn insert(&mut self, ctx: &mut EvaluationContext<'_>, entry: E) {
        if self.pref_only && !ctx.is_preferred() {
            return;
        }
        let key: Vec<i32> = self
            .evaluators
            .iter()
            .map(|evaluator| ctx.value(evaluator))
            .collect();
        self.buckets.entry(key).or_default().push_back(entry);
        self.size += 1;
    }

    fn remove_min(&mut self) -> E {
        assert!(self.size > 0, "remove_min on an empty open list");
        let mut first = self
            .buckets
            .first_entry()
            .expect("non-empty open list has a bucket");
        let entry = first
            .get_mut()
            .pop_front()
            .expect("buckets are never empty");
        if first.get().is_empty() {
            first.remove();
        }
        self.size -= 1;
        entry
    }

    fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.size = 0;
    }

    fn only_contains_preferred_entries(&self) -> bool {
        self.pref_only
    }

    fn is_dead_end(&self, ctx: &mut EvaluationContext<'_>) -> bool {
        self.evaluators
            .iter()
            .any(|evaluator| ctx.is_infinite(evaluator))
    }

    fn is_reliable_dead_end(&self, ctx: &mut EvaluationContext<'_>) -> bool {
        self.evaluators
            .iter()
            .any(|evaluator| ctx.is_infinite(evaluator) && evaluator.dead_ends_are_reliable())
    }

    fn get_path_dependent_evaluators(&self, evals: &mut PathDependentSet) {
        for evaluator in &self.evaluators {
            evals.collect(evaluator);
        }
    }
}

/// Task-independent twin of [`TieBreakingOpenList`].
#[derive(Debug)]
pub struct TieBreakingOpenListFactory {
    evaluators: Vec<Arc<dyn EvaluatorFactory>>,
    pref_only: bool,
}

impl TieBreakingOpenListFactory {
    pub fn new(evaluators: Vec<Arc<dyn EvaluatorFactory>>, pref_only: bool) -> Self {
        Self {
            evaluators,
            pref_only,
        }
    }
}

impl OpenListFactory for TieBreakingOpenListFactory {
    fn bind(&self, task: &Arc<PlanningTask>, components: &mut ComponentMap) -> StateOpenList {
        let evaluators = self
            .evaluators
            .iter()
            .map(|factory| factory.bind(task, components))
            .collect();
        Box::new(TieBreakingOpenList::<StateId>::new(
            evaluators,
            self.pref_only,
        ))
    }
}
