//! Single-evaluator bucket open list.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use planforge_core::{PlanningTask, StateId};

use crate::component::{ComponentMap, EvaluatorFactory, OpenListFactory};
use crate::evaluation::EvaluationContext;
use crate::evaluator::{Evaluator, PathDependentSet};
use crate::open_list::{OpenList, StateOpenList};

/// Open list over one evaluator with FIFO tie-breaking.
///
/// Entries with the same evaluator value share a bucket; the map from value
/// to bucket keeps buckets ordered, so insertion and removal cost
/// `O(log buckets)`.
#[derive(Debug)]
pub struct BestFirstOpenList<E> {
    evaluator: Arc<dyn Evaluator>,
    buckets: BTreeMap<i32, VecDeque<E>>,
    size: usize,
    pref_only: bool,
}

impl<E> BestFirstOpenList<E> {
    pub fn new(evaluator: Arc<dyn Evaluator>, pref_only: bool) -> Self {
        Self {
            evaluator,
            buckets: BTreeMap::new(),
            size: 0,
            pref_only,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }
}

impl<E: fmt::Debug + Send> OpenList<E> for BestFirstOpenList<E> {
    fn insert(&mut self, ctx: &mut EvaluationContext<'_>, entry: E) {
        if self.pref_only && !ctx.is_preferred() {
            return;
        }
        let key = ctx.value(&self.evaluator);
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
        ctx.is_infinite(&self.evaluator)
    }

    fn is_reliable_dead_end(&self, ctx: &mut EvaluationContext<'_>) -> bool {
        self.is_dead_end(ctx) && self.evaluator.dead_ends_are_reliable()
    }

    fn get_path_dependent_evaluators(&self, evals: &mut PathDependentSet) {
        evals.collect(&self.evaluator);
    }
}

/// Task-independent twin of [`BestFirstOpenList`].
#[derive(Debug)]
pub struct BestFirstOpenListFactory {
    evaluator: Arc<dyn EvaluatorFactory>,
    pref_only: bool,
}

impl BestFirstOpenListFactory {
    pub fn new(evaluator: Arc<dyn EvaluatorFactory>, pref_only: bool) -> Self {
        Self {
            evaluator,
            pref_only,
        }
    }
}

impl OpenListFactory for BestFirstOpenListFactory {
    fn bind(&self, task: &Arc<PlanningTask>, components: &mut ComponentMap) -> StateOpenList {
        let evaluator = self.evaluator.bind(task, components);
        Box::new(BestFirstOpenList::<StateId>::new(evaluator, self.pref_only))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
    fn min_first_fifo_within_key() {
        let (state, stats) = fixture();
        let g: Arc<dyn Evaluator> = Arc::new(GEvaluator::new());
        let mut open: BestFirstOpenList<u32> = BestFirstOpenList::new(g, false);

        // Two entries at g=5 (in order), one at g=2.
        let mut ctx = EvaluationContext::new(&state, 5, false, &stats);
        open.insert(&mut ctx, 50);
        let mut ctx = EvaluationContext::new(&state, 5, false, &stats);
        open.insert(&mut ctx, 51);
        let mut ctx = EvaluationContext::new(&state, 2, false, &stats);
        open.insert(&mut ctx, 20);

        assert_eq!(open.len(), 3);
        assert_eq!(open.remove_min(), 20);
        assert_eq!(open.remove_min(), 50);
        assert_eq!(open.remove_min(), 51);
        assert!(open.is_empty());
    }

    #[test]
    fn pref_only_list_drops_non_preferred_entries() {
        let (state, stats) = fixture();
        let g: Arc<dyn Evaluator> = Arc::new(GEvaluator::new());
        let mut open: BestFirstOpenList<u32> = BestFirstOpenList::new(g, true);

        let mut ctx = EvaluationContext::new(&state, 1, false, &stats);
        open.insert(&mut ctx, 1);
        assert!(open.is_empty());

        let mut ctx = EvaluationContext::new(&state, 1, true, &stats);
        open.insert(&mut ctx, 2);
        assert_eq!(open.len(), 1);
        assert!(open.only_contains_preferred_entries());
    }
}
