//! Alternation open list: round-robin over sub-open-lists.

use std::fmt;
use std::sync::Arc;

use planforge_core::{PlanningTask, StateId};

use crate::component::{ComponentMap, OpenListFactory};
use crate::evaluation::EvaluationContext;
use crate::evaluator::PathDependentSet;
use crate::open_list::{OpenList, StateOpenList};

/// Serves several sub-open-lists by priority.
///
/// Each entry goes into every sub-list (preferred-only sub-lists filter for
/// themselves). `remove_min` picks the non-empty sub-list with the lowest
/// priority and bumps it by its period, yielding a weighted round-robin.
/// Boosting subtracts from the priorities of preferred-only sub-lists,
/// so operators recommended by the heuristics get served sooner after
/// progress.
#[derive(Debug)]
pub struct AlternationOpenList<E> {
    open_lists: Vec<Box<dyn OpenList<E>>>,
    priorities: Vec<i64>,
    periods: Vec<i64>,
    boost_amount: i64,
}

impl<E> AlternationOpenList<E> {
    /// Creates an alternation over `open_lists`, each served with period 1.
    pub fn new(open_lists: Vec<Box<dyn OpenList<E>>>, boost_amount: i64) -> Self {
        let periods = vec![1; open_lists.len()];
        Self::with_periods(open_lists, periods, boost_amount)
    }

    /// Creates an alternation with an explicit period per sub-list; a
    /// sub-list with period `p` is served every `p`-th turn.
    pub fn with_periods(
        open_lists: Vec<Box<dyn OpenList<E>>>,
        periods: Vec<i64>,
        boost_amount: i64,
    ) -> Self {
        assert!(!open_lists.is_empty(), "alternation over zero open lists");
        assert_eq!(open_lists.len(), periods.len());
        let priorities = vec![0; open_lists.len()];
        Self {
            open_lists,
            priorities,
            periods,
            boost_amount,
        }
    }
}

impl<E: Clone + fmt::Debug + Send> OpenList<E> for AlternationOpenList<E> {
    fn insert(&mut self, ctx: &mut EvaluationContext<'_>, entry: E) {
        for open_list in &mut self.open_lists {
            open_list.insert(ctx, entry.clone());
        }
    }

    fn remove_min(&mut self) -> E {
        let best = self
            .open_lists
            .iter()
            .enumerate()
            .filter(|(_, list)| !list.is_empty())
            .min_by_key(|&(i, _)| self.priorities[i])
            .map(|(i, _)| i)
            .expect("remove_min on an empty open list");
        self.priorities[best] += self.periods[best];
        self.open_lists[best].remove_min()
    }

    fn is_empty(&self) -> bool {
        self.open_lists.iter().all(|list| list.is_empty())
    }

    fn clear(&mut self) {
        for open_list in &mut self.open_lists {
            open_list.clear();
        }
    }

    fn boost_preferred(&mut self) {
        for (i, open_list) in self.open_lists.iter().enumerate() {
            if open_list.only_contains_preferred_entries() {
                self.priorities[i] -= self.boost_amount;
            }
        }
    }

    fn is_dead_end(&self, ctx: &mut EvaluationContext<'_>) -> bool {
        if self.is_reliable_dead_end(ctx) {
            return true;
        }
        self.open_lists.iter().all(|list| list.is_dead_end(ctx))
    }

    fn is_reliable_dead_end(&self, ctx: &mut EvaluationContext<'_>) -> bool {
        self.open_lists
            .iter()
            .any(|list| list.is_reliable_dead_end(ctx))
    }

    fn get_path_dependent_evaluators(&self, evals: &mut PathDependentSet) {
        for open_list in &self.open_lists {
            open_list.get_path_dependent_evaluators(evals);
        }
    }
}

/// Task-independent twin of [`AlternationOpenList`].
#[derive(Debug)]
pub struct AlternationOpenListFactory {
    sublists: Vec<Arc<dyn OpenListFactory>>,
    boost_amount: i64,
}

impl AlternationOpenListFactory {
    pub fn new(sublists: Vec<Arc<dyn OpenListFactory>>, boost_amount: i64) -> Self {
        Self {
            sublists,
            boost_amount,
        }
    }
}

impl OpenListFactory for AlternationOpenListFactory {
    fn bind(&self, task: &Arc<PlanningTask>, components: &mut ComponentMap) -> StateOpenList {
        let open_lists = self
            .sublists
            .iter()
            .map(|factory| factory.bind(task, components))
            .collect();
        Box::new(AlternationOpenList::<StateId>::new(
            open_lists,
            self.boost_amount,
        ))
    }
}
