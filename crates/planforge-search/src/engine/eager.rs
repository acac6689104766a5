//! The eager best-first search engine.

use std::sync::Arc;
use std::time::Duration;

use planforge_core::{
    adjusted_cost, CostType, OperatorId, Plan, PlanningTask, StateRegistry, SuccessorGenerator,
};
use tracing::info;

use crate::component::{ComponentMap, EngineFactory, EvaluatorFactory, OpenListFactory};
use crate::engine::{SearchEngine, SearchStatus};
use crate::error::SearchError;
use crate::evaluation::{EvaluationContext, INFINITY};
use crate::evaluator::{Evaluator, PathDependentSet};
use crate::open_list::StateOpenList;
use crate::ordered_set::OrderedSet;
use crate::progress::SearchProgress;
use crate::pruning::{NullPruning, PruningMethod};
use crate::search_space::{NodeStatus, SearchSpace};
use crate::statistics::SearchStatistics;

/// Options for [`EagerSearch`].
pub struct EagerSearchOptions {
    pub reopen_closed_nodes: bool,
    pub cost_type: CostType,
    /// Exclusive upper bound on real plan cost.
    pub bound: i32,
    pub max_time: Duration,
    /// Evaluators asked for preferred operators at each expansion.
    pub preferred_operator_evaluators: Vec<Arc<dyn Evaluator>>,
    /// Evaluator reported in f-value statistics.
    pub f_evaluator: Option<Arc<dyn Evaluator>>,
    /// Evaluator re-checked when a state leaves the open list; must cache
    /// its estimates.
    pub lazy_evaluator: Option<Arc<dyn Evaluator>>,
    pub pruning: Box<dyn PruningMethod>,
}

impl Default for EagerSearchOptions {
    fn default() -> Self {
        Self {
            reopen_closed_nodes: false,
            cost_type: CostType::Normal,
            bound: INFINITY,
            max_time: Duration::MAX,
            preferred_operator_evaluators: Vec::new(),
            f_evaluator: None,
            lazy_evaluator: None,
            pruning: Box::new(NullPruning::new()),
        }
    }
}

/// Expands one state per step, best-first by the open list's keys.
///
/// Per step: take the minimum entry, skip it if stale, optionally
/// re-evaluate it lazily, close and expand it, and push the surviving
/// successors. A state is expanded at most once unless a cheaper path
/// forces a reopen.
#[derive(Debug)]
pub struct EagerSearch {
    task: Arc<PlanningTask>,
    registry: StateRegistry,
    successor_generator: SuccessorGenerator,
    search_space: SearchSpace,
    statistics: SearchStatistics,
    progress: SearchProgress,
    open_list: StateOpenList,
    preferred_operator_evaluators: Vec<Arc<dyn Evaluator>>,
    f_evaluator: Option<Arc<dyn Evaluator>>,
    lazy_evaluator: Option<Arc<dyn Evaluator>>,
    path_dependent_evaluators: Vec<Arc<dyn Evaluator>>,
    pruning: Box<dyn PruningMethod>,
    reopen_closed_nodes: bool,
    cost_type: CostType,
    is_unit_cost: bool,
    bound: i32,
    max_time: Duration,
    plan: Option<Plan>,
    initialized: bool,
}

impl EagerSearch {
    pub fn new(
        task: Arc<PlanningTask>,
        open_list: StateOpenList,
        options: EagerSearchOptions,
    ) -> Result<Self, SearchError> {
        if let Some(lazy) = &options.lazy_evaluator {
            if !lazy.caches_estimates() {
                return Err(SearchError::Config(format!(
                    "lazy evaluator '{}' must cache its estimates",
                    lazy.description()
                )));
            }
        }
        let registry = StateRegistry::new(Arc::clone(&task));
        let successor_generator = SuccessorGenerator::new(&task);
        let is_unit_cost = task.is_unit_cost();
        Ok(Self {
            task,
            registry,
            successor_generator,
            search_space: SearchSpace::new(),
            statistics: SearchStatistics::new(),
            progress: SearchProgress::new(),
            open_list,
            preferred_operator_evaluators: options.preferred_operator_evaluators,
            f_evaluator: options.f_evaluator,
            lazy_evaluator: options.lazy_evaluator,
            path_dependent_evaluators: Vec::new(),
            pruning: options.pruning,
            reopen_closed_nodes: options.reopen_closed_nodes,
            cost_type: options.cost_type,
            is_unit_cost,
            bound: options.bound,
            max_time: options.max_time,
            plan: None,
            initialized: false,
        })
    }

    fn initialize(&mut self) {
        info!(
            event = "search_started",
            reopen_closed_nodes = self.reopen_closed_nodes,
            bound = self.bound,
        );

        let mut path_dependent = PathDependentSet::new();
        self.open_list
            .get_path_dependent_evaluators(&mut path_dependent);
        for evaluator in &self.preferred_operator_evaluators {
            path_dependent.collect(evaluator);
        }
        if let Some(f_evaluator) = &self.f_evaluator {
            path_dependent.collect(f_evaluator);
        }
        if let Some(lazy_evaluator) = &self.lazy_evaluator {
            path_dependent.collect(lazy_evaluator);
        }
        self.path_dependent_evaluators = path_dependent.into_evaluators();

        let initial_state = self.registry.initial_state();
        for evaluator in &self.path_dependent_evaluators {
            evaluator.notify_initial_state(&initial_state);
        }

        // The initial state counts as reached by a preferred operator.
        let mut ctx = EvaluationContext::new(&initial_state, 0, true, &self.statistics);
        self.statistics.inc_evaluated_states();

        if self.open_list.is_dead_end(&mut ctx) {
            info!(event = "initial_state_dead_end");
        } else {
            if self.progress.check_progress(&ctx) {
                self.statistics.print_checkpoint_line(0);
            }
            if let Some(f_evaluator) = &self.f_evaluator {
                let f = ctx.value_or_infinity(f_evaluator);
                self.statistics.report_f_value_progress(f);
            }
            let id = initial_state.id();
            self.search_space.open_initial(id);
            self.open_list.insert(&mut ctx, id);
        }

        self.pruning.initialize(&self.task);
    }
}

impl SearchEngine for EagerSearch {
    fn step(&mut self) -> Result<SearchStatus, SearchError> {
        if !self.initialized {
            self.initialized = true;
            self.initialize();
        }

        let task = Arc::clone(&self.task);

        // Pull entries until one survives as the expansion candidate.
        let (id, node_g, node_real_g) = loop {
            if self.open_list.is_empty() {
                info!(event = "state_space_exhausted");
                return Ok(SearchStatus::Failed);
            }
            let id = self.open_list.remove_min();
            let state = self.registry.lookup_state(id);
            let node = *self.search_space.node(id);

            if node.status() == NodeStatus::Closed {
                continue;
            }

            let mut ctx = EvaluationContext::new(&state, node.g(), false, &self.statistics);

            if let Some(lazy_evaluator) = &self.lazy_evaluator {
                // Only lazy re-evaluation can leave dead nodes in the open
                // list: a state inserted twice may become a dead end when
                // its first expansion recomputes the estimate.
                if node.status() == NodeStatus::DeadEnd {
                    continue;
                }
                if let Some(old_h) = lazy_evaluator.cached_estimate(&state) {
                    let new_h = ctx.value_or_infinity(lazy_evaluator);
                    if self.open_list.is_dead_end(&mut ctx) {
                        self.search_space.mark_dead_end(id);
                        self.statistics.inc_dead_ends();
                        continue;
                    }
                    if new_h != old_h {
                        // The entry was queued under a stale key.
                        self.open_list.insert(&mut ctx, id);
                        continue;
                    }
                }
            }

            self.search_space.close(id);
            if let Some(f_evaluator) = &self.f_evaluator {
                let f = ctx.value_or_infinity(f_evaluator);
                self.statistics.report_f_value_progress(f);
            }
            self.statistics.inc_expanded();
            break (id, node.g(), node.real_g());
        };

        let state = self.registry.lookup_state(id);
        if task.is_goal(&state) {
            let plan = self.search_space.trace_path(id);
            info!(
                event = "solution_found",
                cost = planforge_core::plan_cost(&plan, &task),
                length = plan.len(),
            );
            self.plan = Some(plan);
            return Ok(SearchStatus::Solved);
        }

        let mut applicable_ops = Vec::new();
        self.successor_generator
            .generate_applicable_ops(&task, &state, &mut applicable_ops);
        self.pruning.prune(&state, &mut applicable_ops);

        // Re-evaluate the expanded state to collect preferred operators.
        let mut preferred_operators: OrderedSet<OperatorId> = OrderedSet::new();
        {
            let mut ctx = EvaluationContext::with_preferred_operators(
                &state,
                node_g,
                false,
                &self.statistics,
            );
            for evaluator in &self.preferred_operator_evaluators {
                if !ctx.is_infinite(evaluator) {
                    for op in ctx.preferred_operators(evaluator) {
                        preferred_operators.insert(op);
                    }
                }
            }
        }

        for op_id in applicable_ops {
            let real_cost = task.operator_cost(op_id);
            if node_real_g + real_cost >= self.bound {
                continue;
            }

            let op = task.operator(op_id);
            let succ_state = self.registry.successor_state(&state, op);
            self.statistics.inc_generated();
            let is_preferred = preferred_operators.contains(&op_id);

            for evaluator in &self.path_dependent_evaluators {
                evaluator.notify_state_transition(&state, op_id, &succ_state);
            }

            let succ_id = succ_state.id();
            let succ_node = *self.search_space.node(succ_id);

            // Previously recognized dead end: do not re-evaluate.
            if succ_node.status() == NodeStatus::DeadEnd {
                continue;
            }

            let adjusted = adjusted_cost(&task, op_id, self.cost_type, self.is_unit_cost);

            if succ_node.status() == NodeStatus::New {
                let succ_g = node_g + adjusted;
                let mut succ_ctx =
                    EvaluationContext::new(&succ_state, succ_g, is_preferred, &self.statistics);
                self.statistics.inc_evaluated_states();

                if self.open_list.is_dead_end(&mut succ_ctx) {
                    self.search_space.mark_dead_end(succ_id);
                    self.statistics.inc_dead_ends();
                    continue;
                }
                self.search_space.open(succ_id, id, op_id, adjusted, real_cost);
                self.open_list.insert(&mut succ_ctx, succ_id);
                if self.progress.check_progress(&succ_ctx) {
                    self.statistics.print_checkpoint_line(succ_g);
                    // Reward the heuristics that made progress.
                    self.open_list.boost_preferred();
                }
            } else if succ_node.g() > node_g + adjusted {
                // New cheapest path to an open or closed state.
                if self.reopen_closed_nodes {
                    if succ_node.status() == NodeStatus::Closed {
                        self.statistics.inc_reopened();
                    }
                    self.search_space
                        .reopen(succ_id, id, op_id, adjusted, real_cost);

                    // Recompute the key from scratch instead of reusing any
                    // stale cached estimate.
                    let new_g = self.search_space.node(succ_id).g();
                    let mut succ_ctx = EvaluationContext::new(
                        &succ_state,
                        new_g,
                        is_preferred,
                        &self.statistics,
                    );
                    self.open_list.insert(&mut succ_ctx, succ_id);
                } else {
                    self.search_space
                        .update_parent(succ_id, id, op_id, adjusted, real_cost);
                }
            }
        }

        Ok(SearchStatus::InProgress)
    }

    fn max_time(&self) -> Duration {
        self.max_time
    }

    fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn set_bound(&mut self, bound: i32) {
        self.bound = bound;
    }

    fn report_statistics(&self) {
        self.statistics.report();
        self.pruning.report_statistics();
        info!(event = "registered_states", count = self.registry.len());
    }
}

/// Task-independent twin of [`EagerSearch`].
#[derive(Debug)]
pub struct EagerSearchFactory {
    open_list: Arc<dyn OpenListFactory>,
    preferred_operator_evaluators: Vec<Arc<dyn EvaluatorFactory>>,
    f_evaluator: Option<Arc<dyn EvaluatorFactory>>,
    lazy_evaluator: Option<Arc<dyn EvaluatorFactory>>,
    reopen_closed_nodes: bool,
    cost_type: CostType,
    bound: i32,
    max_time: Duration,
}

impl EagerSearchFactory {
    pub fn new(open_list: Arc<dyn OpenListFactory>) -> Self {
        Self {
            open_list,
            preferred_operator_evaluators: Vec::new(),
            f_evaluator: None,
            lazy_evaluator: None,
            reopen_closed_nodes: false,
            cost_type: CostType::Normal,
            bound: INFINITY,
            max_time: Duration::MAX,
        }
    }

    pub fn with_preferred_operator_evaluators(
        mut self,
        evaluators: Vec<Arc<dyn EvaluatorFactory>>,
    ) -> Self {
        self.preferred_operator_evaluators = evaluators;
        self
    }

    pub fn with_f_evaluator(mut self, f_evaluator: Arc<dyn EvaluatorFactory>) -> Self {
        self.f_evaluator = Some(f_evaluator);
        self
    }

    pub fn with_lazy_evaluator(mut self, lazy_evaluator: Arc<dyn EvaluatorFactory>) -> Self {
        self.lazy_evaluator = Some(lazy_evaluator);
        self
    }

    pub fn with_reopen_closed_nodes(mut self, reopen: bool) -> Self {
        self.reopen_closed_nodes = reopen;
        self
    }

    pub fn with_cost_type(mut self, cost_type: CostType) -> Self {
        self.cost_type = cost_type;
        self
    }

    pub fn with_bound(mut self, bound: i32) -> Self {
        self.bound = bound;
        self
    }

    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.max_time = max_time;
        self
    }
}

impl EngineFactory for EagerSearchFactory {
    fn bind(
        &self,
        task: &Arc<PlanningTask>,
        components: &mut ComponentMap,
    ) -> Result<Box<dyn SearchEngine>, SearchError> {
        let open_list = self.open_list.bind(task, components);
        let preferred_operator_evaluators = self
            .preferred_operator_evaluators
            .iter()
            .map(|factory| factory.bind(task, components))
            .collect();
        let f_evaluator = self
            .f_evaluator
            .as_ref()
            .map(|factory| factory.bind(task, components));
        let lazy_evaluator = self
            .lazy_evaluator
            .as_ref()
            .map(|factory| factory.bind(task, components));

        let engine = EagerSearch::new(
            Arc::clone(task),
            open_list,
            EagerSearchOptions {
                reopen_closed_nodes: self.reopen_closed_nodes,
                cost_type: self.cost_type,
                bound: self.bound,
                max_time: self.max_time,
                preferred_operator_evaluators,
                f_evaluator,
                lazy_evaluator,
                pruning: Box::new(NullPruning::new()),
            },
        )?;
        Ok(Box::new(engine))
    }
}
