//! The iterated meta-engine: a sequence of searches with bound passing.

use std::sync::Arc;
use std::time::Duration;

use planforge_core::{plan_cost, Plan, PlanManager, PlanningTask};
use tracing::info;

use crate::component::{ComponentMap, EngineFactory};
use crate::engine::{SearchEngine, SearchStatus};
use crate::error::SearchError;
use crate::evaluation::INFINITY;
use crate::statistics::SearchStatistics;

/// Options for [`IteratedSearch`].
#[derive(Debug, Clone)]
pub struct IteratedSearchOptions {
    /// Give each phase the best plan cost found so far as its bound.
    pub pass_bound: bool,
    /// After the last configured phase, keep re-running it as long as it
    /// keeps finding solutions.
    pub repeat_last_phase: bool,
    /// Keep going when a phase fails.
    pub continue_on_fail: bool,
    /// Keep going when a phase solves.
    pub continue_on_solve: bool,
    /// Initial cost bound (exclusive, real cost).
    pub bound: i32,
    pub max_time: Duration,
}

impl Default for IteratedSearchOptions {
    fn default() -> Self {
        Self {
            pass_bound: true,
            repeat_last_phase: false,
            continue_on_fail: false,
            continue_on_solve: true,
            bound: INFINITY,
            max_time: Duration::MAX,
        }
    }
}

/// Runs engine phases in sequence, keeping the cheapest plan.
///
/// Phases are bound lazily: each step materializes the next engine from its
/// factory with a fresh component map, runs it to completion, and folds its
/// statistics. With `pass_bound`, later phases only accept strictly cheaper
/// plans, so an anytime sequence of weighted searches converges on plan
/// quality.
#[derive(Debug)]
pub struct IteratedSearch {
    task: Arc<PlanningTask>,
    engine_factories: Vec<Arc<dyn EngineFactory>>,
    pass_bound: bool,
    repeat_last_phase: bool,
    continue_on_fail: bool,
    continue_on_solve: bool,
    phase: usize,
    last_phase_found_solution: bool,
    iterated_found_solution: bool,
    best_bound: i32,
    max_time: Duration,
    plan: Option<Plan>,
    plan_manager: Option<PlanManager>,
    statistics: SearchStatistics,
}

impl IteratedSearch {
    pub fn new(
        task: Arc<PlanningTask>,
        engine_factories: Vec<Arc<dyn EngineFactory>>,
        options: IteratedSearchOptions,
    ) -> Result<Self, SearchError> {
        if engine_factories.is_empty() {
            return Err(SearchError::Config(
                "iterated search needs at least one engine".to_string(),
            ));
        }
        Ok(Self {
            task,
            engine_factories,
            pass_bound: options.pass_bound,
            repeat_last_phase: options.repeat_last_phase,
            continue_on_fail: options.continue_on_fail,
            continue_on_solve: options.continue_on_solve,
            phase: 0,
            last_phase_found_solution: false,
            iterated_found_solution: false,
            best_bound: options.bound,
            max_time: options.max_time,
            plan: None,
            plan_manager: None,
            statistics: SearchStatistics::new(),
        })
    }

    /// Writes every improving plan through `manager` as it is found.
    pub fn with_plan_manager(mut self, manager: PlanManager) -> Self {
        self.plan_manager = Some(manager);
        self
    }

    fn create_current_phase(&self) -> Result<Option<Box<dyn SearchEngine>>, SearchError> {
        let factory = if self.phase < self.engine_factories.len() {
            &self.engine_factories[self.phase]
        } else if self.repeat_last_phase && self.last_phase_found_solution {
            // Without a solution last time, rerunning the same
            // deterministic search would just repeat itself, so a failed
            // last phase ends the repetition regardless of
            // continue_on_fail.
            self.engine_factories
                .last()
                .expect("factories are non-empty")
        } else {
            return Ok(None);
        };
        info!(event = "phase_started", phase = self.phase);
        factory.bind_root(&self.task).map(Some)
    }

    fn step_return_value(&self) -> SearchStatus {
        if self.iterated_found_solution {
            info!(event = "best_solution_cost", cost = self.best_bound);
        }
        if self.last_phase_found_solution {
            if self.continue_on_solve {
                info!(event = "phase_solved_continuing");
                SearchStatus::InProgress
            } else {
                info!(event = "phase_solved_stopping");
                SearchStatus::Solved
            }
        } else if self.continue_on_fail {
            info!(event = "phase_failed_continuing");
            SearchStatus::InProgress
        } else {
            info!(event = "phase_failed_stopping");
            if self.iterated_found_solution {
                SearchStatus::Solved
            } else {
                SearchStatus::Failed
            }
        }
    }
}

impl SearchEngine for IteratedSearch {
    fn step(&mut self) -> Result<SearchStatus, SearchError> {
        let Some(mut current_search) = self.create_current_phase()? else {
            return Ok(if self.iterated_found_solution {
                SearchStatus::Solved
            } else {
                SearchStatus::Failed
            });
        };
        if self.pass_bound {
            current_search.set_bound(self.best_bound);
        }
        self.phase += 1;

        current_search.search()?;

        self.last_phase_found_solution = current_search.found_solution();
        if let Some(found_plan) = current_search.plan() {
            self.iterated_found_solution = true;
            let cost = plan_cost(found_plan, &self.task);
            if cost < self.best_bound {
                let found_plan = found_plan.clone();
                if let Some(manager) = &mut self.plan_manager {
                    manager.save_plan(&found_plan, &self.task, true)?;
                }
                self.best_bound = cost;
                self.plan = Some(found_plan);
                info!(event = "improved_plan", cost);
            }
        }

        current_search.report_statistics();
        self.statistics.add(current_search.statistics());

        Ok(self.step_return_value())
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
        self.best_bound = bound;
    }

    fn report_statistics(&self) {
        info!(event = "cumulative_statistics");
        self.statistics.report();
    }
}

/// Task-independent twin of [`IteratedSearch`].
#[derive(Debug)]
pub struct IteratedSearchFactory {
    engine_factories: Vec<Arc<dyn EngineFactory>>,
    options: IteratedSearchOptions,
}

impl IteratedSearchFactory {
    pub fn new(
        engine_factories: Vec<Arc<dyn EngineFactory>>,
        options: IteratedSearchOptions,
    ) -> Self {
        Self {
            engine_factories,
            options,
        }
    }
}

impl EngineFactory for IteratedSearchFactory {
    fn bind(
        &self,
        task: &Arc<PlanningTask>,
        _components: &mut ComponentMap,
    ) -> Result<Box<dyn SearchEngine>, SearchError> {
        // Phase factories bind lazily, each with a fresh component map, so
        // the parent map is not consulted.
        let engine = IteratedSearch::new(
            Arc::clone(task),
            self.engine_factories.clone(),
            self.options.clone(),
        )?;
        Ok(Box::new(engine))
    }
}
