use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use planforge_core::test_utils::TaskBuilder;
use planforge_core::{plan_cost, PlanningTask, State};

use super::*;
use crate::component::{component_key, ComponentMap, EngineFactory, EvaluatorFactory};
use crate::evaluation::{EvaluationContext, EvaluationResult, INFINITY};
use crate::evaluator::test_support::{RecordingEvaluator, TableHeuristic};
use crate::evaluator::{
    next_evaluator_id, Evaluator, EvaluatorId, GEvaluatorFactory, GEvaluator, SumEvaluator,
    SumEvaluatorFactory, WeightedEvaluatorFactory,
};
use crate::heuristic::{BlindHeuristic, EstimateCache};
use crate::open_list::{
    AlternationOpenList, BestFirstOpenList, BestFirstOpenListFactory, OpenList,
    TieBreakingOpenList,
};
use crate::StateOpenList;

/// A*: tie-breaking on [g + h, h] with reopening and f statistics.
fn astar(task: &Arc<PlanningTask>, h: Arc<dyn Evaluator>, reopen: bool) -> EagerSearch {
    let g: Arc<dyn Evaluator> = Arc::new(GEvaluator::new());
    let f: Arc<dyn Evaluator> = Arc::new(SumEvaluator::new(vec![g, Arc::clone(&h)]));
    let open: StateOpenList = Box::new(TieBreakingOpenList::new(vec![Arc::clone(&f), h], false));
    EagerSearch::new(
        Arc::clone(task),
        open,
        EagerSearchOptions {
            reopen_closed_nodes: reopen,
            f_evaluator: Some(f),
            ..Default::default()
        },
    )
    .expect("valid engine")
}

fn unit_chain(length: i32) -> Arc<PlanningTask> {
    let mut builder = TaskBuilder::new();
    let pos = builder.variable("pos", length + 1);
    for i in 0..length {
        builder.operator(&format!("step{i}"), &[(pos, i)], &[(pos, i + 1)], 1);
    }
    builder.goal(pos, length);
    builder.build()
}

#[test]
fn trivial_task_solves_with_empty_plan() {
    let mut builder = TaskBuilder::new();
    let v = builder.variable("v", 2);
    builder.goal(v, 0);
    let task = builder.build();

    let h: Arc<dyn Evaluator> = Arc::new(BlindHeuristic::new(Arc::clone(&task)));
    let mut engine = astar(&task, h, true);

    let status = engine.search().unwrap();
    assert_eq!(status, SearchStatus::Solved);
    assert_eq!(engine.plan().unwrap().len(), 0);
    assert_eq!(engine.statistics().expanded(), 1);
}

#[test]
fn unit_cost_chain_finds_cost_five_plan() {
    let task = unit_chain(5);
    let h: Arc<dyn Evaluator> = Arc::new(BlindHeuristic::new(Arc::clone(&task)));
    let mut engine = astar(&task, h, true);

    let status = engine.search().unwrap();
    assert_eq!(status, SearchStatus::Solved);
    let plan = engine.plan().unwrap();
    assert_eq!(plan.len(), 5);
    assert_eq!(plan_cost(plan, &task), 5);
    // Expansions never exceed the state space.
    assert!(engine.statistics().expanded() <= 6);
}

#[test]
fn dead_end_branch_is_marked_and_avoided() {
    // S -doom-> D (dead end), S -> M -> G at total cost 3.
    let mut builder = TaskBuilder::new();
    let pos = builder.variable("pos", 4);
    builder.operator("doom", &[(pos, 0)], &[(pos, 1)], 1);
    builder.operator("out", &[(pos, 0)], &[(pos, 2)], 1);
    builder.operator("home", &[(pos, 2)], &[(pos, 3)], 2);
    builder.goal(pos, 3);
    let task = builder.build();

    let h: Arc<dyn Evaluator> = Arc::new(TableHeuristic::new(&[(&[1], INFINITY)], 0));
    let mut engine = astar(&task, h, true);

    let status = engine.search().unwrap();
    assert_eq!(status, SearchStatus::Solved);
    assert_eq!(plan_cost(engine.plan().unwrap(), &task), 3);
    assert_eq!(engine.statistics().dead_ends(), 1);
    // The dead end is never expanded.
    assert!(engine.statistics().expanded() <= 3);
}

/// Graph where an inadmissible heuristic closes a node at g=10 before the
/// g=7 path through the detour shows up.
fn reopening_task() -> (Arc<PlanningTask>, Arc<dyn Evaluator>) {
    let mut builder = TaskBuilder::new();
    let pos = builder.variable("pos", 4);
    builder.operator("direct", &[(pos, 0)], &[(pos, 1)], 10);
    builder.operator("detour", &[(pos, 0)], &[(pos, 2)], 1);
    builder.operator("shortcut", &[(pos, 2)], &[(pos, 1)], 6);
    builder.operator("finish", &[(pos, 1)], &[(pos, 3)], 0);
    builder.goal(pos, 3);
    let task = builder.build();

    // Overestimates the detour so it is expanded after the direct route.
    let h: Arc<dyn Evaluator> = Arc::new(
        TableHeuristic::new(&[(&[0], 0), (&[1], 0), (&[2], 10), (&[3], 15)], 0).unreliable(),
    );
    (task, h)
}

#[test]
fn cheaper_path_reopens_closed_node() {
    let (task, h) = reopening_task();
    let mut engine = astar(&task, h, true);

    let status = engine.search().unwrap();
    assert_eq!(status, SearchStatus::Solved);
    assert_eq!(plan_cost(engine.plan().unwrap(), &task), 7);
    assert_eq!(engine.statistics().reopened(), 1);
}

#[test]
fn without_reopening_each_state_expands_at_most_once() {
    let (task, h) = reopening_task();
    let mut engine = astar(&task, h, false);

    let status = engine.search().unwrap();
    assert_eq!(status, SearchStatus::Solved);
    assert_eq!(engine.statistics().reopened(), 0);
    // Four states, no re-expansion.
    assert_eq!(engine.statistics().expanded(), 4);
}

#[test]
fn admissible_heuristic_with_reopening_is_optimal() {
    // Two routes: cost 11 found first by expansion order, cost 5 optimal.
    let mut builder = TaskBuilder::new();
    let pos = builder.variable("pos", 4);
    builder.operator("left", &[(pos, 0)], &[(pos, 1)], 1);
    builder.operator("right", &[(pos, 0)], &[(pos, 2)], 4);
    builder.operator("left_goal", &[(pos, 1)], &[(pos, 3)], 10);
    builder.operator("right_goal", &[(pos, 2)], &[(pos, 3)], 1);
    builder.goal(pos, 3);
    let task = builder.build();

    let h: Arc<dyn Evaluator> = Arc::new(BlindHeuristic::new(Arc::clone(&task)));
    let mut engine = astar(&task, h, true);

    assert_eq!(engine.search().unwrap(), SearchStatus::Solved);
    assert_eq!(plan_cost(engine.plan().unwrap(), &task), 5);
}

#[test]
fn initial_dead_end_fails_without_expansion() {
    let task = unit_chain(2);
    let h: Arc<dyn Evaluator> = Arc::new(TableHeuristic::new(&[], INFINITY));
    let mut engine = astar(&task, h, true);

    let status = engine.search().unwrap();
    assert_eq!(status, SearchStatus::Failed);
    assert_eq!(engine.statistics().expanded(), 0);
    assert_eq!(engine.statistics().evaluated_states(), 1);
    assert!(engine.plan().is_none());
}

#[test]
fn zero_bound_still_solves_a_goal_initial_state() {
    let mut builder = TaskBuilder::new();
    let v = builder.variable("v", 2);
    builder.operator("away", &[(v, 0)], &[(v, 1)], 1);
    builder.goal(v, 0);
    let task = builder.build();

    let h: Arc<dyn Evaluator> = Arc::new(BlindHeuristic::new(Arc::clone(&task)));
    let g: Arc<dyn Evaluator> = Arc::new(GEvaluator::new());
    let f: Arc<dyn Evaluator> = Arc::new(SumEvaluator::new(vec![g, Arc::clone(&h)]));
    let open: StateOpenList = Box::new(TieBreakingOpenList::new(vec![f, h], false));
    let mut engine = EagerSearch::new(
        Arc::clone(&task),
        open,
        EagerSearchOptions {
            reopen_closed_nodes: true,
            bound: 0,
            ..Default::default()
        },
    )
    .unwrap();

    let status = engine.search().unwrap();
    assert_eq!(status, SearchStatus::Solved);
    assert!(engine.plan().unwrap().is_empty());
}

#[test]
fn zero_time_budget_reports_timeout() {
    let task = unit_chain(5);
    let h: Arc<dyn Evaluator> = Arc::new(BlindHeuristic::new(Arc::clone(&task)));
    let g: Arc<dyn Evaluator> = Arc::new(GEvaluator::new());
    let f: Arc<dyn Evaluator> = Arc::new(SumEvaluator::new(vec![g, Arc::clone(&h)]));
    let open: StateOpenList = Box::new(TieBreakingOpenList::new(vec![f, h], false));
    let mut engine = EagerSearch::new(
        Arc::clone(&task),
        open,
        EagerSearchOptions {
            reopen_closed_nodes: true,
            max_time: Duration::ZERO,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(engine.search().unwrap(), SearchStatus::Timeout);
    assert!(engine.plan().is_none());
}

#[test]
fn path_dependent_evaluators_see_every_transition() {
    let task = unit_chain(3);
    let recorder = Arc::new(RecordingEvaluator::new());
    let recorder_dyn: Arc<dyn Evaluator> = Arc::clone(&recorder) as Arc<dyn Evaluator>;

    let h: Arc<dyn Evaluator> = Arc::new(BlindHeuristic::new(Arc::clone(&task)));
    let g: Arc<dyn Evaluator> = Arc::new(GEvaluator::new());
    let f: Arc<dyn Evaluator> = Arc::new(SumEvaluator::new(vec![g, Arc::clone(&h)]));
    let open: StateOpenList = Box::new(TieBreakingOpenList::new(vec![f, h], false));
    let mut engine = EagerSearch::new(
        Arc::clone(&task),
        open,
        EagerSearchOptions {
            reopen_closed_nodes: true,
            preferred_operator_evaluators: vec![recorder_dyn],
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(engine.search().unwrap(), SearchStatus::Solved);

    let initial_states = recorder.initial_states.lock().unwrap();
    assert_eq!(initial_states.as_slice(), &[vec![0]]);

    // One notification per generated successor, in generation order along
    // the chain.
    let transitions = recorder.transitions.lock().unwrap();
    assert_eq!(transitions.len() as u64, engine.statistics().generated());
    assert_eq!(transitions[0].0, vec![0]);
    assert_eq!(transitions[0].2, vec![1]);
}

#[test]
fn preferred_boosted_alternation_solves_with_preferred_operators() {
    let mut builder = TaskBuilder::new();
    let a = builder.variable("a", 2);
    let b = builder.variable("b", 2);
    builder.operator("set_a", &[(a, 0)], &[(a, 1)], 1);
    builder.operator("set_b", &[(b, 0)], &[(b, 1)], 1);
    builder.goal(a, 1);
    builder.goal(b, 1);
    let task = builder.build();

    let h: Arc<dyn Evaluator> =
        Arc::new(crate::heuristic::GoalCountHeuristic::new(Arc::clone(&task)));
    let regular: Box<dyn OpenList<planforge_core::StateId>> =
        Box::new(BestFirstOpenList::new(Arc::clone(&h), false));
    let preferred_only: Box<dyn OpenList<planforge_core::StateId>> =
        Box::new(BestFirstOpenList::new(Arc::clone(&h), true));
    let open: StateOpenList = Box::new(AlternationOpenList::new(
        vec![regular, preferred_only],
        1000,
    ));

    let mut engine = EagerSearch::new(
        Arc::clone(&task),
        open,
        EagerSearchOptions {
            preferred_operator_evaluators: vec![h],
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(engine.search().unwrap(), SearchStatus::Solved);
    assert_eq!(plan_cost(engine.plan().unwrap(), &task), 2);
}

/// Heuristic whose values the test mutates between steps; caches estimates
/// so it is valid as a lazy evaluator.
#[derive(Debug)]
struct MutableHeuristic {
    id: EvaluatorId,
    values: Arc<Mutex<HashMap<Vec<i32>, i32>>>,
    cache: EstimateCache,
}

impl MutableHeuristic {
    fn new(values: Arc<Mutex<HashMap<Vec<i32>, i32>>>) -> Self {
        Self {
            id: next_evaluator_id(),
            values,
            cache: EstimateCache::new(),
        }
    }
}

impl Evaluator for MutableHeuristic {
    fn id(&self) -> EvaluatorId {
        self.id
    }

    fn description(&self) -> &str {
        "mutable"
    }

    fn compute(&self, ctx: &mut EvaluationContext<'_>) -> EvaluationResult {
        let state = ctx.state();
        let value = self
            .values
            .lock()
            .unwrap()
            .get(state.values())
            .copied()
            .unwrap_or(0);
        self.cache.insert(state.id(), value);
        EvaluationResult::new(value)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }

    fn caches_estimates(&self) -> bool {
        true
    }

    fn is_estimate_cached(&self, state: &State) -> bool {
        self.cache.contains(state.id())
    }

    fn cached_estimate(&self, state: &State) -> Option<i32> {
        self.cache.get(state.id())
    }
}

#[test]
fn lazy_evaluator_must_cache_estimates() {
    let task = unit_chain(1);
    let g: Arc<dyn Evaluator> = Arc::new(GEvaluator::new());
    let open: StateOpenList = Box::new(BestFirstOpenList::new(Arc::clone(&g), false));

    let result = EagerSearch::new(
        Arc::clone(&task),
        open,
        EagerSearchOptions {
            lazy_evaluator: Some(g),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(crate::SearchError::Config(_))));
}

#[test]
fn lazy_reevaluation_catches_estimates_gone_infinite() {
    // S -> T -> G; after T is queued its estimate turns infinite, so the
    // lazy re-check must mark it dead and the search must fail.
    let task = unit_chain(2);
    let values: Arc<Mutex<HashMap<Vec<i32>, i32>>> = Arc::new(Mutex::new(HashMap::new()));
    let h: Arc<dyn Evaluator> = Arc::new(MutableHeuristic::new(Arc::clone(&values)));
    let open: StateOpenList = Box::new(BestFirstOpenList::new(Arc::clone(&h), false));

    let mut engine = EagerSearch::new(
        Arc::clone(&task),
        open,
        EagerSearchOptions {
            lazy_evaluator: Some(h),
            ..Default::default()
        },
    )
    .unwrap();

    // Expand S; T enters the open list with a finite cached estimate.
    assert_eq!(engine.step().unwrap(), SearchStatus::InProgress);

    values.lock().unwrap().insert(vec![1], INFINITY);

    // T is pulled, re-evaluated, found dead; the frontier empties out.
    let status = engine.step().unwrap();
    assert_eq!(status, SearchStatus::Failed);
    assert_eq!(engine.statistics().dead_ends(), 1);
}

#[test]
fn lazy_reevaluation_requeues_stale_keys() {
    // The estimate of T rises from 0 to 5 after queueing; the lazy check
    // re-inserts it under the fresh key instead of expanding it.
    let task = unit_chain(2);
    let values: Arc<Mutex<HashMap<Vec<i32>, i32>>> = Arc::new(Mutex::new(HashMap::new()));
    let h: Arc<dyn Evaluator> = Arc::new(MutableHeuristic::new(Arc::clone(&values)));
    let open: StateOpenList = Box::new(BestFirstOpenList::new(Arc::clone(&h), false));

    let mut engine = EagerSearch::new(
        Arc::clone(&task),
        open,
        EagerSearchOptions {
            lazy_evaluator: Some(h),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(engine.step().unwrap(), SearchStatus::InProgress);
    values.lock().unwrap().insert(vec![1], 5);

    // The stale entry is re-queued, then expanded under the new key; the
    // search still completes.
    assert_eq!(engine.search().unwrap(), SearchStatus::Solved);
    assert_eq!(plan_cost(engine.plan().unwrap(), &task), 2);
}

/// Evaluator factory handing out one fixed evaluator instance.
#[derive(Debug)]
struct FixedEvaluatorFactory(Arc<dyn Evaluator>);

impl EvaluatorFactory for FixedEvaluatorFactory {
    fn description(&self) -> &str {
        "fixed"
    }

    fn bind(
        &self,
        _task: &Arc<PlanningTask>,
        components: &mut ComponentMap,
    ) -> Arc<dyn Evaluator> {
        components.get_or_bind(component_key(self), |_| Arc::clone(&self.0))
    }
}

fn wastar_factory(h: Arc<dyn EvaluatorFactory>, weight: i32) -> Arc<dyn EngineFactory> {
    let g: Arc<dyn EvaluatorFactory> = Arc::new(GEvaluatorFactory::new());
    let weighted: Arc<dyn EvaluatorFactory> = Arc::new(WeightedEvaluatorFactory::new(h, weight));
    let f: Arc<dyn EvaluatorFactory> = Arc::new(SumEvaluatorFactory::new(vec![g, weighted]));
    let open_list = Arc::new(BestFirstOpenListFactory::new(Arc::clone(&f), false));
    Arc::new(
        EagerSearchFactory::new(open_list)
            .with_f_evaluator(f)
            .with_reopen_closed_nodes(true),
    )
}

/// Diamond with an expensive route the weighted search prefers and a cheap
/// route only the second phase finds.
fn bound_passing_task() -> (Arc<PlanningTask>, Arc<dyn Evaluator>) {
    let mut builder = TaskBuilder::new();
    let pos = builder.variable("pos", 4);
    builder.operator("up", &[(pos, 0)], &[(pos, 1)], 10);
    builder.operator("up_goal", &[(pos, 1)], &[(pos, 3)], 10);
    builder.operator("down", &[(pos, 0)], &[(pos, 2)], 5);
    builder.operator("down_goal", &[(pos, 2)], &[(pos, 3)], 5);
    builder.goal(pos, 3);
    let task = builder.build();

    let h: Arc<dyn Evaluator> =
        Arc::new(TableHeuristic::new(&[(&[2], 10)], 0).unreliable());
    (task, h)
}

#[test]
fn iterated_search_passes_bounds_between_phases() {
    let (task, h) = bound_passing_task();
    let h_factory: Arc<dyn EvaluatorFactory> = Arc::new(FixedEvaluatorFactory(h));

    let mut engine = IteratedSearch::new(
        Arc::clone(&task),
        vec![
            wastar_factory(Arc::clone(&h_factory), 5),
            wastar_factory(h_factory, 1),
        ],
        IteratedSearchOptions {
            pass_bound: true,
            ..Default::default()
        },
    )
    .unwrap();

    // Phase 1 (w=5) is misled to the cost-20 route; phase 2 (w=1) runs
    // under bound 20, where the expensive route is pruned away.
    let status = engine.search().unwrap();
    assert_eq!(status, SearchStatus::Solved);
    assert_eq!(plan_cost(engine.plan().unwrap(), &task), 10);
}

#[test]
fn iterated_search_fails_when_no_phase_solves() {
    let mut builder = TaskBuilder::new();
    let v = builder.variable("v", 2);
    builder.goal(v, 1);
    let task = builder.build();

    let h: Arc<dyn Evaluator> = Arc::new(BlindHeuristic::new(Arc::clone(&task)));
    let h_factory: Arc<dyn EvaluatorFactory> = Arc::new(FixedEvaluatorFactory(h));

    let mut engine = IteratedSearch::new(
        Arc::clone(&task),
        vec![wastar_factory(h_factory, 1)],
        IteratedSearchOptions::default(),
    )
    .unwrap();

    assert_eq!(engine.search().unwrap(), SearchStatus::Failed);
    assert!(engine.plan().is_none());
}

#[test]
fn repeat_last_phase_stops_after_an_unimproving_run() {
    let (task, h) = bound_passing_task();
    let h_factory: Arc<dyn EvaluatorFactory> = Arc::new(FixedEvaluatorFactory(h));

    let mut engine = IteratedSearch::new(
        Arc::clone(&task),
        vec![wastar_factory(h_factory, 1)],
        IteratedSearchOptions {
            pass_bound: true,
            repeat_last_phase: true,
            ..Default::default()
        },
    )
    .unwrap();

    // Phase 1 finds the optimum; the repeated phase runs under that bound,
    // finds nothing cheaper, and the repetition ends with the plan kept.
    let status = engine.search().unwrap();
    assert_eq!(status, SearchStatus::Solved);
    assert_eq!(plan_cost(engine.plan().unwrap(), &task), 10);
}
