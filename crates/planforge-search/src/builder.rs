//! Wiring from configuration to factories.
//!
//! Converts the declarative [`planforge_config`] types into the factory
//! graph. Named evaluator definitions become shared factory nodes, so every
//! reference to one name binds to the same live evaluator per task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use planforge_config::{
    CostTypeConfig, EngineConfig, EngineOptions, EvaluatorConfig, OpenListConfig, SearchSpec,
};
use planforge_core::CostType;

use crate::component::{EngineFactory, EvaluatorFactory, OpenListFactory};
use crate::engine::{EagerSearchFactory, IteratedSearchFactory, IteratedSearchOptions};
use crate::error::SearchError;
use crate::evaluation::INFINITY;
use crate::evaluator::{
    GEvaluatorFactory, MaxEvaluatorFactory, PrefEvaluatorFactory, SumEvaluatorFactory,
    WeightedEvaluatorFactory,
};
use crate::heuristic::{BlindHeuristicFactory, GoalCountHeuristicFactory};
use crate::open_list::{
    AlternationOpenListFactory, BestFirstOpenListFactory, TieBreakingOpenListFactory,
};

/// Builds the engine factory described by `spec`.
pub fn build_engine_factory(spec: &SearchSpec) -> Result<Arc<dyn EngineFactory>, SearchError> {
    let mut named: HashMap<String, Arc<dyn EvaluatorFactory>> = HashMap::new();
    for definition in &spec.evaluators {
        let factory = build_evaluator(&definition.config, &named)?;
        if named.insert(definition.name.clone(), factory).is_some() {
            return Err(SearchError::Config(format!(
                "duplicate evaluator name '{}'",
                definition.name
            )));
        }
    }
    build_engine(&spec.engine, &named)
}

fn build_evaluator(
    config: &EvaluatorConfig,
    named: &HashMap<String, Arc<dyn EvaluatorFactory>>,
) -> Result<Arc<dyn EvaluatorFactory>, SearchError> {
    Ok(match config {
        EvaluatorConfig::G => Arc::new(GEvaluatorFactory::new()),
        EvaluatorConfig::Blind => Arc::new(BlindHeuristicFactory::new()),
        EvaluatorConfig::GoalCount => Arc::new(GoalCountHeuristicFactory::new()),
        EvaluatorConfig::Weighted { eval, weight } => Arc::new(WeightedEvaluatorFactory::new(
            build_evaluator(eval, named)?,
            *weight,
        )),
        EvaluatorConfig::Sum { evals } => {
            Arc::new(SumEvaluatorFactory::new(build_evaluators(evals, named)?))
        }
        EvaluatorConfig::Max { evals } => {
            Arc::new(MaxEvaluatorFactory::new(build_evaluators(evals, named)?))
        }
        EvaluatorConfig::Pref { evals } => {
            Arc::new(PrefEvaluatorFactory::new(build_evaluators(evals, named)?))
        }
        EvaluatorConfig::Named { name } => named
            .get(name)
            .cloned()
            .ok_or_else(|| SearchError::UnknownEvaluator(name.clone()))?,
    })
}

fn build_evaluators(
    configs: &[EvaluatorConfig],
    named: &HashMap<String, Arc<dyn EvaluatorFactory>>,
) -> Result<Vec<Arc<dyn EvaluatorFactory>>, SearchError> {
    if configs.is_empty() {
        return Err(SearchError::Config(
            "evaluator combination needs at least one child".to_string(),
        ));
    }
    configs
        .iter()
        .map(|config| build_evaluator(config, named))
        .collect()
}

fn build_open_list(
    config: &OpenListConfig,
    named: &HashMap<String, Arc<dyn EvaluatorFactory>>,
) -> Result<Arc<dyn OpenListFactory>, SearchError> {
    Ok(match config {
        OpenListConfig::BestFirst { eval, pref_only } => Arc::new(BestFirstOpenListFactory::new(
            build_evaluator(eval, named)?,
            *pref_only,
        )),
        OpenListConfig::TieBreaking { evals, pref_only } => Arc::new(
            TieBreakingOpenListFactory::new(build_evaluators(evals, named)?, *pref_only),
        ),
        OpenListConfig::Alternation { lists, boost } => {
            if lists.is_empty() {
                return Err(SearchError::Config(
                    "alternation needs at least one sub-open-list".to_string(),
                ));
            }
            let sublists = lists
                .iter()
                .map(|list| build_open_list(list, named))
                .collect::<Result<_, _>>()?;
            Arc::new(AlternationOpenListFactory::new(sublists, *boost))
        }
    })
}

fn build_engine(
    config: &EngineConfig,
    named: &HashMap<String, Arc<dyn EvaluatorFactory>>,
) -> Result<Arc<dyn EngineFactory>, SearchError> {
    Ok(match config {
        EngineConfig::Astar { eval, options } => {
            // astar(h) = eager(tie_breaking([g + h, h]), reopen, f = g + h)
            let h = build_evaluator(eval, named)?;
            let g: Arc<dyn EvaluatorFactory> = Arc::new(GEvaluatorFactory::new());
            let f: Arc<dyn EvaluatorFactory> =
                Arc::new(SumEvaluatorFactory::new(vec![g, Arc::clone(&h)]));
            let open_list = Arc::new(TieBreakingOpenListFactory::new(
                vec![Arc::clone(&f), h],
                false,
            ));
            let (cost_type, bound, max_time) = common_options(options);
            Arc::new(
                EagerSearchFactory::new(open_list)
                    .with_f_evaluator(f)
                    .with_reopen_closed_nodes(true)
                    .with_cost_type(cost_type)
                    .with_bound(bound)
                    .with_max_time(max_time),
            )
        }
        EngineConfig::Wastar {
            eval,
            weight,
            reopen_closed_nodes,
            options,
        } => {
            let h = build_evaluator(eval, named)?;
            let g: Arc<dyn EvaluatorFactory> = Arc::new(GEvaluatorFactory::new());
            let weighted: Arc<dyn EvaluatorFactory> =
                Arc::new(WeightedEvaluatorFactory::new(h, *weight));
            let f: Arc<dyn EvaluatorFactory> =
                Arc::new(SumEvaluatorFactory::new(vec![g, weighted]));
            let open_list = Arc::new(BestFirstOpenListFactory::new(Arc::clone(&f), false));
            let (cost_type, bound, max_time) = common_options(options);
            Arc::new(
                EagerSearchFactory::new(open_list)
                    .with_f_evaluator(f)
                    .with_reopen_closed_nodes(*reopen_closed_nodes)
                    .with_cost_type(cost_type)
                    .with_bound(bound)
                    .with_max_time(max_time),
            )
        }
        EngineConfig::Eager {
            open_list,
            reopen_closed_nodes,
            preferred,
            f_eval,
            lazy_eval,
            options,
        } => {
            let open_list = build_open_list(open_list, named)?;
            let (cost_type, bound, max_time) = common_options(options);
            let mut factory = EagerSearchFactory::new(open_list)
                .with_reopen_closed_nodes(*reopen_closed_nodes)
                .with_cost_type(cost_type)
                .with_bound(bound)
                .with_max_time(max_time)
                .with_preferred_operator_evaluators(build_preferred(preferred, named)?);
            if let Some(f_eval) = f_eval {
                factory = factory.with_f_evaluator(build_evaluator(f_eval, named)?);
            }
            if let Some(lazy_eval) = lazy_eval {
                factory = factory.with_lazy_evaluator(build_evaluator(lazy_eval, named)?);
            }
            Arc::new(factory)
        }
        EngineConfig::Iterated {
            engines,
            pass_bound,
            repeat_last,
            continue_on_fail,
            continue_on_solve,
            options,
        } => {
            if engines.is_empty() {
                return Err(SearchError::Config(
                    "iterated search needs at least one engine".to_string(),
                ));
            }
            let engine_factories = engines
                .iter()
                .map(|engine| build_engine(engine, named))
                .collect::<Result<_, _>>()?;
            let (_, bound, max_time) = common_options(options);
            Arc::new(IteratedSearchFactory::new(
                engine_factories,
                IteratedSearchOptions {
                    pass_bound: *pass_bound,
                    repeat_last_phase: *repeat_last,
                    continue_on_fail: *continue_on_fail,
                    continue_on_solve: *continue_on_solve,
                    bound,
                    max_time,
                },
            ))
        }
    })
}

fn build_preferred(
    configs: &[EvaluatorConfig],
    named: &HashMap<String, Arc<dyn EvaluatorFactory>>,
) -> Result<Vec<Arc<dyn EvaluatorFactory>>, SearchError> {
    configs
        .iter()
        .map(|config| build_evaluator(config, named))
        .collect()
}

fn common_options(options: &EngineOptions) -> (CostType, i32, Duration) {
    let cost_type = match options.cost_type {
        CostTypeConfig::Normal => CostType::Normal,
        CostTypeConfig::One => CostType::One,
        CostTypeConfig::PlusOne => CostType::PlusOne,
    };
    let bound = options.bound.unwrap_or(INFINITY);
    let max_time = options
        .max_time_secs
        .map(Duration::from_secs_f64)
        .unwrap_or(Duration::MAX);
    (cost_type, bound, max_time)
}
