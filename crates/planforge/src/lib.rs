//! PlanForge - a classical planning search engine
//!
//! PlanForge reads a grounded planning task, runs a configurable heuristic
//! best-first search, and writes the resulting plan. The workspace splits
//! into a task-model core, a declarative configuration layer, and the search
//! engines; this crate re-exports the public surface and ships the
//! `planforge` binary.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use planforge::prelude::*;
//!
//! let spec = SearchSpec::from_toml_str(r#"
//!     [engine]
//!     type = "astar"
//!     [engine.eval]
//!     type = "blind"
//! "#).unwrap();
//!
//! # let mut builder = planforge_core::test_utils::TaskBuilder::new();
//! # let v = builder.variable("v", 2);
//! # builder.operator("move", &[(v, 0)], &[(v, 1)], 1);
//! # builder.goal(v, 1);
//! # let task: Arc<PlanningTask> = builder.build();
//! let factory = build_engine_factory(&spec).unwrap();
//! let mut engine = factory.bind_root(&task).unwrap();
//! let status = engine.search().unwrap();
//! assert_eq!(status, SearchStatus::Solved);
//! ```

pub mod console;
pub mod exit_code;

pub use exit_code::ExitCode;

// Task model
pub use planforge_core::{
    plan_cost, CostType, FactPair, Operator, OperatorId, Plan, PlanManager, PlanningTask, State,
    StateId, StateRegistry, TaskError,
};

// Configuration
pub use planforge_config::{ConfigError, EngineConfig, EvaluatorConfig, OpenListConfig, SearchSpec};

// Search layer
pub use planforge_search::{
    build_engine_factory, EngineFactory, EvaluationContext, EvaluationResult, Evaluator,
    OpenList, SearchEngine, SearchError, SearchStatistics, SearchStatus, INFINITY,
};

pub mod prelude {
    pub use crate::{
        build_engine_factory, plan_cost, EngineFactory, PlanManager, PlanningTask, SearchEngine,
        SearchSpec, SearchStatus,
    };
}
