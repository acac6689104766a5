//! Configuration system for PlanForge.
//!
//! Describes a search setup declaratively - evaluators, open lists, and
//! engines - so that runs can be reconfigured without code changes. Configs
//! load from TOML or YAML and are turned into live components by the search
//! crate's builder.
//!
//! # Examples
//!
//! Parse an A* configuration from TOML:
//!
//! ```
//! use planforge_config::{EngineConfig, SearchSpec};
//!
//! let spec = SearchSpec::from_toml_str(r#"
//!     [engine]
//!     type = "astar"
//!     [engine.eval]
//!     type = "goal_count"
//! "#).unwrap();
//!
//! assert!(matches!(spec.engine, EngineConfig::Astar { .. }));
//! ```
//!
//! Share one heuristic between phases by naming it:
//!
//! ```
//! use planforge_config::SearchSpec;
//!
//! let spec = SearchSpec::from_yaml_str(r#"
//!     evaluators:
//!       - name: h
//!         type: goal_count
//!     engine:
//!       type: iterated
//!       pass_bound: true
//!       engines:
//!         - type: wastar
//!           weight: 5
//!           eval: { type: named, name: h }
//!         - type: wastar
//!           weight: 1
//!           eval: { type: named, name: h }
//! "#).unwrap();
//!
//! assert_eq!(spec.evaluators.len(), 1);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A complete search specification: named evaluator definitions plus the
/// engine to run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchSpec {
    /// Evaluator definitions that can be referenced by name. A named
    /// evaluator is instantiated once and shared by every reference.
    #[serde(default)]
    pub evaluators: Vec<NamedEvaluatorConfig>,

    /// The engine to run.
    pub engine: EngineConfig,
}

impl SearchSpec {
    /// Loads a specification from a file, choosing the format by extension
    /// (`.yaml`/`.yml` for YAML, anything else is treated as TOML).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    /// Parses a specification from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parses a specification from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Wraps a bare engine config without named evaluators.
    pub fn from_engine(engine: EngineConfig) -> Self {
        Self {
            evaluators: Vec::new(),
            engine,
        }
    }
}

/// A named evaluator definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct NamedEvaluatorConfig {
    pub name: String,
    #[serde(flatten)]
    pub config: EvaluatorConfig,
}

/// Evaluator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvaluatorConfig {
    /// The g value of the evaluated path.
    G,

    /// Blind heuristic: zero on goal states, cheapest operator cost
    /// otherwise.
    Blind,

    /// Number of unsatisfied goal facts; marks goal-achieving applicable
    /// operators as preferred.
    GoalCount,

    /// A child evaluator scaled by an integer weight.
    Weighted {
        eval: Box<EvaluatorConfig>,
        weight: i32,
    },

    /// Sum of the child evaluators.
    Sum { evals: Vec<EvaluatorConfig> },

    /// Maximum of the child evaluators.
    Max { evals: Vec<EvaluatorConfig> },

    /// Collects preferred operators from the children; value is always zero.
    Pref { evals: Vec<EvaluatorConfig> },

    /// Reference to a named evaluator definition.
    Named { name: String },
}

/// Open list configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenListConfig {
    /// Single-key bucket open list with FIFO tie-breaking.
    BestFirst {
        eval: EvaluatorConfig,
        #[serde(default)]
        pref_only: bool,
    },

    /// Lexicographic multi-key open list.
    TieBreaking {
        evals: Vec<EvaluatorConfig>,
        #[serde(default)]
        pref_only: bool,
    },

    /// Round-robin over sub-open-lists with preferred boosting.
    Alternation {
        lists: Vec<OpenListConfig>,
        #[serde(default = "default_boost")]
        boost: i64,
    },
}

fn default_boost() -> i64 {
    1000
}

/// Options shared by all concrete engines.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineOptions {
    /// How operator costs are presented to the search.
    #[serde(default)]
    pub cost_type: CostTypeConfig,

    /// Upper bound on accepted plan cost (real cost).
    #[serde(default)]
    pub bound: Option<i32>,

    /// Wall-clock limit in seconds.
    #[serde(default)]
    pub max_time_secs: Option<f64>,
}

/// Operator cost transformation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTypeConfig {
    /// Costs as specified by the task metric.
    #[default]
    Normal,
    /// Unit costs.
    One,
    /// Real cost plus one.
    PlusOne,
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineConfig {
    /// A* with full f/h tie-breaking and reopening: shorthand for an eager
    /// search over `tie_breaking([sum([g, eval]), eval])`.
    Astar {
        eval: EvaluatorConfig,
        #[serde(flatten)]
        options: EngineOptions,
    },

    /// Weighted A*: eager search over `best_first(sum([g, weighted(eval, weight)]))`.
    Wastar {
        eval: EvaluatorConfig,
        weight: i32,
        #[serde(default = "default_true")]
        reopen_closed_nodes: bool,
        #[serde(flatten)]
        options: EngineOptions,
    },

    /// Fully configurable eager best-first search.
    Eager {
        open_list: OpenListConfig,
        #[serde(default)]
        reopen_closed_nodes: bool,
        /// Evaluators consulted for preferred operators at each expansion.
        #[serde(default)]
        preferred: Vec<EvaluatorConfig>,
        /// Evaluator reported in f-value statistics.
        #[serde(default)]
        f_eval: Option<EvaluatorConfig>,
        /// Evaluator re-checked when a state is taken from the open list;
        /// must cache its estimates.
        #[serde(default)]
        lazy_eval: Option<EvaluatorConfig>,
        #[serde(flatten)]
        options: EngineOptions,
    },

    /// Runs a sequence of engines, optionally passing the best plan cost to
    /// later phases as a bound.
    Iterated {
        engines: Vec<EngineConfig>,
        #[serde(default = "default_true")]
        pass_bound: bool,
        #[serde(default)]
        repeat_last: bool,
        #[serde(default)]
        continue_on_fail: bool,
        #[serde(default = "default_true")]
        continue_on_solve: bool,
        #[serde(flatten)]
        options: EngineOptions,
    },
}

fn default_true() -> bool {
    true
}

impl EngineConfig {
    /// The common options of this engine.
    pub fn options(&self) -> &EngineOptions {
        match self {
            EngineConfig::Astar { options, .. }
            | EngineConfig::Wastar { options, .. }
            | EngineConfig::Eager { options, .. }
            | EngineConfig::Iterated { options, .. } => options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_astar_roundtrip() {
        let spec = SearchSpec::from_toml_str(
            r#"
            [engine]
            type = "astar"
            bound = 42
            [engine.eval]
            type = "blind"
            "#,
        )
        .unwrap();

        match &spec.engine {
            EngineConfig::Astar { eval, options } => {
                assert!(matches!(eval, EvaluatorConfig::Blind));
                assert_eq!(options.bound, Some(42));
                assert_eq!(options.cost_type, CostTypeConfig::Normal);
            }
            other => panic!("unexpected engine: {other:?}"),
        }
    }

    #[test]
    fn toml_eager_with_alternation() {
        let spec = SearchSpec::from_toml_str(
            r#"
            [engine]
            type = "eager"
            reopen_closed_nodes = false
            cost_type = "one"

            [engine.open_list]
            type = "alternation"
            boost = 500

            [[engine.open_list.lists]]
            type = "best_first"
            [engine.open_list.lists.eval]
            type = "goal_count"

            [[engine.open_list.lists]]
            type = "best_first"
            pref_only = true
            [engine.open_list.lists.eval]
            type = "goal_count"

            [[engine.preferred]]
            type = "goal_count"
            "#,
        )
        .unwrap();

        match &spec.engine {
            EngineConfig::Eager {
                open_list,
                reopen_closed_nodes,
                preferred,
                options,
                ..
            } => {
                assert!(!reopen_closed_nodes);
                assert_eq!(preferred.len(), 1);
                assert_eq!(options.cost_type, CostTypeConfig::One);
                match open_list {
                    OpenListConfig::Alternation { lists, boost } => {
                        assert_eq!(lists.len(), 2);
                        assert_eq!(*boost, 500);
                        assert!(matches!(
                            lists[1],
                            OpenListConfig::BestFirst { pref_only: true, .. }
                        ));
                    }
                    other => panic!("unexpected open list: {other:?}"),
                }
            }
            other => panic!("unexpected engine: {other:?}"),
        }
    }

    #[test]
    fn yaml_iterated_with_named_evaluators() {
        let spec = SearchSpec::from_yaml_str(
            r#"
            evaluators:
              - name: h
                type: weighted
                weight: 2
                eval: { type: goal_count }
            engine:
              type: iterated
              pass_bound: true
              repeat_last: false
              engines:
                - type: wastar
                  weight: 5
                  eval: { type: named, name: h }
                - type: astar
                  eval: { type: named, name: h }
            "#,
        )
        .unwrap();

        assert_eq!(spec.evaluators.len(), 1);
        assert_eq!(spec.evaluators[0].name, "h");
        match &spec.engine {
            EngineConfig::Iterated {
                engines,
                pass_bound,
                continue_on_solve,
                ..
            } => {
                assert_eq!(engines.len(), 2);
                assert!(pass_bound);
                assert!(continue_on_solve);
            }
            other => panic!("unexpected engine: {other:?}"),
        }
    }

    #[test]
    fn defaults_are_applied() {
        let spec = SearchSpec::from_toml_str(
            r#"
            [engine]
            type = "wastar"
            weight = 3
            [engine.eval]
            type = "blind"
            "#,
        )
        .unwrap();

        match &spec.engine {
            EngineConfig::Wastar {
                reopen_closed_nodes,
                options,
                ..
            } => {
                assert!(reopen_closed_nodes);
                assert!(options.bound.is_none());
                assert!(options.max_time_secs.is_none());
            }
            other => panic!("unexpected engine: {other:?}"),
        }
    }
}
