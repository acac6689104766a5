//! Error types for search construction and execution.

use thiserror::Error;

/// Main error type for the search layer.
///
/// Construction errors are fatal: they surface before the search starts and
/// terminate the run with an input-error exit code. Recoverable conditions
/// (dead ends, stale open-list entries) never appear here.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid engine or evaluator configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A named evaluator reference without a definition.
    #[error("unknown evaluator '{0}'")]
    UnknownEvaluator(String),

    /// Failed to write a plan file.
    #[error("failed to write plan file: {0}")]
    PlanOutput(#[from] planforge_core::TaskError),
}
