//! Operator pruning at expansion time.

use std::fmt;
use std::sync::Arc;

use planforge_core::{OperatorId, PlanningTask, State};
use tracing::info;

/// Filters the applicable operators of a state before expansion.
///
/// Pruning runs after the successor generator and before preferred-operator
/// collection, so preferred operators are always a subset of the pruned set.
pub trait PruningMethod: fmt::Debug + Send {
    /// Called once with the task before the search starts.
    fn initialize(&mut self, task: &Arc<PlanningTask>);

    /// Removes operators from `ops` that need not be considered in `state`.
    fn prune(&self, state: &State, ops: &mut Vec<OperatorId>);

    /// Logs pruning statistics at the end of the search.
    fn report_statistics(&self) {}
}

/// Pruning method that prunes nothing.
#[derive(Debug, Default)]
pub struct NullPruning;

impl NullPruning {
    pub fn new() -> Self {
        Self
    }
}

impl PruningMethod for NullPruning {
    fn initialize(&mut self, _task: &Arc<PlanningTask>) {
        info!(event = "pruning_method", method = "none");
    }

    fn prune(&self, _state: &State, _ops: &mut Vec<OperatorId>) {}
}
