//! Operator cost adjustment.
//!
//! Searches can run on transformed costs (unit, plus-one) while bound
//! checking and plan scoring always use the real task metric.

use crate::task::{OperatorId, PlanningTask};

/// How operator costs are presented to the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CostType {
    /// Costs as specified by the task metric.
    #[default]
    Normal,
    /// Every operator costs one.
    One,
    /// Every operator costs its real cost plus one.
    ///
    /// On unit-cost tasks this degenerates to [`CostType::One`] so that
    /// unit-cost heuristics keep their guarantees.
    PlusOne,
}

/// The cost of `op` as seen by a search running with `cost_type`.
pub fn adjusted_cost(
    task: &PlanningTask,
    op: OperatorId,
    cost_type: CostType,
    is_unit_cost: bool,
) -> i32 {
    match cost_type {
        CostType::Normal => task.operator_cost(op),
        CostType::One => 1,
        CostType::PlusOne => {
            if is_unit_cost {
                1
            } else {
                task.operator_cost(op) + 1
            }
        }
    }
}
