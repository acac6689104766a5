//! Applicable-operator enumeration.

use crate::state::State;
use crate::task::{OperatorId, PlanningTask};

/// Enumerates the operators applicable in a state.
///
/// Operators are indexed by their first precondition so that most candidates
/// can be dismissed without a full precondition check; operators without
/// preconditions are always candidates. Results are reported in ascending
/// [`OperatorId`] order, which fixes the expansion order within a state.
#[derive(Debug)]
pub struct SuccessorGenerator {
    /// `[var][value]` buckets of operators whose first precondition is var=value.
    by_first_precondition: Vec<Vec<Vec<OperatorId>>>,
    /// Operators without preconditions.
    unconditional: Vec<OperatorId>,
}

impl SuccessorGenerator {
    pub fn new(task: &PlanningTask) -> Self {
        let mut by_first_precondition: Vec<Vec<Vec<OperatorId>>> = (0..task.num_variables())
            .map(|var| vec![Vec::new(); task.domain_size(var) as usize])
            .collect();
        let mut unconditional = Vec::new();

        for (index, op) in task.operators().iter().enumerate() {
            let id = OperatorId::new(index);
            match op.preconditions.first() {
                Some(fact) => {
                    by_first_precondition[fact.var][fact.value as usize].push(id);
                }
                None => unconditional.push(id),
            }
        }

        Self {
            by_first_precondition,
            unconditional,
        }
    }

    /// Appends all operators applicable in `state` to `applicable_ops`.
    pub fn generate_applicable_ops(
        &self,
        task: &PlanningTask,
        state: &State,
        applicable_ops: &mut Vec<OperatorId>,
    ) {
        let start = applicable_ops.len();
        applicable_ops.extend(
            self.unconditional
                .iter()
                .copied()
                .filter(|&id| task.operator(id).is_applicable(state)),
        );
        for (var, buckets) in self.by_first_precondition.iter().enumerate() {
            let value = state.value(var) as usize;
            applicable_ops.extend(
                buckets[value]
                    .iter()
                    .copied()
                    .filter(|&id| task.operator(id).is_applicable(state)),
            );
        }
        applicable_ops[start..].sort_unstable();
    }
}
