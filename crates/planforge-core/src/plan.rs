//! Plans and plan output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::error::Result;
use crate::task::{OperatorId, PlanningTask};

/// A sequence of operators from the initial state to a goal state.
pub type Plan = Vec<OperatorId>;

/// Total real cost of a plan under the task metric.
pub fn plan_cost(plan: &Plan, task: &PlanningTask) -> i32 {
    plan.iter().map(|&op| task.operator_cost(op)).sum()
}

/// Writes plan files in the conventional `(operator name)` line format.
///
/// An anytime search produces a numbered file per improving plan
/// (`plan.1`, `plan.2`, ...); a single-shot search writes the bare prefix.
#[derive(Debug)]
pub struct PlanManager {
    plan_file_prefix: PathBuf,
    num_generated_plans: usize,
}

impl PlanManager {
    pub fn new(plan_file_prefix: impl Into<PathBuf>) -> Self {
        Self {
            plan_file_prefix: plan_file_prefix.into(),
            num_generated_plans: 0,
        }
    }

    pub fn num_generated_plans(&self) -> usize {
        self.num_generated_plans
    }

    /// Writes `plan` to the next plan file and returns its path.
    pub fn save_plan(
        &mut self,
        plan: &Plan,
        task: &PlanningTask,
        generates_multiple_plans: bool,
    ) -> Result<PathBuf> {
        let path = if generates_multiple_plans {
            let mut name = self.plan_file_prefix.clone().into_os_string();
            name.push(format!(".{}", self.num_generated_plans + 1));
            PathBuf::from(name)
        } else {
            self.plan_file_prefix.clone()
        };

        let file = File::create(&path)?;
        let mut out = BufWriter::new(file);
        for &op in plan {
            writeln!(out, "({})", task.operator(op).name)?;
        }
        let cost = plan_cost(plan, task);
        let cost_kind = if task.is_unit_cost() {
            "unit cost"
        } else {
            "general cost"
        };
        writeln!(out, "; cost = {cost} ({cost_kind})")?;
        out.flush()?;

        self.num_generated_plans += 1;
        Ok(path)
    }
}
