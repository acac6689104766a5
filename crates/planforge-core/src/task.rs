//! The planning task: variables, operators, axioms, initial state, and goal.
//!
//! A [`PlanningTask`] is the read-only oracle the search layer works against.
//! It is built once (by the parser or by [`crate::test_utils::TaskBuilder`])
//! and then shared immutably via `Arc`.

use std::fmt;

use smallvec::SmallVec;

use crate::error::{Result, TaskError};
use crate::state::State;

/// A single `variable = value` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactPair {
    pub var: usize,
    pub value: i32,
}

impl FactPair {
    pub fn new(var: usize, value: i32) -> Self {
        Self { var, value }
    }
}

impl fmt::Display for FactPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.var, self.value)
    }
}

/// Identifies an operator by its position in the task's operator list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(usize);

impl OperatorId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

/// A state variable with a finite domain.
///
/// Derived variables carry an `axiom_layer >= 0` and a default value that
/// axiom evaluation starts from.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub domain_size: i32,
    /// `-1` for regular variables, the evaluation layer for derived ones.
    pub axiom_layer: i32,
    /// Default value of a derived variable before axiom evaluation.
    pub default_value: i32,
    /// Human-readable name per domain value.
    pub fact_names: Vec<String>,
}

impl Variable {
    pub fn is_derived(&self) -> bool {
        self.axiom_layer >= 0
    }
}

/// One effect of an operator: set `fact` when all `conditions` hold.
#[derive(Debug, Clone)]
pub struct Effect {
    pub conditions: SmallVec<[FactPair; 2]>,
    pub fact: FactPair,
}

/// A ground operator.
#[derive(Debug, Clone)]
pub struct Operator {
    pub name: String,
    pub preconditions: SmallVec<[FactPair; 4]>,
    pub effects: Vec<Effect>,
    /// Cost under the task metric. Exposed through
    /// [`PlanningTask::operator_cost`], which falls back to unit costs when
    /// the task has no metric.
    pub cost: i32,
}

impl Operator {
    /// Returns true if all preconditions hold in `state`.
    pub fn is_applicable(&self, state: &State) -> bool {
        self.preconditions.iter().all(|fact| state.satisfies(fact))
    }
}

/// An axiom rule: derive `fact` whenever all `conditions` hold.
#[derive(Debug, Clone)]
pub struct Axiom {
    pub conditions: SmallVec<[FactPair; 4]>,
    pub fact: FactPair,
}

/// A complete, immutable planning task.
#[derive(Debug)]
pub struct PlanningTask {
    variables: Vec<Variable>,
    operators: Vec<Operator>,
    axioms: Vec<Axiom>,
    initial_state_values: Vec<i32>,
    goal: Vec<FactPair>,
    use_metric: bool,
}

impl PlanningTask {
    /// Assembles a task from its parts, validating fact references.
    pub fn new(
        variables: Vec<Variable>,
        operators: Vec<Operator>,
        axioms: Vec<Axiom>,
        initial_state_values: Vec<i32>,
        goal: Vec<FactPair>,
        use_metric: bool,
    ) -> Result<Self> {
        let task = Self {
            variables,
            operators,
            axioms,
            initial_state_values,
            goal,
            use_metric,
        };
        task.validate()?;
        Ok(task)
    }

    fn validate(&self) -> Result<()> {
        if self.initial_state_values.len() != self.variables.len() {
            return Err(TaskError::Invalid(format!(
                "initial state has {} values for {} variables",
                self.initial_state_values.len(),
                self.variables.len()
            )));
        }
        let check_fact = |fact: &FactPair, what: &str| -> Result<()> {
            let variable = self.variables.get(fact.var).ok_or_else(|| {
                TaskError::Invalid(format!("{what} references unknown variable {}", fact.var))
            })?;
            if fact.value < 0 || fact.value >= variable.domain_size {
                return Err(TaskError::Invalid(format!(
                    "{what} references value {} outside domain of variable {}",
                    fact.value, fact.var
                )));
            }
            Ok(())
        };
        for fact in &self.goal {
            check_fact(fact, "goal")?;
        }
        for op in &self.operators {
            if op.cost < 0 {
                return Err(TaskError::Invalid(format!(
                    "operator '{}' has negative cost",
                    op.name
                )));
            }
            for fact in &op.preconditions {
                check_fact(fact, "operator precondition")?;
            }
            for effect in &op.effects {
                check_fact(&effect.fact, "operator effect")?;
                for fact in &effect.conditions {
                    check_fact(fact, "effect condition")?;
                }
            }
        }
        for axiom in &self.axioms {
            check_fact(&axiom.fact, "axiom head")?;
            if !self.variables[axiom.fact.var].is_derived() {
                return Err(TaskError::Invalid(format!(
                    "axiom head on non-derived variable {}",
                    axiom.fact.var
                )));
            }
            for fact in &axiom.conditions {
                check_fact(fact, "axiom condition")?;
            }
        }
        Ok(())
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, var: usize) -> &Variable {
        &self.variables[var]
    }

    pub fn domain_size(&self, var: usize) -> i32 {
        self.variables[var].domain_size
    }

    pub fn fact_name(&self, fact: FactPair) -> &str {
        &self.variables[fact.var].fact_names[fact.value as usize]
    }

    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn operator(&self, id: OperatorId) -> &Operator {
        &self.operators[id.index()]
    }

    /// Cost of an operator under the task metric.
    ///
    /// Tasks without a metric are unit-cost regardless of parsed costs.
    pub fn operator_cost(&self, id: OperatorId) -> i32 {
        if self.use_metric {
            self.operators[id.index()].cost
        } else {
            1
        }
    }

    pub fn num_axioms(&self) -> usize {
        self.axioms.len()
    }

    pub fn axioms(&self) -> &[Axiom] {
        &self.axioms
    }

    pub fn initial_state_values(&self) -> &[i32] {
        &self.initial_state_values
    }

    pub fn goal(&self) -> &[FactPair] {
        &self.goal
    }

    pub fn uses_metric(&self) -> bool {
        self.use_metric
    }

    /// Returns true if every operator costs exactly one.
    pub fn is_unit_cost(&self) -> bool {
        (0..self.num_operators()).all(|i| self.operator_cost(OperatorId::new(i)) == 1)
    }

    /// Returns true if `state` satisfies the goal condition.
    pub fn is_goal(&self, state: &State) -> bool {
        self.goal.iter().all(|fact| state.satisfies(fact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TaskBuilder;

    #[test]
    fn fact_pair_display() {
        assert_eq!(format!("{}", FactPair::new(3, 1)), "3=1");
    }

    #[test]
    fn operator_cost_without_metric_is_unit() {
        let mut builder = TaskBuilder::new();
        let v = builder.variable("v", 2);
        builder.operator("move", &[(v, 0)], &[(v, 1)], 7);
        builder.goal(v, 1);
        builder.use_metric(false);
        let task = builder.build();

        assert_eq!(task.operator_cost(OperatorId::new(0)), 1);
        assert!(task.is_unit_cost());
    }

    #[test]
    fn validation_rejects_out_of_domain_goal() {
        let mut builder = TaskBuilder::new();
        let v = builder.variable("v", 2);
        builder.goal(v, 5);
        assert!(builder.try_build().is_err());
    }

    #[test]
    fn validation_rejects_negative_cost() {
        let mut builder = TaskBuilder::new();
        let v = builder.variable("v", 2);
        builder.operator("bad", &[], &[(v, 1)], -1);
        builder.goal(v, 1);
        assert!(builder.try_build().is_err());
    }
}
