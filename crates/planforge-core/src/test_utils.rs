//! Test helpers for hand-building tasks.
//!
//! Production tasks come from [`crate::sas::read_task`]; tests assemble
//! small tasks directly with [`TaskBuilder`].

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::Result;
use crate::state::StateId;
use crate::task::{Axiom, Effect, FactPair, Operator, OperatorId, PlanningTask, Variable};

/// Fabricates a [`StateId`] for bookkeeping tests that do not go through a
/// registry.
pub fn state_id_for_tests(index: usize) -> StateId {
    StateId::new(index)
}

/// Builds small planning tasks for tests.
///
/// Variables default to value 0 in the initial state; the metric is used
/// unless disabled with [`TaskBuilder::use_metric`].
#[derive(Debug, Default)]
pub struct TaskBuilder {
    variables: Vec<Variable>,
    operators: Vec<Operator>,
    axioms: Vec<Axiom>,
    initial: Vec<i32>,
    goal: Vec<FactPair>,
    use_metric: bool,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            use_metric: true,
            ..Self::default()
        }
    }

    /// Adds a regular variable and returns its index.
    pub fn variable(&mut self, name: &str, domain_size: i32) -> usize {
        let fact_names = (0..domain_size)
            .map(|value| format!("Atom {name}={value}"))
            .collect();
        self.variables.push(Variable {
            name: name.to_string(),
            domain_size,
            axiom_layer: -1,
            default_value: 0,
            fact_names,
        });
        self.initial.push(0);
        self.variables.len() - 1
    }

    /// Adds a binary derived variable on the given axiom layer.
    pub fn derived_variable(&mut self, name: &str, axiom_layer: i32) -> usize {
        let var = self.variable(name, 2);
        self.variables[var].axiom_layer = axiom_layer;
        var
    }

    /// Sets the initial value of a variable (default 0).
    pub fn initial_value(&mut self, var: usize, value: i32) -> &mut Self {
        self.initial[var] = value;
        self
    }

    /// Adds an operator with unconditional effects; returns its id.
    pub fn operator(
        &mut self,
        name: &str,
        preconditions: &[(usize, i32)],
        effects: &[(usize, i32)],
        cost: i32,
    ) -> OperatorId {
        let effects: Vec<(&[(usize, i32)], (usize, i32))> =
            effects.iter().map(|&fact| (&[] as &[_], fact)).collect();
        self.conditional_operator(name, preconditions, &effects, cost)
    }

    /// Adds an operator whose effects may carry conditions; returns its id.
    pub fn conditional_operator(
        &mut self,
        name: &str,
        preconditions: &[(usize, i32)],
        effects: &[(&[(usize, i32)], (usize, i32))],
        cost: i32,
    ) -> OperatorId {
        self.operators.push(Operator {
            name: name.to_string(),
            preconditions: to_facts(preconditions),
            effects: effects
                .iter()
                .map(|(conditions, (var, value))| Effect {
                    conditions: to_facts(conditions),
                    fact: FactPair::new(*var, *value),
                })
                .collect(),
            cost,
        });
        OperatorId::new(self.operators.len() - 1)
    }

    /// Adds an axiom rule deriving `head` from `conditions`.
    pub fn axiom(&mut self, conditions: &[(usize, i32)], head: (usize, i32)) -> &mut Self {
        self.axioms.push(Axiom {
            conditions: to_facts(conditions),
            fact: FactPair::new(head.0, head.1),
        });
        self
    }

    /// Adds a goal fact.
    pub fn goal(&mut self, var: usize, value: i32) -> &mut Self {
        self.goal.push(FactPair::new(var, value));
        self
    }

    pub fn use_metric(&mut self, use_metric: bool) -> &mut Self {
        self.use_metric = use_metric;
        self
    }

    pub fn try_build(self) -> Result<Arc<PlanningTask>> {
        PlanningTask::new(
            self.variables,
            self.operators,
            self.axioms,
            self.initial,
            self.goal,
            self.use_metric,
        )
        .map(Arc::new)
    }

    /// Builds the task, panicking on validation errors.
    pub fn build(self) -> Arc<PlanningTask> {
        self.try_build().expect("test task must be valid")
    }
}

fn to_facts<A: smallvec::Array<Item = FactPair>>(pairs: &[(usize, i32)]) -> SmallVec<A> {
    pairs
        .iter()
        .map(|&(var, value)| FactPair::new(var, value))
        .collect()
}
