//! State interning and successor creation.

use std::collections::HashMap;
use std::sync::Arc;

use crate::axioms::AxiomEvaluator;
use crate::state::{State, StateId};
use crate::task::{Operator, PlanningTask};

/// Creates and interns states for one task.
///
/// Every state the search touches comes from here: the initial state via
/// [`StateRegistry::initial_state`] and successors via
/// [`StateRegistry::successor_state`]. Identical value tuples intern to the
/// same [`StateId`], so node bookkeeping can key on dense ids.
#[derive(Debug)]
pub struct StateRegistry {
    task: Arc<PlanningTask>,
    axiom_evaluator: AxiomEvaluator,
    states: Vec<Arc<[i32]>>,
    ids: HashMap<Arc<[i32]>, StateId>,
}

impl StateRegistry {
    pub fn new(task: Arc<PlanningTask>) -> Self {
        let axiom_evaluator = AxiomEvaluator::new(&task);
        Self {
            task,
            axiom_evaluator,
            states: Vec::new(),
            ids: HashMap::new(),
        }
    }

    pub fn task(&self) -> &Arc<PlanningTask> {
        &self.task
    }

    /// Number of states interned so far.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The task's initial state, axiom-evaluated and interned.
    pub fn initial_state(&mut self) -> State {
        let mut values = self.task.initial_state_values().to_vec();
        self.axiom_evaluator.evaluate(&mut values);
        self.intern(values)
    }

    /// The state resulting from applying `op` to `state`.
    ///
    /// `op` must be applicable in `state`. Effect conditions are checked
    /// against the predecessor, then axioms rederive the derived variables.
    pub fn successor_state(&mut self, state: &State, op: &Operator) -> State {
        debug_assert!(op.is_applicable(state));
        let mut values = state.values().to_vec();
        for effect in &op.effects {
            if effect.conditions.iter().all(|c| state.satisfies(c)) {
                values[effect.fact.var] = effect.fact.value;
            }
        }
        self.axiom_evaluator.evaluate(&mut values);
        self.intern(values)
    }

    /// Looks up a previously interned state.
    ///
    /// Panics if `id` was not produced by this registry.
    pub fn lookup_state(&self, id: StateId) -> State {
        State::new(id, Arc::clone(&self.states[id.index()]))
    }

    fn intern(&mut self, values: Vec<i32>) -> State {
        let values: Arc<[i32]> = values.into();
        if let Some(&id) = self.ids.get(&values) {
            return State::new(id, values);
        }
        let id = StateId::new(self.states.len());
        self.states.push(Arc::clone(&values));
        self.ids.insert(Arc::clone(&values), id);
        State::new(id, values)
    }
}
