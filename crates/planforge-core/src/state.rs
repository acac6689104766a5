//! Interned, immutable planning states.

use std::fmt;
use std::sync::Arc;

use crate::task::FactPair;

/// Dense identifier of an interned state.
///
/// Assigned by the [`crate::StateRegistry`] in creation order. Two states
/// with identical variable values always share one id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u32);

impl StateId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A complete variable assignment, axiom-consistent on creation.
///
/// States are only created through the registry and are immutable once
/// interned. Cloning is cheap: the values are shared.
#[derive(Debug, Clone)]
pub struct State {
    id: StateId,
    values: Arc<[i32]>,
}

impl State {
    pub(crate) fn new(id: StateId, values: Arc<[i32]>) -> Self {
        Self { id, values }
    }

    #[inline]
    pub fn id(&self) -> StateId {
        self.id
    }

    #[inline]
    pub fn value(&self, var: usize) -> i32 {
        self.values[var]
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    #[inline]
    pub fn satisfies(&self, fact: &FactPair) -> bool {
        self.values[fact.var] == fact.value
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for State {}
