//! Two-phase component construction.
//!
//! Factories describe an engine setup independently of any task. Binding a
//! factory to a task produces the live component; a [`ComponentMap`] created
//! at the root of each bind memoizes by factory identity, so a factory node
//! shared by several parents yields one shared instance per task. Distinct
//! root binds use distinct maps and therefore share nothing.
//!
//! Factory graphs are built bottom-up over `Arc` children, which makes
//! cycles unconstructible.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use planforge_core::PlanningTask;
use tracing::debug;

use crate::engine::SearchEngine;
use crate::error::SearchError;
use crate::evaluator::Evaluator;
use crate::open_list::StateOpenList;

/// Identity key of a live factory node.
pub fn component_key<T>(factory: &T) -> usize {
    factory as *const T as usize
}

/// Memo from factory identity to the component it bound to.
///
/// One map lives for one root bind; its lifetime bounds the sharing scope.
#[derive(Debug, Default)]
pub struct ComponentMap {
    components: HashMap<usize, Box<dyn Any>>,
}

impl ComponentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the component bound under `key`, building and recording it
    /// first if absent. The builder receives the map to bind children.
    pub fn get_or_bind<T: Clone + 'static>(
        &mut self,
        key: usize,
        bind: impl FnOnce(&mut ComponentMap) -> T,
    ) -> T {
        if let Some(component) = self.components.get(&key) {
            debug!(event = "component_reused", key);
            return component
                .downcast_ref::<T>()
                .expect("component bound under two different types")
                .clone();
        }
        let component = bind(self);
        self.components.insert(key, Box::new(component.clone()));
        component
    }
}

/// A task-independent evaluator description.
pub trait EvaluatorFactory: fmt::Debug + Send + Sync {
    fn description(&self) -> &str;

    /// Binds this node to `task`, sharing children through `components`.
    fn bind(&self, task: &Arc<PlanningTask>, components: &mut ComponentMap) -> Arc<dyn Evaluator>;
}

/// A task-independent open-list description.
///
/// The open list instance itself is fresh per bind (the engine owns its
/// frontier exclusively); the evaluators inside it go through the component
/// map and are shared.
pub trait OpenListFactory: fmt::Debug + Send + Sync {
    fn bind(&self, task: &Arc<PlanningTask>, components: &mut ComponentMap) -> StateOpenList;
}

/// A task-independent engine description.
pub trait EngineFactory: fmt::Debug + Send + Sync {
    fn bind(
        &self,
        task: &Arc<PlanningTask>,
        components: &mut ComponentMap,
    ) -> Result<Box<dyn SearchEngine>, SearchError>;

    /// Binds as the root component with a fresh memo.
    fn bind_root(&self, task: &Arc<PlanningTask>) -> Result<Box<dyn SearchEngine>, SearchError> {
        let mut components = ComponentMap::new();
        self.bind(task, &mut components)
    }
}
