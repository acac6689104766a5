//! PlanForge Core - task model and state handling for classical planning
//!
//! This crate provides the fundamental types the search layer builds on:
//! - The planning task: variables, operators, axioms, initial state, goal
//! - A parser for the translator text format
//! - Interned immutable states and the state registry that creates them
//! - Applicable-operator enumeration
//! - Operator cost adjustment and plans

pub mod axioms;
pub mod error;
pub mod operator_cost;
pub mod plan;
pub mod sas;
pub mod state;
pub mod state_registry;
pub mod successor_generator;
pub mod task;

pub mod test_utils;

pub use error::TaskError;
pub use operator_cost::{adjusted_cost, CostType};
pub use plan::{plan_cost, Plan, PlanManager};
pub use state::{State, StateId};
pub use state_registry::StateRegistry;
pub use successor_generator::SuccessorGenerator;
pub use task::{Axiom, Effect, FactPair, Operator, OperatorId, PlanningTask, Variable};
