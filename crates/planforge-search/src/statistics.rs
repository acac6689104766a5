//! Search statistics collection and reporting.
//!
//! Counters use atomics so that an [`crate::EvaluationContext`] can charge
//! evaluations through a shared reference while the engine mutates its other
//! state.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use tracing::info;

/// No f-value reported yet.
const NO_F_VALUE: i64 = i64::MIN;

/// Counters for one search run.
#[derive(Debug)]
pub struct SearchStatistics {
    expanded: AtomicU64,
    evaluated_states: AtomicU64,
    evaluations: AtomicU64,
    generated: AtomicU64,
    reopened: AtomicU64,
    dead_ends: AtomicU64,
    last_f_value: AtomicI64,
}

impl SearchStatistics {
    pub fn new() -> Self {
        Self {
            expanded: AtomicU64::new(0),
            evaluated_states: AtomicU64::new(0),
            evaluations: AtomicU64::new(0),
            generated: AtomicU64::new(0),
            reopened: AtomicU64::new(0),
            dead_ends: AtomicU64::new(0),
            last_f_value: AtomicI64::new(NO_F_VALUE),
        }
    }

    /// States taken from the open list and expanded.
    pub fn inc_expanded(&self) {
        self.expanded.fetch_add(1, Ordering::Relaxed);
    }

    /// States evaluated for the first time.
    pub fn inc_evaluated_states(&self) {
        self.evaluated_states.fetch_add(1, Ordering::Relaxed);
    }

    /// Individual evaluator computations (one per evaluator per context).
    pub fn inc_evaluations(&self) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    /// Successor states produced.
    pub fn inc_generated(&self) {
        self.generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Closed nodes put back on the open list.
    pub fn inc_reopened(&self) {
        self.reopened.fetch_add(1, Ordering::Relaxed);
    }

    /// States recognized as dead ends.
    pub fn inc_dead_ends(&self) {
        self.dead_ends.fetch_add(1, Ordering::Relaxed);
    }

    pub fn expanded(&self) -> u64 {
        self.expanded.load(Ordering::Relaxed)
    }

    pub fn evaluated_states(&self) -> u64 {
        self.evaluated_states.load(Ordering::Relaxed)
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    pub fn generated(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn reopened(&self) -> u64 {
        self.reopened.load(Ordering::Relaxed)
    }

    pub fn dead_ends(&self) -> u64 {
        self.dead_ends.load(Ordering::Relaxed)
    }

    /// Folds another run's counters into this one.
    pub fn add(&self, other: &SearchStatistics) {
        self.expanded.fetch_add(other.expanded(), Ordering::Relaxed);
        self.evaluated_states
            .fetch_add(other.evaluated_states(), Ordering::Relaxed);
        self.evaluations
            .fetch_add(other.evaluations(), Ordering::Relaxed);
        self.generated.fetch_add(other.generated(), Ordering::Relaxed);
        self.reopened.fetch_add(other.reopened(), Ordering::Relaxed);
        self.dead_ends.fetch_add(other.dead_ends(), Ordering::Relaxed);
    }

    /// Logs a line when `f` exceeds the largest f-value reported so far.
    pub fn report_f_value_progress(&self, f: i32) {
        let f = i64::from(f);
        if f > self.last_f_value.load(Ordering::Relaxed) {
            self.last_f_value.store(f, Ordering::Relaxed);
            info!(
                event = "f_progress",
                f,
                evaluated = self.evaluated_states(),
                expanded = self.expanded(),
            );
        }
    }

    /// Logs a progress checkpoint for a new best evaluator value.
    pub fn print_checkpoint_line(&self, g: i32) {
        info!(
            event = "checkpoint",
            g,
            evaluated = self.evaluated_states(),
            expanded = self.expanded(),
        );
    }

    /// Logs the final counter values.
    pub fn report(&self) {
        info!(
            event = "search_statistics",
            expanded = self.expanded(),
            evaluated_states = self.evaluated_states(),
            evaluations = self.evaluations(),
            generated = self.generated(),
            reopened = self.reopened(),
            dead_ends = self.dead_ends(),
        );
    }
}

impl Default for SearchStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_count() {
        let stats = SearchStatistics::new();
        assert_eq!(stats.expanded(), 0);

        stats.inc_expanded();
        stats.inc_expanded();
        stats.inc_generated();
        stats.inc_dead_ends();

        assert_eq!(stats.expanded(), 2);
        assert_eq!(stats.generated(), 1);
        assert_eq!(stats.dead_ends(), 1);
        assert_eq!(stats.reopened(), 0);
    }

    #[test]
    fn add_folds_counters() {
        let total = SearchStatistics::new();
        let child = SearchStatistics::new();
        child.inc_expanded();
        child.inc_evaluations();
        child.inc_evaluations();

        total.inc_expanded();
        total.add(&child);

        assert_eq!(total.expanded(), 2);
        assert_eq!(total.evaluations(), 2);
    }
}
