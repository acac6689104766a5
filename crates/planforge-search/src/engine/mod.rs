//! Search engines.

mod eager;
mod iterated;

use std::fmt;
use std::time::{Duration, Instant};

use planforge_core::Plan;
use tracing::info;

use crate::error::SearchError;
use crate::statistics::SearchStatistics;

pub use eager::{EagerSearch, EagerSearchFactory, EagerSearchOptions};
pub use iterated::{IteratedSearch, IteratedSearchFactory, IteratedSearchOptions};

/// Outcome of one engine step or of a whole search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// More steps to take.
    InProgress,
    /// A plan was found and stored.
    Solved,
    /// The reachable state space was exhausted without a plan.
    Failed,
    /// The wall-clock budget ran out.
    Timeout,
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchStatus::InProgress => "in progress",
            SearchStatus::Solved => "solved",
            SearchStatus::Failed => "failed",
            SearchStatus::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// A search engine driven step by step.
///
/// `search` runs the step function until a terminal status, polling the
/// wall-clock budget between steps; a step is never interrupted. External
/// drivers (the iterated engine) call `step` themselves.
pub trait SearchEngine: fmt::Debug + Send {
    /// One unit of work: at most one node expansion for the eager engine,
    /// one full child search for the iterated engine.
    fn step(&mut self) -> Result<SearchStatus, SearchError>;

    /// Wall-clock budget for [`SearchEngine::search`].
    fn max_time(&self) -> Duration;

    /// Runs steps until a terminal status or until time runs out.
    fn search(&mut self) -> Result<SearchStatus, SearchError> {
        let timer = Instant::now();
        loop {
            let status = self.step()?;
            if status != SearchStatus::InProgress {
                return Ok(status);
            }
            if timer.elapsed() >= self.max_time() {
                info!(event = "time_limit_reached");
                return Ok(SearchStatus::Timeout);
            }
        }
    }

    /// The plan found so far, if any.
    fn plan(&self) -> Option<&Plan>;

    fn found_solution(&self) -> bool {
        self.plan().is_some()
    }

    fn statistics(&self) -> &SearchStatistics;

    /// Replaces the engine's cost bound (real plan cost, exclusive).
    fn set_bound(&mut self, bound: i32);

    /// Logs final statistics.
    fn report_statistics(&self);
}

#[cfg(test)]
mod tests;
