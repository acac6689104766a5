//! Console output for planner runs.
//!
//! Installs a `tracing` subscriber filtered through `RUST_LOG` (search
//! events at info level by default) and prints the run summary with colors
//! and thousands separators.

use std::io::{self, Write};
use std::sync::OnceLock;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use planforge_search::{SearchStatistics, SearchStatus};

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes console logging.
///
/// Safe to call multiple times - only the first call has effect.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive("planforge_search=info".parse().expect("static directive"))
            .add_directive("planforge=info".parse().expect("static directive"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    });
}

/// Prints the end-of-run summary.
pub fn print_summary(status: SearchStatus, plan_cost: Option<i32>, statistics: &SearchStatistics) {
    let mut out = io::stdout().lock();

    let status_line = match status {
        SearchStatus::Solved => format!("{}", "Solution found.".bright_green().bold()),
        SearchStatus::Failed => format!("{}", "No solution - search exhausted.".bright_red()),
        SearchStatus::Timeout => format!("{}", "Time limit reached.".bright_yellow()),
        SearchStatus::InProgress => format!("{}", "Search interrupted.".bright_yellow()),
    };
    let _ = writeln!(out, "{status_line}");

    if let Some(cost) = plan_cost {
        let _ = writeln!(out, "Plan cost: {}", cost.to_formatted_string(&Locale::en).bold());
    }

    let _ = writeln!(
        out,
        "Expanded {} state(s), evaluated {}, generated {}, reopened {}, dead ends {}.",
        statistics.expanded().to_formatted_string(&Locale::en),
        statistics.evaluated_states().to_formatted_string(&Locale::en),
        statistics.generated().to_formatted_string(&Locale::en),
        statistics.reopened().to_formatted_string(&Locale::en),
        statistics.dead_ends().to_formatted_string(&Locale::en),
    );
    let _ = out.flush();
}
