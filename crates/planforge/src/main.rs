//! The planner executable.
//!
//! Reads a grounded task from standard input, runs the configured search,
//! and writes the plan. See [`usage`] for the command line.

use std::io::{self, BufReader};
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use planforge::console;
use planforge::{
    build_engine_factory, plan_cost, ExitCode, PlanManager, SearchError, SearchSpec,
};

struct CliArgs {
    spec: SpecSource,
    plan_file: String,
}

enum SpecSource {
    Inline(String),
    File(String),
}

fn usage(program: &str) -> String {
    format!(
        "usage: {program} (--search <toml> | --config <file>) [--plan-file <prefix>]\n\
         \n\
         Reads the task from standard input and writes the plan to the\n\
         plan file (default: sas_plan).\n\
         \n\
         examples:\n\
         \x20 {program} --search 'engine = {{ type = \"astar\", eval = {{ type = \"blind\" }} }}' < output.sas\n\
         \x20 {program} --config search.toml --plan-file plan < output.sas"
    )
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut spec = None;
    let mut plan_file = "sas_plan".to_string();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--search" => {
                let value = iter.next().ok_or("--search needs a value")?;
                spec = Some(SpecSource::Inline(value.clone()));
            }
            "--config" => {
                let value = iter.next().ok_or("--config needs a value")?;
                spec = Some(SpecSource::File(value.clone()));
            }
            "--plan-file" => {
                plan_file = iter.next().ok_or("--plan-file needs a value")?.clone();
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    let spec = spec.ok_or("one of --search or --config is required")?;
    Ok(CliArgs { spec, plan_file })
}

fn load_spec(source: &SpecSource) -> Result<SearchSpec, String> {
    match source {
        SpecSource::Inline(text) => {
            SearchSpec::from_toml_str(text).map_err(|e| format!("invalid --search value: {e}"))
        }
        SpecSource::File(path) => {
            SearchSpec::load(path).map_err(|e| format!("cannot load '{path}': {e}"))
        }
    }
}

fn main() {
    console::init();

    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let program = std::env::args()
        .next()
        .unwrap_or_else(|| "planforge".to_string());

    let args = match parse_args(&raw_args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{}", usage(&program));
            ExitCode::SearchInputError.exit();
        }
    };

    let spec = match load_spec(&args.spec) {
        Ok(spec) => spec,
        Err(message) => {
            error!(event = "configuration_error", message = %message);
            ExitCode::SearchInputError.exit();
        }
    };

    info!(event = "reading_task");
    let stdin = io::stdin();
    let task = match planforge_core::sas::read_task(BufReader::new(stdin.lock())) {
        Ok(task) => Arc::new(task),
        Err(e) => {
            error!(event = "task_error", message = %e);
            ExitCode::SearchInputError.exit();
        }
    };
    info!(
        event = "task_read",
        variables = task.num_variables(),
        operators = task.num_operators(),
        axioms = task.num_axioms(),
    );

    let factory = match build_engine_factory(&spec) {
        Ok(factory) => factory,
        Err(e) => {
            error!(event = "configuration_error", message = %e);
            ExitCode::SearchInputError.exit();
        }
    };
    let mut engine = match factory.bind_root(&task) {
        Ok(engine) => engine,
        Err(e) => {
            error!(event = "configuration_error", message = %e);
            ExitCode::SearchInputError.exit();
        }
    };

    let search_timer = Instant::now();
    let status = match engine.search() {
        Ok(status) => status,
        Err(e @ SearchError::Config(_)) | Err(e @ SearchError::UnknownEvaluator(_)) => {
            error!(event = "configuration_error", message = %e);
            ExitCode::SearchInputError.exit();
        }
        Err(e) => {
            error!(event = "search_error", message = %e);
            std::process::exit(1);
        }
    };
    info!(
        event = "search_finished",
        status = %status,
        seconds = search_timer.elapsed().as_secs_f64(),
    );

    let cost = match engine.plan() {
        Some(plan) => {
            let mut manager = PlanManager::new(&args.plan_file);
            match manager.save_plan(plan, &task, false) {
                Ok(path) => info!(event = "plan_written", path = %path.display()),
                Err(e) => {
                    error!(event = "plan_write_error", message = %e);
                    std::process::exit(1);
                }
            }
            Some(plan_cost(plan, &task))
        }
        None => None,
    };

    engine.report_statistics();
    console::print_summary(status, cost, engine.statistics());

    ExitCode::from_status(status).exit();
}
