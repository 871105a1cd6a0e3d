//! Embeddable entry point: parse the command line, apply the run request
//! and filters, and execute.
//!
//! Without runtime reflection there is nothing for a standalone binary to
//! discover, so the harness is handed a [ModuleSet] by the embedding
//! program's `fn main` and returns a process exit status.

use regex::Regex;
use structopt::StructOpt;
use tokio::runtime;

use crate::cli::Opts;
use crate::engine::Coordinator;
use crate::errors::EngineError;
use crate::picker::toml::RunRequest;
use crate::registry::ModuleSet;
use crate::resolve::StandIns;

fn list_cases(coordinator: &Coordinator) {
    use colored::*;
    for case in coordinator.scheduled() {
        println!(
            "{} {}",
            case.display_name.blue(),
            format!("[{}]", case.id).dimmed()
        );
    }
}

fn run(modules: ModuleSet, stand_ins: StandIns) -> Result<i32, EngineError> {
    let opts = Opts::from_args();

    // A run request narrows the sources; the CLI filters narrow further.
    let request = match &opts.config {
        Some(path) => Some(RunRequest::from_path(path)?),
        None => None,
    };

    // Get the include and exclude regexes.
    let include = opts
        .include
        .as_ref()
        .or_else(|| request.as_ref().and_then(|req| req.include.as_ref()))
        .map(|reg| Regex::new(reg).expect("Invalid --include regex"));

    let exclude = opts
        .exclude
        .as_ref()
        .or_else(|| request.as_ref().and_then(|req| req.exclude.as_ref()))
        .map(|reg| Regex::new(reg).expect("Invalid --exclude regex"));

    let (coordinator, load_failures) = match &request {
        Some(req) if !req.sources.is_empty() => Coordinator::from_sources(&modules, &req.sources),
        _ => (Coordinator::from_modules(&modules), Vec::new()),
    };
    let coordinator = coordinator
        .with_filters(include.as_ref(), exclude.as_ref())
        .with_stand_ins(stand_ins);

    // An unloadable source is isolated: report it and keep going.
    for err in &load_failures {
        use colored::*;
        println!("{}", format!("error: {}", err).red());
    }

    // Print out the discovered cases in list mode.
    if opts.list {
        list_cases(&coordinator);
        return Ok(0);
    }

    let mut runtime = runtime::Builder::new()
        .basic_scheduler()
        .enable_all()
        .build()?;

    // Run all the scheduled cases.
    runtime.block_on(coordinator.console_summary(&opts))
}

/// Run the registered modules under the command line options. Returns the
/// number of failing cases, or 1 for a harness error, suitable for
/// `std::process::exit`.
pub fn main(modules: ModuleSet, stand_ins: StandIns) -> i32 {
    match run(modules, stand_ins) {
        Err(EngineError(msg)) => {
            println!("error: {}", msg);
            1
        }
        Ok(failed_cases) => failed_cases,
    }
}
