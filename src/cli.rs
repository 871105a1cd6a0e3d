use crate::errors;
use std::path::PathBuf;
use structopt::StructOpt;

/// Options for the CLI.
#[derive(StructOpt, Debug, Default)]
#[structopt(name = "tagrun", about = "Metadata-driven test discovery and execution.")]
pub struct Opts {
    /// Optional run request file.
    #[structopt(short, long, parse(from_os_str))]
    pub config: Option<PathBuf>,

    /// Include only test cases matching this regex. Matched against
    /// `module:declaringType.member`.
    #[structopt(short, long)]
    pub include: Option<String>,

    /// Exclude test cases matching this regex. Matched against
    /// `module:declaringType.member`.
    #[structopt(short, long)]
    pub exclude: Option<String>,

    /// Only display test cases with a specific outcome.
    #[structopt(short, long)]
    pub only: Option<OnlyOpt>,

    /// List the discovered test cases without running them.
    #[structopt(short, long)]
    pub list: bool,

    /// Show every outcome and full failure causes.
    #[structopt(short, long)]
    pub verbose: bool,
}

/// Possible values for the --only flag.
#[derive(Debug)]
pub enum OnlyOpt {
    /// Failing test cases.
    Fail,
    /// Passing test cases.
    Pass,
    /// Skipped test cases.
    Skip,
}

impl std::str::FromStr for OnlyOpt {
    type Err = errors::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail" => Ok(OnlyOpt::Fail),
            "pass" => Ok(OnlyOpt::Pass),
            "skip" => Ok(OnlyOpt::Skip),
            _ => Err(errors::EngineError(
                "Must be one of fail, pass, skip.".to_string(),
            )),
        }
    }
}
