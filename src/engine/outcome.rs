//! Outcome classification and reporting for executed test cases.

use std::time::{Duration, SystemTime};

use crate::check::Fault;
use crate::cli;
use crate::discover::TestCaseDescriptor;

/// Terminal classification of one test case. Produced exactly once per
/// dispatched case; never partially reported.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    /// The member raised; carries the innermost cause.
    Failed(Fault),
    /// The member carried a skip marker and was never invoked.
    Skipped(String),
}

/// The reportable record for one dispatched test case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub case: TestCaseDescriptor,
    pub outcome: Outcome,
    /// Wall-clock start. Skipped cases carry a zero duration.
    pub started: SystemTime,
    pub duration: Duration,
}

impl CaseResult {
    fn with_only_opt(&self, only: &cli::OnlyOpt) -> bool {
        use cli::OnlyOpt as O;
        match (only, &self.outcome) {
            (O::Pass, Outcome::Passed) => true,
            (O::Fail, Outcome::Failed(..)) => true,
            (O::Skip, Outcome::Skipped(..)) => true,
            (O::Pass, _) | (O::Fail, _) | (O::Skip, _) => false,
        }
    }

    /// Returns true if this result should be printed with the current
    /// options.
    pub fn should_print(&self, opts: &cli::Opts) -> bool {
        // Print everything if verbose mode is enabled
        if opts.verbose {
            return true;
        }

        // Selectively print things if the post-filter is enabled.
        if let Some(only) = &opts.only {
            return self.with_only_opt(only);
        }
        // Otherwise just print failing and skipped cases
        !matches!(self.outcome, Outcome::Passed)
    }

    /// Generate colorized string to report the result of this case.
    pub fn report_str(&self, show_cause: bool) -> String {
        use colored::*;

        let mut buf = String::new();
        match &self.outcome {
            Outcome::Passed => {
                buf.push_str(&"✓ ".green().to_string());
                buf.push_str(&self.case.display_name.green().to_string());
            }
            Outcome::Skipped(reason) => {
                buf.push_str(&"⚬ ".yellow().to_string());
                buf.push_str(&self.case.display_name.yellow().to_string());
                if reason.is_empty() {
                    buf.push_str(&" (skipped)".dimmed().to_string());
                } else {
                    buf.push_str(&format!(" (skipped: {})", reason).dimmed().to_string());
                }
            }
            Outcome::Failed(fault) => {
                buf.push_str(&"✗ ".red().to_string());
                buf.push_str(&self.case.display_name.red().to_string());
                buf.push_str(&format!(" ({})", fault.kind).dimmed().to_string());
                if show_cause {
                    buf.push('\n');
                    buf.push_str(&format!("    {}", fault).red().to_string());
                }
            }
        };
        buf
    }
}

/// Counts for a completed (or cancelled) run.
#[derive(Debug, Default, PartialEq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Cases never dispatched because cancellation intervened. They carry
    /// no outcome record.
    pub not_run: usize,
}

impl RunSummary {
    pub(crate) fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed(..) => self.failed += 1,
            Outcome::Skipped(..) => self.skipped += 1,
        }
    }

    /// One-line colorized summary of the run.
    pub fn report_str(&self) -> String {
        use colored::*;

        let line = format!(
            "{} passing / {} failing / {} skipped",
            self.passed, self.failed, self.skipped
        );
        let mut buf = format!(
            "  {}",
            if self.failed == 0 {
                line.green().to_string()
            } else {
                line.red().to_string()
            }
        );
        if self.not_run > 0 {
            buf.push_str(&format!(" / {} not run", self.not_run).dimmed().to_string());
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::SourceRef;

    fn result(outcome: Outcome) -> CaseResult {
        CaseResult {
            case: TestCaseDescriptor {
                id: "Calc.adds".to_string(),
                display_name: "Calc.adds".to_string(),
                skip_reason: None,
                source: SourceRef {
                    module: "m".to_string(),
                    declaring: "Calc".to_string(),
                },
            },
            outcome,
            started: SystemTime::now(),
            duration: Duration::default(),
        }
    }

    #[test]
    fn passing_cases_are_quiet_by_default() {
        let opts = cli::Opts::default();
        assert!(!result(Outcome::Passed).should_print(&opts));
        assert!(result(Outcome::Failed(Fault::assertion("no"))).should_print(&opts));
        assert!(result(Outcome::Skipped("flaky".to_string())).should_print(&opts));
    }

    #[test]
    fn only_filter_selects_a_single_class() {
        let opts = cli::Opts {
            only: Some(cli::OnlyOpt::Pass),
            ..cli::Opts::default()
        };
        assert!(result(Outcome::Passed).should_print(&opts));
        assert!(!result(Outcome::Failed(Fault::assertion("no"))).should_print(&opts));
    }

    #[test]
    fn summary_counts_each_class() {
        let mut summary = RunSummary::default();
        summary.record(&Outcome::Passed);
        summary.record(&Outcome::Failed(Fault::assertion("no")));
        summary.record(&Outcome::Skipped(String::new()));
        assert_eq!((summary.passed, summary.failed, summary.skipped), (1, 1, 1));
    }
}
