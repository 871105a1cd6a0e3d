//! The run coordinator: one case at a time, cancellation at case
//! boundaries, outcomes reported in dispatch order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use futures::io::{AllowStdIo, AsyncWriteExt};
use regex::Regex;

use super::outcome::{CaseResult, Outcome, RunSummary};
use crate::cli;
use crate::discover::{self, TestCaseDescriptor};
use crate::errors::EngineError;
use crate::registry::{scan, Member, Module, ModuleSet};
use crate::resolve::{StandInSource, StandIns};
use crate::theory;

/// Run-wide cancellation flag, checked before each test-case boundary. It
/// never interrupts an in-flight invocation; an in-flight case always runs
/// to completion.
#[derive(Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Phase of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
    Cancelled,
}

/// Sink for discovery and execution records: the host reporting channel.
pub trait Report {
    fn case_discovered(&mut self, _case: &TestCaseDescriptor) {}
    fn case_finished(&mut self, _result: &CaseResult) {}
}

/// A [Report] that drops every record; for callers that only want the
/// returned [RunRecord].
pub struct NullReport;

impl Report for NullReport {}

/// One scheduled case: the descriptor plus everything needed to dispatch
/// it.
struct Scheduled {
    case: TestCaseDescriptor,
    member: Arc<Member>,
    module: Arc<Module>,
}

/// What a finished run leaves behind. `results` holds exactly one record
/// per dispatched case, in dispatch order; cancelled-before-dispatch cases
/// appear only in `summary.not_run`.
pub struct RunRecord {
    pub state: RunState,
    pub summary: RunSummary,
    pub results: Vec<CaseResult>,
}

/// Sequences execution of a set of scheduled test cases.
pub struct Coordinator {
    cases: Vec<Scheduled>,
    stand_ins: Arc<dyn StandInSource>,
    cancel: CancelSignal,
    state: RunState,
}

impl Coordinator {
    fn with_cases(cases: Vec<Scheduled>) -> Self {
        Coordinator {
            cases,
            stand_ins: Arc::new(StandIns::new()),
            cancel: CancelSignal::new(),
            state: RunState::NotStarted,
        }
    }

    fn schedule_module(cases: &mut Vec<Scheduled>, module: &Arc<Module>) {
        for hit in scan(module) {
            cases.push(Scheduled {
                case: discover::describe(module, hit.member),
                member: hit.member.clone(),
                module: module.clone(),
            });
        }
    }

    /// Schedule every discovered case of every registered module.
    pub fn from_modules(modules: &ModuleSet) -> Self {
        let mut cases = Vec::new();
        for module in modules.iter() {
            Self::schedule_module(&mut cases, module);
        }
        Self::with_cases(cases)
    }

    /// Schedule the named sources, isolating load failures: an unloadable
    /// source contributes no cases and its error is returned alongside,
    /// without aborting the other sources.
    pub fn from_sources(modules: &ModuleSet, sources: &[String]) -> (Self, Vec<EngineError>) {
        let mut cases = Vec::new();
        let mut failures = Vec::new();
        for source in sources {
            match modules.load(source) {
                Err(err) => failures.push(err),
                Ok(module) => Self::schedule_module(&mut cases, module),
            }
        }
        (Self::with_cases(cases), failures)
    }

    /// Restrict the scheduled cases with the pre-filter regexes. Filters
    /// are matched against `module:declaringType.member`.
    pub fn with_filters(mut self, include: Option<&Regex>, exclude: Option<&Regex>) -> Self {
        self.cases.retain(|sched| {
            let subject = format!("{}:{}", sched.case.source.module, sched.case.id);
            include.map(|inc| inc.is_match(&subject)).unwrap_or(true)
                && exclude.map(|ex| !ex.is_match(&subject)).unwrap_or(true)
        });
        self
    }

    /// Install the stand-in source consulted for unregistered capability
    /// parameters.
    pub fn with_stand_ins(mut self, stand_ins: StandIns) -> Self {
        self.stand_ins = Arc::new(stand_ins);
        self
    }

    /// Handle used to cancel the run from outside.
    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Descriptors of the scheduled cases, in dispatch order.
    pub fn scheduled(&self) -> impl Iterator<Item = &TestCaseDescriptor> {
        self.cases.iter().map(|sched| &sched.case)
    }

    /// Report every scheduled descriptor to the discovery sink.
    pub fn report_discovered(&self, report: &mut dyn Report) {
        for sched in &self.cases {
            report.case_discovered(&sched.case);
        }
    }

    /// Execute every scheduled case in order, each awaited to completion
    /// before the next is dispatched.
    ///
    /// Skip-marked cases are never invoked and get a zero-duration
    /// record. Once the cancellation signal is set, remaining undispatched
    /// cases are never started and produce no outcome record.
    pub async fn execute(mut self, report: &mut dyn Report) -> RunRecord {
        self.state = RunState::Running;
        let total = self.cases.len();
        let mut summary = RunSummary::default();
        let mut results = Vec::with_capacity(total);

        let cases = std::mem::take(&mut self.cases);
        for sched in cases {
            if self.cancel.is_cancelled() {
                self.state = RunState::Cancelled;
                break;
            }

            let result = if let Some(reason) = sched.case.skip_reason.clone() {
                CaseResult {
                    case: sched.case,
                    outcome: Outcome::Skipped(reason),
                    started: SystemTime::now(),
                    duration: Duration::default(),
                }
            } else {
                let started = SystemTime::now();
                let clock = Instant::now();
                let outcome =
                    theory::run_member(&sched.module, &sched.member, self.stand_ins.as_ref())
                        .await;
                CaseResult {
                    case: sched.case,
                    outcome,
                    started,
                    duration: clock.elapsed(),
                }
            };

            summary.record(&result.outcome);
            report.case_finished(&result);
            results.push(result);
        }

        if self.state == RunState::Running {
            self.state = RunState::Completed;
        }
        summary.not_run = total - results.len();

        RunRecord {
            state: self.state,
            summary,
            results,
        }
    }

    /// Run the cases and stream a colored summary to stdout. Returns the
    /// number of failing cases for use as an exit status.
    pub async fn console_summary(self, opts: &cli::Opts) -> Result<i32, EngineError> {
        let record = self.execute(&mut NullReport).await;

        let stdout_buf = std::io::BufWriter::new(std::io::stdout());
        let mut handle = AllowStdIo::new(stdout_buf);

        for result in &record.results {
            if result.should_print(opts) {
                let buf = result.report_str(opts.verbose) + "\n";
                handle.write_all(buf.as_bytes()).await?;
            }
        }
        let line = record.summary.report_str() + "\n";
        handle.write_all(line.as_bytes()).await?;
        handle.flush().await?;

        Ok(record.summary.failed as i32)
    }
}
