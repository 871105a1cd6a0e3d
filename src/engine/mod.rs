//! The invocation engine and run coordinator.

pub mod invoke;
pub mod outcome;
pub mod run;

pub use invoke::{invoke, Invocation};
pub use outcome::{CaseResult, Outcome, RunSummary};
pub use run::{CancelSignal, Coordinator, NullReport, Report, RunRecord, RunState};
