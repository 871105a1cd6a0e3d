//! Assertion helpers shared by test bodies.
//!
//! A test body fails by returning a [Fault]. The fault's `kind` tag plays
//! the role of an exception type: expected-failure assertions match on the
//! tag rather than on a type hierarchy.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use crate::errors::EngineError;

/// A tagged failure cause raised by a test body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Failure kind tag, e.g. `InvalidOperation`, `assertion`, or `panic`.
    pub kind: String,
    /// Human-readable failure message.
    pub message: String,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Fault {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// A plain assertion failure.
    pub fn assertion(message: impl Into<String>) -> Self {
        Fault::new("assertion", message)
    }

    /// A dependency-resolution failure surfaced as the test's cause.
    pub(crate) fn resolution(err: EngineError) -> Self {
        Fault::new("resolution", err.0)
    }

    /// Recover the innermost panic payload as a fault.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "test body panicked".to_string()
        };
        Fault::new("panic", message)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Shorthand for failing a test body with an assertion fault.
pub fn fail<T>(message: &str) -> Result<T, Fault> {
    Err(Fault::assertion(message))
}

/// Run `f` expecting it to raise a fault of `kind`.
///
/// The expected fault is absorbed and the assertion passes. Any other
/// fault passes through unchanged, and no fault at all is itself a
/// failure. Panics inside `f` are captured and matched like any other
/// fault, under the `panic` kind.
pub fn expect_fault<F>(kind: &str, f: F) -> Result<(), Fault>
where
    F: FnOnce() -> Result<(), Fault>,
{
    let res = panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(Fault::from_panic(payload)));
    match_expected(kind, res)
}

/// Async counterpart of [expect_fault]. Panics inside the future are not
/// captured here; the invocation engine converts those on its own.
pub async fn expect_fault_async<F>(kind: &str, fut: F) -> Result<(), Fault>
where
    F: Future<Output = Result<(), Fault>>,
{
    match_expected(kind, fut.await)
}

fn match_expected(kind: &str, res: Result<(), Fault>) -> Result<(), Fault> {
    match res {
        Err(ref fault) if fault.kind == kind => Ok(()),
        Err(fault) => Err(fault),
        Ok(()) => Err(Fault::assertion(format!(
            "expected a `{}` fault but none was raised",
            kind
        ))),
    }
}
