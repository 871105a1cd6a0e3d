//! Uniform invocation over synchronous and asynchronous member bodies.

use std::panic::{self, AssertUnwindSafe};

use futures::future::BoxFuture;
use futures::FutureExt;

use super::outcome::Outcome;
use crate::check::Fault;
use crate::registry::member::Member;
use crate::registry::meta::Value;
use crate::resolve::params::Args;

/// Normalized shape of a member call: a synchronous result, immediately
/// complete, or a future the engine awaits before considering the call
/// complete.
pub enum Invocation {
    Sync(Result<(), Fault>),
    Async(BoxFuture<'static, Result<(), Fault>>),
}

/// Invoke `member` on `instance` with resolved `args` and classify the
/// completion.
///
/// A fault raised synchronously, returned from the body, or raised inside
/// the awaited future becomes `Failed` with the innermost cause; nothing
/// escapes to the caller as an unhandled fault.
pub async fn invoke(member: &Member, instance: Option<Value>, args: Args) -> Outcome {
    let body = member.body.clone();
    let started = panic::catch_unwind(AssertUnwindSafe(move || body(instance, args)));

    let result = match started {
        Err(payload) => Err(Fault::from_panic(payload)),
        Ok(Invocation::Sync(res)) => res,
        Ok(Invocation::Async(fut)) => match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(payload) => Err(Fault::from_panic(payload)),
        },
    };

    match result {
        Ok(()) => Outcome::Passed,
        Err(fault) => Outcome::Failed(fault),
    }
}
