//! Per-parameter resolution policy and declaring-instance resolution.

use std::any::Any;
use std::sync::Arc;

use super::container::{ContainerBuilder, Resolver};
use super::fixture::FixtureRef;
use super::standin::StandInSource;
use crate::check::Fault;
use crate::engine::invoke::Invocation;
use crate::errors::EngineError;
use crate::registry::member::Member;
use crate::registry::meta::{ParamKind, ParamSpec, Value};

/// A caller-supplied callable bound to a callback parameter. Invoking it
/// runs the member it wraps; for theories this is the nested member.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() -> Invocation + Send + Sync>);

impl Callback {
    /// Wrap `member`'s body; the callable runs it unbound with no
    /// arguments.
    pub fn for_member(member: &Member) -> Self {
        let body = member.body.clone();
        Callback(Arc::new(move || body(None, Args::empty())))
    }

    /// Run the wrapped member.
    pub fn call(&self) -> Invocation {
        (self.0)()
    }
}

/// One resolved argument slot.
pub enum Arg {
    Value(Value),
    /// Explicit absent value: the soft-miss outcome for an unresolved
    /// concrete parameter.
    Absent,
    Callback(Callback),
}

/// Ordered argument values handed to a member body.
pub struct Args(Vec<Arg>);

impl Args {
    pub fn empty() -> Self {
        Args(Vec::new())
    }

    pub(crate) fn from_slots(slots: Vec<Arg>) -> Self {
        Args(slots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take the argument at `index` as a `T`. Absent slots and type
    /// mismatches read as `None`.
    pub fn take<T: Any + Send>(&mut self, index: usize) -> Option<T> {
        let slot = self.0.get_mut(index)?;
        match std::mem::replace(slot, Arg::Absent) {
            Arg::Value(v) => match v.downcast::<T>() {
                Ok(boxed) => Some(*boxed),
                Err(v) => {
                    *slot = Arg::Value(v);
                    None
                }
            },
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Take the callback bound at `index`.
    pub fn callback(&mut self, index: usize) -> Option<Callback> {
        let slot = self.0.get_mut(index)?;
        match std::mem::replace(slot, Arg::Absent) {
            Arg::Callback(cb) => Some(cb),
            other => {
                *slot = other;
                None
            }
        }
    }

    pub fn is_absent(&self, index: usize) -> bool {
        matches!(self.0.get(index), Some(Arg::Absent))
    }
}

/// Resolved inputs for one invocation.
pub struct Resolution {
    pub instance: Option<Value>,
    pub args: Args,
}

/// Resolve `member`'s parameters and declaring-type instance.
///
/// Per parameter, in order: a callback parameter binds to the supplied
/// callback source; a container hit wins next; a capability type falls
/// back to a stand-in; everything else soft-fails to an absent slot. A
/// failed provider inside the container is the test's failure cause and is
/// returned as such, never downgraded.
///
/// The instance follows the same container when a configuration is in
/// effect, is constructed directly otherwise, and is omitted entirely for
/// uninstantiable declaring types.
pub fn resolve(
    member: &Member,
    group: Option<&FixtureRef>,
    callback_source: Option<Callback>,
    stand_ins: &dyn StandInSource,
) -> Result<Resolution, Fault> {
    // Activate the configuration: fresh fixture, `configure` exactly once,
    // then make the declaring type itself resolvable. A registration made
    // by the fixture wins over the implicit one.
    let resolver = group.map(|group| {
        let mut builder = ContainerBuilder::new();
        let mut fixture = group.activate();
        fixture.configure(&mut builder);
        if let Some(construct) = member.construct.clone() {
            builder.provide_default_raw(member.owner, Arc::new(move |_| Ok(construct())));
        }
        builder.build()
    });

    let mut slots = Vec::with_capacity(member.params.len());
    for param in &member.params {
        let slot = resolve_param(param, resolver.as_ref(), callback_source.as_ref(), stand_ins)
            .map_err(Fault::resolution)?;
        slots.push(slot);
    }

    let instance = match (&resolver, &member.construct) {
        (Some(resolver), Some(_)) => Some(
            resolver
                .resolve_required(member.owner)
                .map_err(Fault::resolution)?,
        ),
        (None, Some(construct)) => Some(construct()),
        // Wholly static declaring type: invoke unbound.
        (_, None) => None,
    };

    Ok(Resolution {
        instance,
        args: Args::from_slots(slots),
    })
}

fn resolve_param(
    param: &ParamSpec,
    resolver: Option<&Resolver>,
    callback_source: Option<&Callback>,
    stand_ins: &dyn StandInSource,
) -> Result<Arg, EngineError> {
    if param.kind == ParamKind::Callback {
        if let Some(cb) = callback_source {
            return Ok(Arg::Callback(cb.clone()));
        }
    }
    if let Some(resolver) = resolver {
        if let Some(value) = resolver.try_resolve(param.ty)? {
            return Ok(Arg::Value(value));
        }
    }
    if param.kind == ParamKind::Capability {
        if let Some(value) = stand_ins.create(param.ty) {
            return Ok(Arg::Value(value));
        }
    }
    Ok(Arg::Absent)
}
