//! Marker metadata and parameter specifications attached to registered
//! members. These are the load-time facts the scanner reads; nothing here
//! is mutated after registration.

use std::any::{Any, TypeId};
use std::fmt;

use crate::resolve::fixture::FixtureRef;

/// A resolved argument or declaring-type instance value.
pub type Value = Box<dyn Any + Send>;

/// Key identifying a value type across the container, the stand-in
/// registry, and argument slots.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: Any>() -> Self {
        TypeKey {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// How a parameter participates in resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A concrete type: container lookup, then soft-miss to an absent
    /// slot.
    Concrete,
    /// A capability (trait-object) type: container lookup, then a
    /// stand-in.
    Capability,
    /// Bound to a caller-supplied callable; never container-resolved.
    Callback,
}

/// Declared shape of one member parameter.
#[derive(Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: TypeKey,
    pub kind: ParamKind,
}

/// Marks a member as a directly runnable test.
#[derive(Debug, Clone, Default)]
pub struct TestMarker {
    /// Optional display-name override.
    pub display_name: Option<String>,
}

/// Marks a member as never-invoked; it is reported as skipped.
#[derive(Debug, Clone, Default)]
pub struct SkipMarker {
    /// Optional free-text reason.
    pub reason: Option<String>,
}

/// The full marker set read off a member at scan time.
#[derive(Clone, Default)]
pub struct Markers {
    pub test: Option<TestMarker>,
    pub skip: Option<SkipMarker>,
    /// Member-level grouping marker; overrides the type-level one.
    pub group: Option<FixtureRef>,
}
