//! Module registration and metadata scanning: the facts the rest of the
//! engine reads.

pub mod member;
pub mod meta;

pub use member::{scan, Member, MemberBuilder, Module, ModuleSet, Scanned};
pub use meta::{Markers, ParamKind, ParamSpec, SkipMarker, TestMarker, TypeKey, Value};
