//! Callable member handles and the module registry the scanner reads.
//!
//! Registering a member is the load-time act that attaches its markers:
//! a [Module] is the dispatch-table stand-in for a reflectively loaded
//! artifact.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;

use super::meta::{Markers, ParamKind, ParamSpec, SkipMarker, TestMarker, TypeKey, Value};
use crate::check::Fault;
use crate::engine::invoke::Invocation;
use crate::errors::EngineError;
use crate::resolve::fixture::FixtureRef;
use crate::resolve::params::Args;

/// Member body: receives the declaring-type instance (if any) and the
/// resolved arguments, and completes synchronously or asynchronously.
pub type Body = Arc<dyn Fn(Option<Value>, Args) -> Invocation + Send + Sync>;

/// No-argument constructor for a declaring type.
pub type Constructor = Arc<dyn Fn() -> Value + Send + Sync>;

/// A callable handle for one registered member.
#[derive(Clone)]
pub struct Member {
    /// Name of the declaring type.
    pub declaring: &'static str,
    /// Raw member name. For a member declared inside another member this
    /// is the generated local-function name and encodes the parent.
    pub raw_name: &'static str,
    pub markers: Markers,
    pub params: Vec<ParamSpec>,
    /// Container key for the declaring type.
    pub owner: TypeKey,
    /// No-argument constructor for the declaring type. `None` for members
    /// of uninstantiable types; those are invoked unbound.
    pub construct: Option<Constructor>,
    pub body: Body,
}

impl Member {
    pub fn builder(declaring: &'static str, raw_name: &'static str) -> MemberBuilder {
        MemberBuilder {
            declaring,
            raw_name,
            markers: Markers::default(),
            params: Vec::new(),
            owner: TypeKey::of::<()>(),
            construct: None,
            body: None,
        }
    }

    /// Identifier used for lookup and reporting: `declaringType.memberName`
    /// verbatim.
    pub fn id(&self) -> String {
        format!("{}.{}", self.declaring, self.raw_name)
    }
}

/// Builder for [Member] handles.
pub struct MemberBuilder {
    declaring: &'static str,
    raw_name: &'static str,
    markers: Markers,
    params: Vec<ParamSpec>,
    owner: TypeKey,
    construct: Option<Constructor>,
    body: Option<Body>,
}

impl MemberBuilder {
    /// Attach the test marker.
    pub fn test(mut self) -> Self {
        self.markers.test.get_or_insert_with(TestMarker::default);
        self
    }

    /// Attach the test marker with a display-name override.
    pub fn display_name(mut self, name: &str) -> Self {
        let marker = self.markers.test.get_or_insert_with(TestMarker::default);
        marker.display_name = Some(name.to_string());
        self
    }

    /// Attach a skip marker with an optional reason.
    pub fn skip(mut self, reason: Option<&str>) -> Self {
        self.markers.skip = Some(SkipMarker {
            reason: reason.map(String::from),
        });
        self
    }

    /// Attach a member-level grouping marker.
    pub fn group(mut self, group: FixtureRef) -> Self {
        self.markers.group = Some(group);
        self
    }

    /// Declare the next parameter.
    pub fn param<T: Any>(mut self, name: &'static str, kind: ParamKind) -> Self {
        self.params.push(ParamSpec {
            name,
            ty: TypeKey::of::<T>(),
            kind,
        });
        self
    }

    /// Declare the declaring type and its no-argument constructor. Members
    /// built without one belong to an uninstantiable type and are invoked
    /// unbound.
    pub fn constructor<T, F>(mut self, f: F) -> Self
    where
        T: Any + Send,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.owner = TypeKey::of::<T>();
        self.construct = Some(Arc::new(move || Box::new(f()) as Value));
        self
    }

    /// Set a synchronous body.
    pub fn sync_body<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<Value>, Args) -> Result<(), Fault> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(move |inst, args| Invocation::Sync(f(inst, args))));
        self
    }

    /// Set an asynchronous body; the engine awaits it to completion.
    pub fn async_body<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<Value>, Args) -> BoxFuture<'static, Result<(), Fault>>
            + Send
            + Sync
            + 'static,
    {
        self.body = Some(Arc::new(move |inst, args| Invocation::Async(f(inst, args))));
        self
    }

    pub fn build(self) -> Member {
        Member {
            declaring: self.declaring,
            raw_name: self.raw_name,
            markers: self.markers,
            params: self.params,
            owner: self.owner,
            construct: self.construct,
            body: self
                .body
                .unwrap_or_else(|| Arc::new(|_, _| Invocation::Sync(Ok(())))),
        }
    }
}

/// A named registry of members: the loaded-module stand-in.
pub struct Module {
    /// Name of the source this module was loaded from.
    pub name: String,
    members: Vec<Arc<Member>>,
    /// Type-level grouping markers, keyed by declaring type name.
    type_groups: HashMap<&'static str, FixtureRef>,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Module {
            name: name.to_string(),
            members: Vec::new(),
            type_groups: HashMap::new(),
        }
    }

    pub fn register(&mut self, member: Member) -> &mut Self {
        self.members.push(Arc::new(member));
        self
    }

    /// Attach a type-level grouping marker to `declaring`.
    pub fn group_type(&mut self, declaring: &'static str, group: FixtureRef) -> &mut Self {
        self.type_groups.insert(declaring, group);
        self
    }

    /// Look a member up by declaring type and raw name. Lookup is by name
    /// only: duplicate names resolve to the first registration.
    pub fn find(&self, declaring: &str, raw_name: &str) -> Option<&Arc<Member>> {
        self.members
            .iter()
            .find(|m| m.declaring == declaring && m.raw_name == raw_name)
    }

    /// Grouping marker in effect for `member`: member-level first, then
    /// the declaring type's.
    pub fn effective_group<'a>(&'a self, member: &'a Member) -> Option<&'a FixtureRef> {
        member
            .markers
            .group
            .as_ref()
            .or_else(|| self.type_groups.get(member.declaring))
    }

    pub fn members(&self) -> impl Iterator<Item = &Arc<Member>> {
        self.members.iter()
    }
}

/// One scanner hit: a test-marked member with its effective grouping.
pub struct Scanned<'a> {
    pub member: &'a Arc<Member>,
    pub group: Option<&'a FixtureRef>,
}

/// Enumerate the members of `module` bearing a test marker, regardless of
/// visibility or instance/static shape. Read-only: nothing is instantiated
/// and nothing is resolved.
pub fn scan(module: &Module) -> Vec<Scanned<'_>> {
    module
        .members
        .iter()
        .filter(|m| m.markers.test.is_some())
        .map(|member| Scanned {
            group: module.effective_group(member),
            member,
        })
        .collect()
}

/// The set of registered sources a run can draw from.
#[derive(Default)]
pub struct ModuleSet {
    modules: Vec<Arc<Module>>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Module) -> &mut Self {
        self.modules.push(Arc::new(module));
        self
    }

    /// Load a source by name. An unknown source is a load error; callers
    /// isolate the failure to that source and keep scanning the others.
    pub fn load(&self, source: &str) -> Result<&Arc<Module>, EngineError> {
        self.modules
            .iter()
            .find(|m| m.name == source)
            .ok_or_else(|| EngineError(format!("cannot load test source `{}`", source)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Module>> {
        self.modules.iter()
    }
}
