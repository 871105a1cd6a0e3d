//! Stand-in generation: behaviorally inert capability implementations used
//! when nothing is registered for an interface-typed parameter.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::registry::meta::{TypeKey, Value};

/// The stand-in generator contract the resolver consumes.
pub trait StandInSource: Send + Sync {
    /// Produce a default implementation for the capability type `ty`, or
    /// `None` if this source has no way to.
    fn create(&self, ty: TypeKey) -> Option<Value>;
}

/// Registry of per-capability stand-in factories. Trait implementations
/// cannot be synthesized at runtime, so each capability type installs its
/// no-op implementation here once.
#[derive(Default, Clone)]
pub struct StandIns {
    factories: HashMap<TypeKey, Arc<dyn Fn() -> Value + Send + Sync>>,
}

impl StandIns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the stand-in factory for capability type `T`.
    pub fn provide<T, F>(&mut self, f: F) -> &mut Self
    where
        T: Any + Send,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factories
            .insert(TypeKey::of::<T>(), Arc::new(move || Box::new(f()) as Value));
        self
    }
}

impl StandInSource for StandIns {
    fn create(&self, ty: TypeKey) -> Option<Value> {
        self.factories.get(&ty).map(|f| f())
    }
}
