//! The injection-container contract the resolver consumes: registration
//! through [ContainerBuilder], lookup through [Resolver]. Each test
//! invocation builds and discards its own container instance.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::EngineError;
use crate::registry::meta::{TypeKey, Value};

pub(crate) type Provider = Arc<dyn Fn(&Resolver) -> Result<Value, EngineError> + Send + Sync>;

/// Collects registrations for one isolated container instance.
#[derive(Default)]
pub struct ContainerBuilder {
    providers: HashMap<TypeKey, Provider>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider for `T`. The provider may resolve its own
    /// dependencies through the resolver it is handed; a missing
    /// transitive registration surfaces as a hard error, never as a soft
    /// miss.
    ///
    /// Binding a capability to an implementation is the same operation
    /// with a trait-object `T`, e.g.
    /// `provide::<Arc<dyn Audit>, _>(|_| Ok(Arc::new(Log) as Arc<dyn Audit>))`.
    pub fn provide<T, F>(&mut self, f: F) -> &mut Self
    where
        T: Any + Send,
        F: Fn(&Resolver) -> Result<T, EngineError> + Send + Sync + 'static,
    {
        self.providers.insert(
            TypeKey::of::<T>(),
            Arc::new(move |r| f(r).map(|v| Box::new(v) as Value)),
        );
        self
    }

    /// Register a singleton value for `T`, handed out by clone.
    pub fn instance<T>(&mut self, value: T) -> &mut Self
    where
        T: Any + Clone + Send + Sync,
    {
        self.provide(move |_| Ok(value.clone()))
    }

    /// Register a default provider for `ty` unless one exists. Used by the
    /// resolver to make the declaring type resolvable; a registration made
    /// in `configure` wins.
    pub(crate) fn provide_default_raw(&mut self, ty: TypeKey, provider: Provider) {
        self.providers.entry(ty).or_insert(provider);
    }

    pub fn build(self) -> Resolver {
        Resolver {
            providers: self.providers,
        }
    }
}

/// Read side of a built container.
pub struct Resolver {
    providers: HashMap<TypeKey, Provider>,
}

impl Resolver {
    /// Resolve `ty` if registered. `Ok(None)` is a lookup miss; `Err` is a
    /// failed provider and is never downgraded.
    pub fn try_resolve(&self, ty: TypeKey) -> Result<Option<Value>, EngineError> {
        match self.providers.get(&ty) {
            None => Ok(None),
            Some(provider) => provider(self).map(Some),
        }
    }

    /// Resolve `ty`, failing on an unregistered type.
    pub fn resolve_required(&self, ty: TypeKey) -> Result<Value, EngineError> {
        self.try_resolve(ty)?.ok_or_else(|| {
            EngineError(format!("`{}` is not registered in the container", ty.name()))
        })
    }

    /// Typed convenience over [Resolver::try_resolve]. A registration of a
    /// different type reads as a miss.
    pub fn resolve<T: Any + Send>(&self) -> Result<Option<T>, EngineError> {
        Ok(self
            .try_resolve(TypeKey::of::<T>())?
            .and_then(|v| v.downcast::<T>().ok().map(|b| *b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    struct Level(u32);

    #[test]
    fn singleton_values_are_handed_out_by_clone() {
        let mut builder = ContainerBuilder::new();
        builder.instance(Level(3));
        let resolver = builder.build();

        assert_eq!(resolver.resolve::<Level>().unwrap(), Some(Level(3)));
        assert_eq!(resolver.resolve::<Level>().unwrap(), Some(Level(3)));
    }

    #[test]
    fn unregistered_type_is_a_lookup_miss() {
        let resolver = ContainerBuilder::new().build();
        assert!(resolver.try_resolve(TypeKey::of::<Level>()).unwrap().is_none());
        assert!(resolver.resolve_required(TypeKey::of::<Level>()).is_err());
    }

    #[test]
    fn failed_transitive_resolution_propagates() {
        struct Needs(#[allow(dead_code)] Level);

        let mut builder = ContainerBuilder::new();
        // `Level` itself is never registered.
        builder.provide(|r| {
            let level = r
                .resolve::<Level>()?
                .ok_or_else(|| EngineError("`Level` is not registered".to_string()))?;
            Ok(Needs(level))
        });
        let resolver = builder.build();

        assert!(resolver.try_resolve(TypeKey::of::<Needs>()).is_err());
    }
}
