//! Configuration types: user-supplied units that populate an isolated
//! container for a test or group of tests.

use std::fmt;
use std::sync::Arc;

use super::container::ContainerBuilder;

/// A user-supplied configuration unit. One fresh value is activated per
/// test invocation and `configure` is called exactly once on it; no state
/// or registrations carry over between tests.
pub trait Fixture: Send {
    fn configure(&mut self, builder: &mut ContainerBuilder);
}

/// Grouping-marker payload: names a [Fixture] and knows how to activate a
/// fresh instance of it.
#[derive(Clone)]
pub struct FixtureRef {
    name: &'static str,
    make: Arc<dyn Fn() -> Box<dyn Fixture> + Send + Sync>,
}

impl FixtureRef {
    pub fn of<F>() -> Self
    where
        F: Fixture + Default + 'static,
    {
        FixtureRef {
            name: std::any::type_name::<F>(),
            make: Arc::new(|| Box::new(F::default())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Activate a fresh fixture instance.
    pub(crate) fn activate(&self) -> Box<dyn Fixture> {
        (self.make)()
    }
}

impl fmt::Debug for FixtureRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FixtureRef({})", self.name)
    }
}
