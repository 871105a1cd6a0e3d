//! Dependency resolution: the container contract, configuration fixtures,
//! stand-ins, and the per-parameter policy.

pub mod container;
pub mod fixture;
pub mod params;
pub mod standin;

pub use container::{ContainerBuilder, Resolver};
pub use fixture::{Fixture, FixtureRef};
pub use params::{resolve, Arg, Args, Callback, Resolution};
pub use standin::{StandInSource, StandIns};
