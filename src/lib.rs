//! Tagrun is a lightweight, metadata-driven test discovery and execution
//! harness.
//!
//! A tagrun test source is a [Module][m]: an explicit registry of callable
//! members, each carrying marker metadata attached at registration time.
//! The engine scans the registered members for test markers, builds
//! addressable test case descriptors, resolves each member's parameters
//! through a per-test dependency container (with stand-in fallback for
//! capability types), invokes the body uniformly over sync and async, and
//! classifies every dispatched case as passed, failed, or skipped.
//!
//! ## Testing Model
//!
//! A member is registered with its declaring type, raw name, markers,
//! parameter specifications, and body. Registering the member is the
//! "load time" at which its metadata becomes a read-only fact:
//!
//! ```
//! use tagrun::registry::{Member, Module, ModuleSet};
//!
//! let mut module = Module::new("demo");
//! module.register(
//!     Member::builder("Calculator", "adds_numbers")
//!         .test()
//!         .sync_body(|_, _| Ok(()))
//!         .build(),
//! );
//!
//! let mut modules = ModuleSet::new();
//! modules.register(module);
//!
//! let cases = tagrun::discover::build_cases(modules.load("demo").unwrap());
//! assert_eq!(cases[0].id, "Calculator.adds_numbers");
//! ```
//!
//! Discovery is a pure metadata pass; execution is a single sequential
//! run: each case is awaited to completion before the next is dispatched,
//! outcomes are reported in dispatch order, and a fresh declaring-type
//! instance and container are built for every invocation so nothing is
//! shared between tests.
//!
//! ## Dependency Resolution
//!
//! A grouping marker names a [Fixture][f] type. For every invocation a
//! fresh fixture is activated, `configure` is called exactly once to
//! populate an isolated container, and the declaring type is registered as
//! resolvable. Parameters resolve in order: callback parameters bind to
//! the caller-supplied callable, container hits win next, capability
//! (trait-object) parameters fall back to a registered stand-in, and a
//! concrete miss soft-fails to an absent slot so unconfigured tests still
//! run. A failed provider inside the container is never downgraded: it
//! becomes the test's failure cause.
//!
//! ## Theories
//!
//! A test member declared inside another test member keeps its generated
//! local-function name, e.g. `<adds>g__rounds|0_0`. The engine never
//! invokes such a member directly; it resolves the parent by the decoded
//! name and invokes the parent with the nested member bound to the
//! parent's callback parameter. A parent that never calls its callback
//! reports the nested case as passing.
//!
//! ## Running and Filters
//!
//! The harness entry point is embedded in the program that owns the
//! registrations:
//!
//! ```no_run
//! use tagrun::{harness, registry::ModuleSet, resolve::StandIns};
//!
//! fn main() {
//!     let modules = ModuleSet::new();
//!     std::process::exit(harness::main(modules, StandIns::new()));
//! }
//! ```
//!
//! The `--include` and `--exclude` flags select cases by regex, matched
//! against the string `<module>:<declaringType>.<member>`. The `--only`
//! flag suppresses output for all but one outcome class:
//!
//! ```text
//! ✗ Calculator.divides_by_zero (InvalidOperation)
//! ⚬ Calculator.adds_slowly (skipped: flaky)
//!   3 passing / 1 failing / 1 skipped
//! ```
//!
//! A TOML run request can stand in for the flags and also pick which
//! registered sources to load:
//!
//! ```toml
//! ver = "0.1.0"
//! sources = ["demo"]
//! exclude = "Calculator\\..*_slowly"
//! ```
//!
//! An unloadable source is isolated: it contributes no test cases and the
//! other sources still run. The exit status is the number of failing
//! cases.
//!
//! [m]: registry::Module
//! [f]: resolve::Fixture
pub mod check;
pub mod cli;
pub mod discover;
pub mod engine;
pub mod errors;
pub mod harness;
pub mod picker;
pub mod registry;
pub mod resolve;
pub mod theory;
