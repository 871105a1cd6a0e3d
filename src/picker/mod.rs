//! Pickers gather the set of sources and filters for a run.

pub mod toml;
