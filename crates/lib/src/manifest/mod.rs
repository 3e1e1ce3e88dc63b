//! The evaluated module graph.
//!
//! A manifest is produced once per run by evaluating the build scripts and is
//! never mutated during planning.

mod types;

pub use types::*;
