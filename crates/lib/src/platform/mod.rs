//! Structured platform model.
//!
//! Every conditional in a build script is evaluated against these enums
//! rather than against strings, so a typo in a platform name fails when the
//! script is evaluated instead of silently never matching.

mod system;
mod target;

pub use system::{Platform, PlatformClass};
pub use target::{Optimization, OutputKind, PlatformTarget, TargetKey, Toolchain};

/// A string that does not name any value of a target axis.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {axis} '{value}'")]
pub struct UnknownValueError {
  pub axis: &'static str,
  pub value: String,
}

impl UnknownValueError {
  pub fn new(axis: &'static str, value: &str) -> Self {
    Self {
      axis,
      value: value.to_string(),
    }
  }
}
