//! Target matrix expansion.
//!
//! A [`TargetSpec`] declares which platforms, toolchains and optimization
//! levels a module supports. [`expand`] turns it into the full Cartesian
//! product of [`PlatformTarget`]s.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::platform::{Optimization, OutputKind, Platform, PlatformTarget, TargetKey, Toolchain};

/// The axes of a module's target matrix.
///
/// Axes are sets, so duplicates in a build script collapse and iteration
/// follows enum declaration order no matter how the script listed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
  pub platforms: BTreeSet<Platform>,
  pub toolchains: BTreeSet<Toolchain>,
  pub optimizations: BTreeSet<Optimization>,
}

impl TargetSpec {
  /// Build a spec, rejecting empty axes.
  pub fn new(
    module: &str,
    platforms: impl IntoIterator<Item = Platform>,
    toolchains: impl IntoIterator<Item = Toolchain>,
    optimizations: impl IntoIterator<Item = Optimization>,
  ) -> Result<Self, ConfigError> {
    let spec = Self {
      platforms: platforms.into_iter().collect(),
      toolchains: toolchains.into_iter().collect(),
      optimizations: optimizations.into_iter().collect(),
    };
    spec.validate(module)?;
    Ok(spec)
  }

  /// The engine's default matrix: 32 and 64 bit Windows, VS2019, all
  /// optimization levels.
  pub fn engine_default() -> Self {
    Self {
      platforms: [Platform::Win32, Platform::Win64].into(),
      toolchains: [Toolchain::Vs2019].into(),
      optimizations: Optimization::ALL.into(),
    }
  }

  /// The matrix for host tools: 64 bit Windows only, no retail build.
  pub fn tools() -> Self {
    Self {
      platforms: [Platform::Win64].into(),
      toolchains: [Toolchain::Vs2019].into(),
      optimizations: [Optimization::Debug, Optimization::Release].into(),
    }
  }

  pub fn validate(&self, module: &str) -> Result<(), ConfigError> {
    let empty = if self.platforms.is_empty() {
      Some("platforms")
    } else if self.toolchains.is_empty() {
      Some("toolchains")
    } else if self.optimizations.is_empty() {
      Some("optimizations")
    } else {
      None
    };

    match empty {
      Some(axis) => Err(ConfigError::EmptyAxis {
        module: module.to_string(),
        axis,
      }),
      None => Ok(()),
    }
  }

  /// Whether the matrix contains the given (platform, toolchain, optimization).
  pub fn contains(&self, key: &TargetKey) -> bool {
    self.platforms.contains(&key.platform)
      && self.toolchains.contains(&key.toolchain)
      && self.optimizations.contains(&key.optimization)
  }

  /// Number of configurations this spec expands to.
  pub fn len(&self) -> usize {
    self.platforms.len() * self.toolchains.len() * self.optimizations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Default for TargetSpec {
  fn default() -> Self {
    Self::engine_default()
  }
}

/// Expand a target spec into concrete targets.
///
/// Nesting is platform, then toolchain, then optimization, so the result is
/// sorted and stable across runs.
pub fn expand(spec: &TargetSpec, output: OutputKind) -> Vec<PlatformTarget> {
  let mut targets = Vec::with_capacity(spec.len());
  for &platform in &spec.platforms {
    for &toolchain in &spec.toolchains {
      for &optimization in &spec.optimizations {
        targets.push(PlatformTarget::new(platform, toolchain, optimization, output));
      }
    }
  }
  targets
}
