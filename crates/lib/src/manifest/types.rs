//! Manifest types.
//!
//! The manifest is the evaluated result of the build scripts: solution-wide
//! settings plus every declared module, keyed by name. It is the only input
//! to planning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_DEFINE_PREFIX;
use crate::module::ModuleDef;
use crate::util::hash::Hashable;

/// Settings that apply to the whole solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionSettings {
  /// Solution name, also the stem of the generated solution file.
  pub solution: String,
  /// Prefix for engine-wide defines, e.g. `ION` for `ION_ENGINE`.
  pub define_prefix: String,
  /// Include directories relative to the root, added to every module built
  /// from source.
  pub include_dirs: Vec<String>,
  /// Options added to every module built from source, e.g. `exceptions`.
  pub options: Vec<String>,
  /// Resource builder executable relative to the root.
  pub resource_builder: String,
}

impl Default for SolutionSettings {
  fn default() -> Self {
    Self {
      solution: "solution".to_string(),
      define_prefix: DEFAULT_DEFINE_PREFIX.to_string(),
      include_dirs: Vec::new(),
      options: Vec::new(),
      resource_builder: "ion/tools/buildresource/buildresource.exe".to_string(),
    }
  }
}

impl SolutionSettings {
  /// Solution folder for engine libraries: the define prefix in lowercase.
  pub fn engine_folder(&self) -> String {
    self.define_prefix.to_ascii_lowercase()
  }
}

/// The evaluated module graph.
///
/// Uses [`BTreeMap`] so serialization (and therefore the fingerprint) does not
/// depend on declaration order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
  pub settings: SolutionSettings,
  pub modules: BTreeMap<String, ModuleDef>,
}

impl Manifest {
  pub fn module(&self, name: &str) -> Option<&ModuleDef> {
    self.modules.get(name)
  }

  /// Modules that get a project of their own (everything but prebuilt
  /// binaries).
  pub fn project_modules(&self) -> impl Iterator<Item = &ModuleDef> {
    self.modules.values().filter(|m| m.kind.builds_from_source())
  }
}

impl Hashable for Manifest {}
