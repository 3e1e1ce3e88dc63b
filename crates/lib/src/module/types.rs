use serde::{Deserialize, Serialize};

use crate::matrix::{TargetSpec, expand};
use crate::platform::{OutputKind, PlatformTarget, TargetKey};
use crate::predicate::Predicate;
use crate::steps::TransformRule;

/// What kind of compilation unit a module is.
///
/// The kind selects the policies applied during planning (global defines,
/// solution folder, whether a project is emitted at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
  /// An engine library built from source.
  Library,
  /// A third-party dependency built from source.
  DependencySource,
  /// A prebuilt third-party dependency: headers, defines and libraries only.
  DependencyBinary,
  Executable,
}

impl ModuleKind {
  pub const ALL: [ModuleKind; 4] = [
    Self::Library,
    Self::DependencySource,
    Self::DependencyBinary,
    Self::Executable,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Library => "library",
      Self::DependencySource => "dependency_source",
      Self::DependencyBinary => "dependency_binary",
      Self::Executable => "executable",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|k| k.as_str() == s)
  }

  pub fn default_output(&self) -> OutputKind {
    match self {
      Self::Executable => OutputKind::Exe,
      Self::Library | Self::DependencySource | Self::DependencyBinary => OutputKind::Lib,
    }
  }

  /// Whether the module has sources of its own to compile.
  pub fn builds_from_source(&self) -> bool {
    !matches!(self, Self::DependencyBinary)
  }

  /// Whether engine-wide defines and include dirs apply.
  pub fn uses_engine_settings(&self) -> bool {
    self.builds_from_source()
  }

  /// Solution folder used when the module does not name one. Libraries go
  /// in `engine_folder`, executables stay at the top level.
  pub fn default_folder(&self, engine_folder: &str) -> Option<String> {
    match self {
      Self::DependencySource | Self::DependencyBinary => Some("dependencies".to_string()),
      Self::Library => Some(engine_folder.to_string()),
      Self::Executable => None,
    }
  }
}

impl std::fmt::Display for ModuleKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Whether a dependency's exports flow on to the dependent's own dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
  Public,
  Private,
}

/// Whether a dependency is linked or only contributes headers and defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
  Link,
  Headers,
}

/// An edge from the owning module to `module`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
  pub module: String,
  pub visibility: Visibility,
  pub linkage: Linkage,
}

impl DependencyEdge {
  pub fn public(module: &str) -> Self {
    Self {
      module: module.to_string(),
      visibility: Visibility::Public,
      linkage: Linkage::Link,
    }
  }

  pub fn private(module: &str) -> Self {
    Self {
      module: module.to_string(),
      visibility: Visibility::Private,
      linkage: Linkage::Link,
    }
  }

  pub fn headers_only(mut self) -> Self {
    self.linkage = Linkage::Headers;
    self
  }
}

/// What an exclusion rule matches against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionPattern {
  /// A file whose stem ends in `_<suffix>`, e.g. `Window_linux.cpp`.
  Suffix(String),
  /// A file with `<folder>` as one of its directory components.
  Folder(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
  pub pattern: ExclusionPattern,
  pub when: Predicate,
}

/// Settings that may vary per target.
///
/// A module has one base `Settings` plus any number of [`Conditional`]s; the
/// effective settings for a target are the base followed by every matching
/// conditional, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
  /// Defines used only when compiling this module.
  pub defines: Vec<String>,
  /// Defines passed on to dependents.
  pub exported_defines: Vec<String>,
  /// Include paths relative to the module root, passed on to dependents.
  pub include_paths: Vec<String>,
  /// Include paths relative to the module root, used only by this module.
  pub private_include_paths: Vec<String>,
  pub library_paths: Vec<String>,
  pub library_files: Vec<String>,
  /// Files relative to the module root, copied next to the output of every
  /// module that links this one.
  pub copy_files: Vec<String>,
  /// Compiler and linker options for this module only.
  pub options: Vec<String>,
  /// Output directory relative to the module root. The last active value
  /// wins.
  pub target_path: Option<String>,
  pub dependencies: Vec<DependencyEdge>,
  pub exclude: Vec<ExclusionRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditional {
  pub when: Predicate,
  pub settings: Settings,
}

/// Static description of one compilation unit.
///
/// Created once while the build scripts are evaluated and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDef {
  pub name: String,
  pub kind: ModuleKind,
  pub output: OutputKind,
  /// Source root relative to the project root, with `/` separators.
  pub root: String,
  /// Declared source files relative to `root`, sorted.
  pub sources: Vec<String>,
  /// Asset files relative to `root`, sorted. Only consumed by transforms.
  pub assets: Vec<String>,
  pub targets: TargetSpec,
  pub transforms: Vec<TransformRule>,
  /// Solution folder override.
  pub folder: Option<String>,
  pub settings: Settings,
  pub conditionals: Vec<Conditional>,
}

impl ModuleDef {
  /// A module with no sources, default targets and empty settings.
  pub fn new(name: &str, kind: ModuleKind, root: &str) -> Self {
    Self {
      name: name.to_string(),
      kind,
      output: kind.default_output(),
      root: root.to_string(),
      sources: Vec::new(),
      assets: Vec::new(),
      targets: TargetSpec::default(),
      transforms: Vec::new(),
      folder: None,
      settings: Settings::default(),
      conditionals: Vec::new(),
    }
  }

  /// The base settings followed by every conditional that holds for `key`.
  pub fn active_settings<'a>(&'a self, key: &'a TargetKey) -> impl Iterator<Item = &'a Settings> + 'a {
    std::iter::once(&self.settings).chain(
      self
        .conditionals
        .iter()
        .filter(move |c| c.when.matches(key))
        .map(|c| &c.settings),
    )
  }

  /// Dependency edges active for `key`, in declaration order.
  pub fn dependencies_for<'a>(&'a self, key: &'a TargetKey) -> impl Iterator<Item = &'a DependencyEdge> + 'a {
    self.active_settings(key).flat_map(|s| s.dependencies.iter())
  }

  /// Every target this module is generated for.
  pub fn expand_targets(&self) -> Vec<PlatformTarget> {
    expand(&self.targets, self.output)
  }

  /// Joins a path relative to the module root onto the root.
  pub fn root_relative(&self, path: &str) -> String {
    if self.root.is_empty() || self.root == "." {
      path.to_string()
    } else {
      format!("{}/{}", self.root.trim_end_matches('/'), path)
    }
  }
}
