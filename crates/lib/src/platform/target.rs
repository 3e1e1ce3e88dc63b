use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Platform, UnknownValueError};

/// Compiler toolchain a configuration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
  Vs2017,
  Vs2019,
  Vs2022,
  Gcc,
  Clang,
}

impl Toolchain {
  pub const ALL: [Toolchain; 5] = [Self::Vs2017, Self::Vs2019, Self::Vs2022, Self::Gcc, Self::Clang];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Vs2017 => "vs2017",
      Self::Vs2019 => "vs2019",
      Self::Vs2022 => "vs2022",
      Self::Gcc => "gcc",
      Self::Clang => "clang",
    }
  }
}

impl fmt::Display for Toolchain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Toolchain {
  type Err = UnknownValueError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.to_ascii_lowercase();
    Self::ALL
      .into_iter()
      .find(|t| t.as_str() == lower)
      .ok_or_else(|| UnknownValueError::new("toolchain", s))
  }
}

/// Optimization level of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimization {
  Debug,
  Release,
  Retail,
}

impl Optimization {
  pub const ALL: [Optimization; 3] = [Self::Debug, Self::Release, Self::Retail];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debug => "debug",
      Self::Release => "release",
      Self::Retail => "retail",
    }
  }

  /// Capitalized name used in configuration names (`Debug_Lib`).
  pub fn display_name(&self) -> &'static str {
    match self {
      Self::Debug => "Debug",
      Self::Release => "Release",
      Self::Retail => "Retail",
    }
  }

  /// The `<P>_BUILD_*` define. Retail builds are the "master" build.
  pub fn define(&self, prefix: &str) -> String {
    let level = match self {
      Self::Debug => "DEBUG",
      Self::Release => "RELEASE",
      Self::Retail => "MASTER",
    };
    format!("{}_BUILD_{}", prefix, level)
  }
}

impl fmt::Display for Optimization {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Optimization {
  type Err = UnknownValueError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.to_ascii_lowercase();
    Self::ALL
      .into_iter()
      .find(|o| o.as_str() == lower)
      .ok_or_else(|| UnknownValueError::new("optimization", s))
  }
}

/// What a configuration produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
  Lib,
  Dll,
  Exe,
}

impl OutputKind {
  pub const ALL: [OutputKind; 3] = [Self::Lib, Self::Dll, Self::Exe];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Lib => "lib",
      Self::Dll => "dll",
      Self::Exe => "exe",
    }
  }

  pub fn display_name(&self) -> &'static str {
    match self {
      Self::Lib => "Lib",
      Self::Dll => "Dll",
      Self::Exe => "Exe",
    }
  }
}

impl fmt::Display for OutputKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for OutputKind {
  type Err = UnknownValueError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let lower = s.to_ascii_lowercase();
    Self::ALL
      .into_iter()
      .find(|o| o.as_str() == lower)
      .ok_or_else(|| UnknownValueError::new("output", s))
  }
}

/// The (platform, toolchain, optimization) triple shared by a module and its
/// dependencies. A library and the executable that links it share a key
/// while differing in output kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetKey {
  pub platform: Platform,
  pub toolchain: Toolchain,
  pub optimization: Optimization,
}

impl fmt::Display for TargetKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}/{}", self.platform, self.toolchain, self.optimization)
  }
}

/// One concrete build configuration of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlatformTarget {
  pub platform: Platform,
  pub toolchain: Toolchain,
  pub optimization: Optimization,
  pub output: OutputKind,
}

impl PlatformTarget {
  pub fn new(platform: Platform, toolchain: Toolchain, optimization: Optimization, output: OutputKind) -> Self {
    Self {
      platform,
      toolchain,
      optimization,
      output,
    }
  }

  pub fn key(&self) -> TargetKey {
    TargetKey {
      platform: self.platform,
      toolchain: self.toolchain,
      optimization: self.optimization,
    }
  }

  /// Configuration name as shown in generated projects.
  ///
  /// Executables use the bare optimization (`Release`), everything else
  /// appends the output kind (`Release_Lib`).
  pub fn configuration_name(&self) -> String {
    match self.output {
      OutputKind::Exe => self.optimization.display_name().to_string(),
      _ => format!("{}_{}", self.optimization.display_name(), self.output.display_name()),
    }
  }
}

impl fmt::Display for PlatformTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.key(), self.output)
  }
}
