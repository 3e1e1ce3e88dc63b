//! Run configuration.
//!
//! Where the build scripts live and where generated files go. Each value
//! comes from an explicit flag, then the environment, then a default.

use std::path::{Path, PathBuf};

use crate::consts::{BUILD_DIR_ENV, DEFAULT_BUILD_DIR, DEFAULT_CONFIG_FILE, ROOT_ENV};

#[derive(Debug, thiserror::Error)]
pub enum ConfigPathError {
  #[error("root directory {path} is not accessible: {source}")]
  Root {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("cannot determine the current directory: {0}")]
  CurrentDir(#[source] std::io::Error),
}

/// Paths for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
  /// Canonical project root. Module roots and generated paths are relative
  /// to it.
  pub root_dir: PathBuf,
  /// Directory receiving the generated files.
  pub build_dir: PathBuf,
}

impl GenerateConfig {
  /// Resolve the configuration from optional flags and the environment.
  ///
  /// - root: `root` flag, then `BGRAPH_ROOT`, then the current directory
  /// - build dir: `build_dir` flag, then `BGRAPH_BUILD_DIR`, then
  ///   `<root>/.build`
  ///
  /// A relative build dir is taken relative to the root.
  pub fn resolve(root: Option<&Path>, build_dir: Option<&Path>) -> Result<Self, ConfigPathError> {
    let root = match root {
      Some(root) => root.to_path_buf(),
      None => match std::env::var(ROOT_ENV) {
        Ok(root) if !root.is_empty() => PathBuf::from(root),
        _ => std::env::current_dir().map_err(ConfigPathError::CurrentDir)?,
      },
    };
    let root_dir = dunce::canonicalize(&root).map_err(|source| ConfigPathError::Root {
      path: root.display().to_string(),
      source,
    })?;

    let build_dir = match build_dir {
      Some(dir) => dir.to_path_buf(),
      None => match std::env::var(BUILD_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_BUILD_DIR),
      },
    };
    let build_dir = if build_dir.is_absolute() {
      build_dir
    } else {
      root_dir.join(build_dir)
    };

    Ok(Self { root_dir, build_dir })
  }

  /// The entry script: `config` if given (relative to the root), otherwise
  /// `<root>/build.lua`.
  pub fn entry_script(&self, config: Option<&Path>) -> PathBuf {
    match config {
      Some(path) if path.is_absolute() => path.to_path_buf(),
      Some(path) => self.root_dir.join(path),
      None => self.root_dir.join(DEFAULT_CONFIG_FILE),
    }
  }
}
