//! Source and asset discovery.
//!
//! A module that does not list its files explicitly gets them from a single
//! walk of its source root when it is defined. Paths come back relative to
//! the root, `/`-separated and sorted, so the result does not depend on the
//! host filesystem's directory order.

use std::path::Path;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Extensions collected as sources when a module does not override them.
pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &[".c", ".cc", ".cpp", ".cxx", ".h", ".hpp", ".inl"];

#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
  #[error("source root {path} does not exist")]
  MissingRoot { path: String },

  #[error("failed to traverse directory {path}: {source}")]
  WalkDir {
    path: String,
    #[source]
    source: walkdir::Error,
  },
}

/// Every file under `root` whose name ends with one of `suffixes`.
///
/// Suffixes are compared case-insensitively. Hidden directories (`.git`,
/// `.build`) are skipped.
pub fn discover_files(root: &Path, suffixes: &[&str]) -> Result<Vec<String>, DiscoverError> {
  if !root.is_dir() {
    return Err(DiscoverError::MissingRoot {
      path: root.display().to_string(),
    });
  }

  let suffixes: Vec<String> = suffixes.iter().map(|s| s.to_ascii_lowercase()).collect();
  let mut files = Vec::new();

  let walker = WalkDir::new(root)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

  for entry in walker {
    let entry = entry.map_err(|e| DiscoverError::WalkDir {
      path: root.display().to_string(),
      source: e,
    })?;
    if !entry.file_type().is_file() {
      continue;
    }

    let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
    if !suffixes.iter().any(|s| name.ends_with(s.as_str())) {
      continue;
    }

    if let Ok(relative) = entry.path().strip_prefix(root) {
      files.push(to_slash(relative));
    }
  }

  files.sort();
  debug!(root = %root.display(), count = files.len(), "discovered files");
  Ok(files)
}

/// A relative path rendered with `/` separators on every host.
pub fn to_slash(path: &Path) -> String {
  path
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}

fn is_hidden(entry: &DirEntry) -> bool {
  entry.file_name().to_string_lossy().starts_with('.')
}
