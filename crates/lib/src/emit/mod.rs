//! Plan emission.
//!
//! Writes a [`Plan`] as a solution file plus one project file per project:
//!
//! ```text
//! <build>/<solution>.solution.json
//! <build>/projects/<name>/<name>.project.json
//! ```
//!
//! A file whose content is already what would be written is left alone, so
//! regenerating with unchanged build scripts touches nothing.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::PROJECTS_DIR;
use crate::plan::{Plan, ProjectPlan};

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
  #[error("failed to create directory {path}: {source}")]
  CreateDir {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to write {path}: {source}")]
  Write {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialize {what}: {source}")]
  Serialize {
    what: String,
    #[source]
    source: serde_json::Error,
  },
}

/// What happened to one generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
  Created,
  Updated,
  Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
  pub path: PathBuf,
  pub status: FileStatus,
}

/// The files a run produced, solution file first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitReport {
  pub files: Vec<EmittedFile>,
}

impl EmitReport {
  pub fn count(&self, status: FileStatus) -> usize {
    self.files.iter().filter(|f| f.status == status).count()
  }

  /// Whether any file was created or rewritten.
  pub fn changed(&self) -> bool {
    self.files.iter().any(|f| f.status != FileStatus::Unchanged)
  }
}

/// A project as listed in the solution file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionEntry {
  pub name: String,
  pub folder: Option<String>,
  /// Project file path relative to the build directory.
  pub path: String,
  pub dependencies: Vec<String>,
  pub configurations: Vec<String>,
}

/// Contents of `<solution>.solution.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionFile {
  pub solution: String,
  pub fingerprint: String,
  pub resource_builder: String,
  pub projects: Vec<SolutionEntry>,
}

impl SolutionFile {
  pub fn from_plan(plan: &Plan) -> Self {
    Self {
      solution: plan.solution.clone(),
      fingerprint: plan.fingerprint.clone(),
      resource_builder: plan.resource_builder.clone(),
      projects: plan
        .projects
        .iter()
        .map(|p| SolutionEntry {
          name: p.name.clone(),
          folder: p.folder.clone(),
          path: project_file(&p.name),
          dependencies: p.dependencies.clone(),
          configurations: configuration_names(p),
        })
        .collect(),
    }
  }
}

fn configuration_names(project: &ProjectPlan) -> Vec<String> {
  let mut seen = HashSet::new();
  project
    .configurations
    .iter()
    .filter(|c| seen.insert(c.name.as_str()))
    .map(|c| c.name.clone())
    .collect()
}

/// Project file path relative to the build directory, `/`-separated.
pub fn project_file(name: &str) -> String {
  format!("{}/{}/{}.project.json", PROJECTS_DIR, name, name)
}

pub fn solution_file(solution: &str) -> String {
  format!("{}.solution.json", solution)
}

fn to_json<T: Serialize>(what: &str, value: &T) -> Result<String, EmitError> {
  let mut json = serde_json::to_string_pretty(value).map_err(|source| EmitError::Serialize {
    what: what.to_string(),
    source,
  })?;
  json.push('\n');
  Ok(json)
}

/// Write `contents` to `path` unless it already holds exactly that.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<FileStatus, EmitError> {
  let status = match fs::read(path) {
    Ok(existing) if existing == contents.as_bytes() => return Ok(FileStatus::Unchanged),
    Ok(_) => FileStatus::Updated,
    Err(_) => FileStatus::Created,
  };

  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(|source| EmitError::CreateDir {
      path: parent.display().to_string(),
      source,
    })?;
  }

  fs::write(path, contents).map_err(|source| EmitError::Write {
    path: path.display().to_string(),
    source,
  })?;
  Ok(status)
}

/// Write the solution and project files under `build_dir`.
pub fn emit(plan: &Plan, build_dir: &Path) -> Result<EmitReport, EmitError> {
  let mut report = EmitReport::default();

  let solution = SolutionFile::from_plan(plan);
  let path = build_dir.join(solution_file(&plan.solution));
  let status = write_if_changed(&path, &to_json("solution", &solution)?)?;
  debug!(path = %path.display(), ?status, "solution file");
  report.files.push(EmittedFile { path, status });

  for project in &plan.projects {
    let path = build_dir.join(project_file(&project.name));
    let status = write_if_changed(&path, &to_json(&project.name, project)?)?;
    debug!(path = %path.display(), ?status, "project file");
    report.files.push(EmittedFile { path, status });
  }

  info!(
    build_dir = %build_dir.display(),
    created = report.count(FileStatus::Created),
    updated = report.count(FileStatus::Updated),
    unchanged = report.count(FileStatus::Unchanged),
    "emitted plan"
  );
  Ok(report)
}
