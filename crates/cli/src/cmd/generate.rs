//! Implementation of the `bgraph generate` command.
//!
//! Evaluates the build scripts, plans every project and writes the solution
//! and project files. Files whose content did not change are left untouched.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use buildgraph_lib::config::GenerateConfig;
use buildgraph_lib::emit::{FileStatus, emit};

use super::plan::{load_plan, warn_unmatched};
use crate::output::{print_file_status, print_info, print_stat, print_success};

pub fn cmd_generate(config: Option<&Path>, root: Option<&Path>, build_dir: Option<&Path>, verbose: bool) -> Result<()> {
  let settings = GenerateConfig::resolve(root, build_dir).context("Failed to resolve directories")?;
  debug!(root = %settings.root_dir.display(), build_dir = %settings.build_dir.display(), "generate");

  let plan = load_plan(config, &settings)?;
  warn_unmatched(&plan);

  let report = emit(&plan, &settings.build_dir)
    .with_context(|| format!("Failed to write plan to {}", settings.build_dir.display()))?;

  if !report.changed() {
    print_info(&format!("{} is up to date", plan.solution));
  } else {
    print_success(&format!("Generated {}", plan.solution));
  }

  for file in &report.files {
    if verbose || file.status != FileStatus::Unchanged {
      let path = file.path.strip_prefix(&settings.build_dir).unwrap_or(&file.path);
      print_file_status(file.status, &path.display().to_string());
    }
  }

  println!();
  print_stat("Written", &(report.count(FileStatus::Created) + report.count(FileStatus::Updated)).to_string());
  print_stat("Unchanged", &report.count(FileStatus::Unchanged).to_string());
  print_stat("Build directory", &settings.build_dir.display().to_string());

  Ok(())
}
