//! Shared helpers for the Lua-driven library tests.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use buildgraph_lib::config::GenerateConfig;
use buildgraph_lib::eval::{EvalError, evaluate_config};
use buildgraph_lib::manifest::Manifest;
use buildgraph_lib::plan::{ConfigurationPlan, Plan, PlanError, ProjectPlan, generate};
use buildgraph_lib::platform::{Optimization, Platform, TargetKey, Toolchain};
use mlua::prelude::*;
use tempfile::TempDir;

/// Create a runtime rooted at a fresh temporary directory.
///
/// The directory is returned so it outlives the runtime.
pub fn create_test_runtime() -> LuaResult<(Lua, Rc<RefCell<Manifest>>, TempDir)> {
  let temp = TempDir::new().unwrap();
  let root = dunce::canonicalize(temp.path()).unwrap();
  let manifest = Rc::new(RefCell::new(Manifest::default()));
  let lua = buildgraph_lib::lua::runtime::create_runtime(manifest.clone(), &root)?;
  Ok((lua, manifest, temp))
}

/// A temporary project with a `build.lua` entry script.
pub struct TestProject {
  pub temp: TempDir,
  pub config: GenerateConfig,
}

impl TestProject {
  pub fn new(script: &str) -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("build.lua"), script).unwrap();
    let config = GenerateConfig::resolve(Some(temp.path()), Some(Path::new(".build"))).unwrap();
    Self { temp, config }
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) -> &Self {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    self
  }

  pub fn evaluate(&self) -> Result<Manifest, EvalError> {
    evaluate_config(&self.config.entry_script(None), &self.config)
  }

  pub fn try_plan(&self) -> Result<Plan, PlanError> {
    let manifest = self.evaluate().unwrap_or_else(|e| panic!("evaluation failed: {}", e));
    generate(&manifest)
  }

  pub fn plan(&self) -> Plan {
    self.try_plan().unwrap_or_else(|e| panic!("planning failed: {}", e))
  }
}

pub fn key(platform: Platform, optimization: Optimization) -> TargetKey {
  TargetKey {
    platform,
    toolchain: Toolchain::Vs2019,
    optimization,
  }
}

/// The configuration of `project` for `platform`/`optimization`.
pub fn configuration<'a>(
  plan: &'a Plan,
  project: &str,
  platform: Platform,
  optimization: Optimization,
) -> &'a ConfigurationPlan {
  let project: &ProjectPlan = plan
    .project(project)
    .unwrap_or_else(|| panic!("no project {}", project));
  let wanted = key(platform, optimization);
  project
    .configurations
    .iter()
    .find(|c| c.target.key() == wanted)
    .unwrap_or_else(|| panic!("{} has no configuration for {}", project.name, wanted))
}
