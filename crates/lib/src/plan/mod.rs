//! Build plan generation.
//!
//! Planning composes the per-module pieces into the concrete description of
//! every project configuration:
//!
//! 1. Expand each module's target matrix
//! 2. Build and validate one dependency graph per (platform, toolchain,
//!    optimization) in use, and resolve every module in it
//! 3. For each project configuration, compute the compiled file set, bind
//!    asset build steps and attach the resolved settings
//!
//! Planning is a pure function of the manifest. Independent targets and
//! modules are processed in parallel, and results are collected in a fixed
//! order so the plan is identical from run to run.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::graph::{ModuleGraph, Resolved, Resolver};
use crate::manifest::Manifest;
use crate::module::{ModuleDef, ModuleKind};
use crate::platform::{OutputKind, PlatformTarget, TargetKey};
use crate::rules::{compile_source_set, filter_files};
use crate::steps::{CustomBuildStep, bind_all};
use crate::util::hash::{HashError, Hashable};

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("failed to fingerprint manifest: {0}")]
  Fingerprint(#[from] HashError),
}

/// One configuration of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationPlan {
  /// Configuration name, e.g. `Debug_Lib`.
  pub name: String,
  pub target: PlatformTarget,
  /// Every declared source, relative to the project root.
  pub files: Vec<String>,
  /// The sources compiled for this target.
  pub compiled: Vec<String>,
  pub defines: Vec<String>,
  pub include_paths: Vec<String>,
  pub library_paths: Vec<String>,
  pub library_files: Vec<String>,
  /// Runtime files to copy next to the output, from this module and every
  /// module it links.
  pub copy_files: Vec<String>,
  pub options: Vec<String>,
  /// Output directory override, relative to the project root.
  pub target_path: Option<String>,
  /// Linked modules, dependents first.
  pub link_order: Vec<String>,
  pub build_steps: Vec<CustomBuildStep>,
  /// Files produced by `build_steps`.
  pub artifacts: Vec<String>,
  /// Assets a transform accepted but could not bind.
  pub unmatched_assets: Vec<String>,
}

/// A generated project: one module built from source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPlan {
  pub name: String,
  pub kind: ModuleKind,
  pub output: OutputKind,
  /// Solution folder, if any.
  pub folder: Option<String>,
  pub root: String,
  /// Projects this one depends on for at least one target.
  pub dependencies: Vec<String>,
  pub configurations: Vec<ConfigurationPlan>,
}

impl ProjectPlan {
  pub fn configuration(&self, name: &str, key: &TargetKey) -> Option<&ConfigurationPlan> {
    self
      .configurations
      .iter()
      .find(|c| c.name == name && c.target.key() == *key)
  }
}

/// The complete output of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
  pub solution: String,
  /// Fingerprint of the manifest the plan was generated from.
  pub fingerprint: String,
  pub resource_builder: String,
  /// Projects sorted by name.
  pub projects: Vec<ProjectPlan>,
}

impl Plan {
  pub fn project(&self, name: &str) -> Option<&ProjectPlan> {
    self.projects.iter().find(|p| p.name == name)
  }

  pub fn configuration_count(&self) -> usize {
    self.projects.iter().map(|p| p.configurations.len()).sum()
  }
}

type ResolvedByTarget = HashMap<TargetKey, HashMap<String, Resolved>>;

/// Generate the plan for a manifest.
///
/// # Errors
///
/// Any [`ConfigError`] from graph construction: unknown modules, missing
/// targets or cycles. When several targets fail, the error for the first
/// target in sort order is returned.
pub fn generate(manifest: &Manifest) -> Result<Plan, PlanError> {
  let fingerprint = manifest.compute_hash()?;
  let resolved = resolve_all(manifest)?;

  let modules: Vec<&ModuleDef> = manifest.project_modules().collect();
  let projects: Vec<ProjectPlan> = modules
    .par_iter()
    .map(|module| plan_project(manifest, module, &resolved))
    .collect();

  let plan = Plan {
    solution: manifest.settings.solution.clone(),
    fingerprint: fingerprint.0,
    resource_builder: manifest.settings.resource_builder.clone(),
    projects,
  };

  info!(
    solution = %plan.solution,
    projects = plan.projects.len(),
    configurations = plan.configuration_count(),
    "generated plan"
  );
  Ok(plan)
}

/// Build one graph per target key in use and resolve every module in it.
fn resolve_all(manifest: &Manifest) -> Result<ResolvedByTarget, ConfigError> {
  let keys: BTreeSet<TargetKey> = manifest
    .modules
    .values()
    .flat_map(|m| m.expand_targets())
    .map(|t| t.key())
    .collect();
  let keys: Vec<TargetKey> = keys.into_iter().collect();

  let results: Vec<Result<(TargetKey, HashMap<String, Resolved>), ConfigError>> = keys
    .par_iter()
    .map(|&key| {
      let graph = ModuleGraph::for_target(&manifest.modules, key)?;
      let mut resolver = Resolver::new(&graph, &manifest.settings);
      let mut resolved = HashMap::new();
      for name in graph.build_order() {
        if let Some(r) = resolver.resolve(name) {
          resolved.insert(name.to_string(), r);
        }
      }
      debug!(target = %key, modules = resolved.len(), "resolved target");
      Ok((key, resolved))
    })
    .collect();

  results.into_iter().collect()
}

fn plan_project(manifest: &Manifest, module: &ModuleDef, resolved: &ResolvedByTarget) -> ProjectPlan {
  let tool = manifest.settings.resource_builder.as_str();

  let configurations = module
    .expand_targets()
    .into_iter()
    .map(|target| plan_configuration(module, target, tool, resolved))
    .collect();

  ProjectPlan {
    name: module.name.clone(),
    kind: module.kind,
    output: module.output,
    folder: module
      .folder
      .clone()
      .or_else(|| module.kind.default_folder(&manifest.settings.engine_folder())),
    root: module.root.clone(),
    dependencies: project_dependencies(manifest, module),
    configurations,
  }
}

fn plan_configuration(
  module: &ModuleDef,
  target: PlatformTarget,
  tool: &str,
  resolved: &ResolvedByTarget,
) -> ConfigurationPlan {
  let key = target.key();

  let files = module.sources.iter().map(|f| module.root_relative(f)).collect();
  let compiled = compile_source_set(module, &target)
    .iter()
    .map(|f| module.root_relative(f))
    .collect();

  let assets: Vec<String> = filter_files(&module.assets, module, &target)
    .into_iter()
    .map(|a| module.root_relative(a))
    .collect();
  let asset_refs: Vec<&str> = assets.iter().map(String::as_str).collect();
  let binding = bind_all(&asset_refs, &module.transforms, tool);

  // Every module supporting `key` was resolved, including this one.
  let inherited = resolved
    .get(&key)
    .and_then(|r| r.get(&module.name))
    .cloned()
    .unwrap_or_default();

  ConfigurationPlan {
    name: target.configuration_name(),
    target,
    files,
    compiled,
    defines: inherited.defines,
    include_paths: inherited.include_paths,
    library_paths: inherited.library_paths,
    library_files: inherited.library_files,
    copy_files: inherited.copy_files,
    options: inherited.options,
    target_path: inherited.target_path,
    link_order: inherited.link_order,
    artifacts: binding.artifacts().map(str::to_string).collect(),
    build_steps: binding.steps,
    unmatched_assets: binding.unmatched,
  }
}

/// Direct dependencies that have a project of their own, across every
/// target.
fn project_dependencies(manifest: &Manifest, module: &ModuleDef) -> Vec<String> {
  let names: BTreeSet<&str> = std::iter::once(&module.settings)
    .chain(module.conditionals.iter().map(|c| &c.settings))
    .flat_map(|s| s.dependencies.iter())
    .filter(|d| {
      manifest
        .module(&d.module)
        .is_some_and(|m| m.kind.builds_from_source())
    })
    .map(|d| d.module.as_str())
    .collect();
  names.into_iter().map(str::to_string).collect()
}

/// Number of configurations per project, for summaries.
pub fn configuration_counts(plan: &Plan) -> BTreeMap<&str, usize> {
  plan
    .projects
    .iter()
    .map(|p| (p.name.as_str(), p.configurations.len()))
    .collect()
}
