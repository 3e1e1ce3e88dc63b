//! Implementation of the `bgraph plan` command.
//!
//! Evaluates the build scripts and prints the resulting plan without writing
//! anything to the build directory.

use std::path::Path;

use anyhow::{Context, Result};

use buildgraph_lib::config::GenerateConfig;
use buildgraph_lib::eval::evaluate_config;
use buildgraph_lib::plan::{Plan, configuration_counts, generate};

use crate::output::{OutputFormat, print_json, print_stat, print_success, print_warning, symbols, truncate_hash};

/// Evaluate the entry script and build the plan.
pub fn load_plan(config: Option<&Path>, settings: &GenerateConfig) -> Result<Plan> {
  let script = settings.entry_script(config);
  let manifest = evaluate_config(&script, settings)
    .with_context(|| format!("Failed to evaluate build script: {}", script.display()))?;
  let plan = generate(&manifest).context("Failed to generate plan")?;
  Ok(plan)
}

/// Report assets a transform accepted but could not bind.
pub fn warn_unmatched(plan: &Plan) {
  for project in &plan.projects {
    let mut unmatched: Vec<&str> = project
      .configurations
      .iter()
      .flat_map(|c| c.unmatched_assets.iter().map(String::as_str))
      .collect();
    unmatched.sort_unstable();
    unmatched.dedup();
    for asset in unmatched {
      print_warning(&format!("{}: no build step for {}", project.name, asset));
    }
  }
}

pub fn cmd_plan(config: Option<&Path>, root: Option<&Path>, output: OutputFormat, verbose: bool) -> Result<()> {
  let settings = GenerateConfig::resolve(root, None).context("Failed to resolve root directory")?;
  let plan = load_plan(config, &settings)?;

  if output.is_json() {
    return print_json(&plan);
  }

  warn_unmatched(&plan);

  print_success(&format!("Solution: {}", plan.solution));
  print_stat("Fingerprint", truncate_hash(&plan.fingerprint));
  print_stat("Projects", &plan.projects.len().to_string());
  print_stat("Configurations", &plan.configuration_count().to_string());
  println!();

  let counts = configuration_counts(&plan);
  for project in &plan.projects {
    let count = counts.get(project.name.as_str()).copied().unwrap_or_default();
    println!(
      "  {} {} ({}, {} configurations)",
      symbols::INFO,
      project.name,
      project.kind.as_str(),
      count
    );

    if verbose {
      if !project.dependencies.is_empty() {
        println!("      {} {}", symbols::ARROW, project.dependencies.join(", "));
      }
      for configuration in &project.configurations {
        println!(
          "      {} {}: {} files, {} steps",
          configuration.name,
          configuration.target.key(),
          configuration.compiled.len(),
          configuration.build_steps.len()
        );
      }
    }
  }

  Ok(())
}
