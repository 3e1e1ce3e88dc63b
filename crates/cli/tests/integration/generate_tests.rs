//! `bgraph generate` integration tests.

use std::fs;

use predicates::prelude::*;
use serde_json::Value;

use super::common::TestEnv;

fn configuration<'a>(project: &'a Value, name: &str, platform: &str) -> &'a Value {
  project["configurations"]
    .as_array()
    .unwrap()
    .iter()
    .find(|c| c["name"] == name && c["target"]["platform"] == platform)
    .unwrap_or_else(|| panic!("no configuration {} for {}", name, platform))
}

fn strings(value: &Value) -> Vec<&str> {
  value.as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect()
}

#[test]
fn generate_writes_solution_and_projects() {
  let env = TestEnv::engine();

  env
    .bgraph_cmd()
    .arg("generate")
    .assert()
    .success()
    .stdout(predicate::str::contains("Generated ion"));

  let build = env.build_path();
  assert!(build.join("ion.solution.json").is_file());
  assert!(build.join("projects/core/core.project.json").is_file());
  assert!(build.join("projects/app/app.project.json").is_file());
  assert!(build.join("projects/shaders/shaders.project.json").is_file());
  assert!(!build.join("projects/sdl2").exists());

  let solution = env.read_json("ion.solution.json");
  let names: Vec<&str> = solution["projects"]
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, vec!["app", "core", "shaders"]);
}

#[test]
fn regeneration_is_byte_identical() {
  let env = TestEnv::engine();

  env.bgraph_cmd().arg("generate").assert().success();
  let files = ["ion.solution.json", "projects/core/core.project.json", "projects/app/app.project.json"];
  let first: Vec<Vec<u8>> = files
    .iter()
    .map(|f| fs::read(env.build_path().join(f)).unwrap())
    .collect();

  env
    .bgraph_cmd()
    .arg("generate")
    .assert()
    .success()
    .stdout(predicate::str::contains("ion is up to date"))
    .stdout(predicate::str::contains("Unchanged: 4"));

  let second: Vec<Vec<u8>> = files
    .iter()
    .map(|f| fs::read(env.build_path().join(f)).unwrap())
    .collect();
  assert_eq!(first, second);
}

#[test]
fn platform_specific_sources_are_not_compiled() {
  let env = TestEnv::engine();
  env.bgraph_cmd().arg("generate").assert().success();

  let core = env.read_json("projects/core/core.project.json");
  let debug = configuration(&core, "Debug_Lib", "win64");

  assert!(strings(&debug["files"]).contains(&"ion/core/Core_linux.cpp"));
  assert!(!strings(&debug["compiled"]).contains(&"ion/core/Core_linux.cpp"));
  assert!(strings(&debug["compiled"]).contains(&"ion/core/Core.cpp"));
}

#[test]
fn executable_inherits_public_dependency_settings() {
  let env = TestEnv::engine();
  env.bgraph_cmd().arg("generate").assert().success();

  let app = env.read_json("projects/app/app.project.json");
  let release = configuration(&app, "Release", "win32");

  assert_eq!(strings(&release["library_files"]), vec!["SDL2.lib"]);
  assert!(strings(&release["defines"]).contains(&"SDL_MAIN_HANDLED"));
  let link_order = strings(&release["link_order"]);
  assert!(link_order.contains(&"core"));
  assert!(link_order.contains(&"sdl2"));
}

#[test]
fn shader_halves_pair_into_one_step() {
  let env = TestEnv::engine();

  env
    .bgraph_cmd()
    .arg("generate")
    .assert()
    .success()
    .stderr(predicate::str::contains("no build step for ion/shaders/lonely_v.glsl"));

  let shaders = env.read_json("projects/shaders/shaders.project.json");
  let debug = configuration(&shaders, "Debug_Lib", "win64");

  let outputs: Vec<&str> = debug["build_steps"]
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["output"].as_str().unwrap())
    .collect();
  assert_eq!(outputs, vec!["ion/shaders/basic.ion.shader", "ion/shaders/logo.ion.texture"]);
  assert_eq!(strings(&debug["unmatched_assets"]), vec!["ion/shaders/lonely_v.glsl"]);
}

#[test]
fn build_dir_flag_overrides_default() {
  let env = TestEnv::engine();

  env
    .bgraph_cmd()
    .arg("generate")
    .arg("--build-dir")
    .arg("out")
    .assert()
    .success();

  assert!(env.root_path().join("out/ion.solution.json").is_file());
  assert!(!env.build_path().exists());
}

#[test]
fn dependency_cycle_fails() {
  let env = TestEnv::from_fixture("cycle.lua");

  env
    .bgraph_cmd()
    .arg("generate")
    .assert()
    .failure()
    .stderr(predicate::str::contains("dependency cycle"))
    .stderr(predicate::str::contains("a, b"));

  assert!(!env.build_path().exists());
}
