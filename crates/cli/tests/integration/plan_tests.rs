//! `bgraph plan` integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn plan_prints_summary_without_writing() {
  let env = TestEnv::engine();

  env
    .bgraph_cmd()
    .arg("plan")
    .assert()
    .success()
    .stdout(predicate::str::contains("Solution: ion"))
    .stdout(predicate::str::contains("Projects: 3"))
    .stdout(predicate::str::contains("core (library, 6 configurations)"));

  assert!(!env.build_path().exists());
}

#[test]
fn plan_json_matches_generated_projects() {
  let env = TestEnv::engine();

  let output = env.bgraph_cmd().args(["plan", "--output", "json"]).output().unwrap();
  assert!(output.status.success());
  let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

  env.bgraph_cmd().arg("generate").assert().success();
  let core = env.read_json("projects/core/core.project.json");

  let planned = plan["projects"]
    .as_array()
    .unwrap()
    .iter()
    .find(|p| p["name"] == "core")
    .unwrap();
  assert_eq!(planned, &core);
}

#[test]
fn plan_with_explicit_config_and_root() {
  let env = TestEnv::empty();
  env.write_file(
    "scripts/game.lua",
    r#"
      return {
        solution = "game",
        setup = function()
          bg.module({ name = "tool", kind = "executable", root = "..", sources = { "tool.cpp" }, targets = bg.targets.tools })
        end,
      }
    "#,
  );

  env
    .bgraph_cmd()
    .env_remove("BGRAPH_ROOT")
    .arg("plan")
    .arg("--root")
    .arg(env.root_path())
    .arg("--config")
    .arg("scripts/game.lua")
    .assert()
    .success()
    .stdout(predicate::str::contains("Solution: game"))
    .stdout(predicate::str::contains("tool (executable, 2 configurations)"));
}

#[test]
fn plan_reports_unknown_platform() {
  let env = TestEnv::empty();
  env.write_file(
    "build.lua",
    r#"
      return {
        setup = function()
          bg.module({
            name = "core",
            root = ".",
            sources = {},
            conditions = { { when = { platform = "amiga" }, defines = { "AMIGA" } } },
          })
        end,
      }
    "#,
  );

  env
    .bgraph_cmd()
    .arg("plan")
    .assert()
    .failure()
    .stderr(predicate::str::contains("amiga"));
}
