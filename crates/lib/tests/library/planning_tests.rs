//! End-to-end planning tests: build scripts in, project plans out.

use buildgraph_lib::error::ConfigError;
use buildgraph_lib::plan::PlanError;
use buildgraph_lib::platform::{Optimization, Platform};

use super::common::{TestProject, configuration};

const DIAMOND: &str = r#"
  return {
    solution = "diamond",
    setup = function()
      local core = bg.module({ name = "core", root = "core", sources = { "Core.cpp" }, exported_defines = { "HAS_CORE" } })
      local a = bg.module({ name = "a", root = "a", sources = { "A.cpp" }, dependencies = { core } })
      local b = bg.module({ name = "b", root = "b", sources = { "B.cpp" }, dependencies = { core } })
      bg.module({ name = "app", kind = "executable", root = "app", sources = { "main.cpp" }, dependencies = { a, b } })
    end,
  }
"#;

mod propagation {
  use super::*;

  #[test]
  fn diamond_settings_are_deduplicated() {
    let plan = TestProject::new(DIAMOND).plan();
    let app = configuration(&plan, "app", Platform::Win64, Optimization::Release);

    let core_includes = app.include_paths.iter().filter(|p| *p == "core").count();
    assert_eq!(core_includes, 1);
    let core_defines = app.defines.iter().filter(|d| *d == "HAS_CORE").count();
    assert_eq!(core_defines, 1);

    assert_eq!(app.link_order.iter().filter(|m| *m == "core").count(), 1);
    let position = |name: &str| app.link_order.iter().position(|m| m == name).unwrap();
    assert!(position("a") < position("core"));
    assert!(position("b") < position("core"));
  }

  #[test]
  fn private_dependencies_stay_private() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            local hidden = bg.module({ name = "hidden", root = "hidden", sources = {}, exported_defines = { "HAS_HIDDEN" } })
            local mid = bg.module({
              name = "mid",
              root = "mid",
              sources = {},
              dependencies = { { module = hidden, visibility = "private" } },
            })
            bg.module({ name = "app", kind = "executable", root = "app", sources = {}, dependencies = { mid } })
          end,
        }
      "#,
    );

    let plan = project.plan();
    let mid = configuration(&plan, "mid", Platform::Win32, Optimization::Debug);
    let app = configuration(&plan, "app", Platform::Win32, Optimization::Debug);

    assert!(mid.defines.contains(&"HAS_HIDDEN".to_string()));
    assert!(mid.include_paths.contains(&"hidden".to_string()));
    assert!(!app.defines.contains(&"HAS_HIDDEN".to_string()));
    assert!(!app.include_paths.contains(&"hidden".to_string()));
    assert!(app.link_order.contains(&"hidden".to_string()));
  }

  #[test]
  fn headers_only_dependencies_are_not_linked() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            local sdk = bg.module({
              name = "sdk",
              kind = "dependency_binary",
              root = "sdk",
              include_paths = { "include" },
              library_paths = { "lib" },
              library_files = { "sdk.lib" },
            })
            bg.module({
              name = "core",
              root = "core",
              sources = {},
              dependencies = { { module = sdk, linkage = "headers" } },
            })
          end,
        }
      "#,
    );

    let plan = project.plan();
    let core = configuration(&plan, "core", Platform::Win64, Optimization::Debug);

    assert!(core.include_paths.contains(&"sdk/include".to_string()));
    assert!(core.library_files.is_empty());
    assert!(core.library_paths.is_empty());
    assert!(core.link_order.is_empty());
  }

  #[test]
  fn solution_settings_reach_every_project() {
    let project = TestProject::new(
      r#"
        return {
          settings = { define_prefix = "GAME", include_dirs = { "engine" } },
          setup = function()
            bg.module({ name = "core", root = "core", sources = {} })
          end,
        }
      "#,
    );

    let plan = project.plan();
    let core = configuration(&plan, "core", Platform::Win32, Optimization::Retail);

    assert!(core.defines.contains(&"GAME_ENGINE".to_string()));
    assert!(core.defines.contains(&"GAME_LIB".to_string()));
    assert!(core.include_paths.contains(&"engine".to_string()));
  }
}

mod runtime_files {
  use super::*;

  const AUDIO: &str = r#"
    return {
      settings = { options = { "exceptions", "rtti", "unicode" } },
      setup = function()
        local xaudio2 = bg.module({
          name = "xaudio2",
          kind = "dependency_binary",
          root = "dependencies/xaudio2",
          include_paths = { "include" },
          conditions = {
            { when = { platform = "win32" }, copy_files = { "release/bin/x86/xaudio2_9redist.dll" } },
            { when = { platform = "win64" }, copy_files = { "release/bin/x64/xaudio2_9redist.dll" } },
          },
        })
        local audio = bg.module({
          name = "audio",
          root = "ion/audio",
          sources = {},
          dependencies = { xaudio2 },
          conditions = { { when = { platform = { "win32", "win64" } }, options = { "disable_warning:4100" } } },
        })
        bg.module({
          name = "buildresource",
          kind = "executable",
          root = "ion/tools",
          sources = {},
          targets = bg.targets.tools,
          target_path = "buildresource",
          dependencies = { audio },
        })
      end,
    }
  "#;

  #[test]
  fn redist_files_reach_every_linking_module() {
    let plan = TestProject::new(AUDIO).plan();

    let tool = configuration(&plan, "buildresource", Platform::Win64, Optimization::Release);
    assert_eq!(
      tool.copy_files,
      vec!["dependencies/xaudio2/release/bin/x64/xaudio2_9redist.dll"]
    );
    let audio = configuration(&plan, "audio", Platform::Win32, Optimization::Debug);
    assert_eq!(
      audio.copy_files,
      vec!["dependencies/xaudio2/release/bin/x86/xaudio2_9redist.dll"]
    );
  }

  #[test]
  fn options_and_target_path_are_per_module() {
    let plan = TestProject::new(AUDIO).plan();

    let audio = configuration(&plan, "audio", Platform::Win64, Optimization::Retail);
    assert_eq!(audio.options, vec!["exceptions", "rtti", "unicode", "disable_warning:4100"]);
    assert_eq!(audio.target_path, None);

    let tool = configuration(&plan, "buildresource", Platform::Win64, Optimization::Debug);
    assert_eq!(tool.options, vec!["exceptions", "rtti", "unicode"]);
    assert_eq!(tool.target_path.as_deref(), Some("ion/tools/buildresource"));
  }
}

mod graph_errors {
  use super::*;

  #[test]
  fn cycle_is_reported_not_followed() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            bg.module({ name = "a", root = ".", sources = {}, dependencies = { "b" } })
            bg.module({ name = "b", root = ".", sources = {}, dependencies = { "a" } })
          end,
        }
      "#,
    );

    let err = project.try_plan().unwrap_err();
    match err {
      PlanError::Config(ConfigError::Cycle { modules, .. }) => assert_eq!(modules, vec!["a", "b"]),
      other => panic!("expected a cycle, got {}", other),
    }
  }

  #[test]
  fn dependency_without_the_target_fails() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            bg.module({
              name = "core",
              root = ".",
              sources = {},
              targets = { platforms = { "win32" }, toolchains = { "vs2019" }, optimizations = { "debug" } },
            })
            bg.module({
              name = "tool",
              kind = "executable",
              root = ".",
              sources = {},
              targets = bg.targets.tools,
              dependencies = { "core" },
            })
          end,
        }
      "#,
    );

    let err = project.try_plan().unwrap_err();
    assert!(
      matches!(
        err,
        PlanError::Config(ConfigError::MissingTarget { ref module, ref dependency, .. })
          if module == "tool" && dependency == "core"
      ),
      "unexpected error: {}",
      err
    );
  }

  #[test]
  fn unknown_dependency_fails() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            bg.module({ name = "app", kind = "executable", root = ".", sources = {}, dependencies = { "ghost" } })
          end,
        }
      "#,
    );

    let err = project.try_plan().unwrap_err();
    assert!(matches!(
      err,
      PlanError::Config(ConfigError::UnknownModule { ref dependency, .. }) if dependency == "ghost"
    ));
  }
}

mod build_steps {
  use super::*;

  #[test]
  fn shader_pairs_and_textures_become_steps() {
    let project = TestProject::new(
      r#"
        return {
          settings = { resource_builder = "tools/rb.exe" },
          setup = function()
            bg.module({
              name = "assets",
              root = "assets",
              sources = {},
              transforms = { "shader_pair", { kind = "texture", extension = ".tga" } },
            })
          end,
        }
      "#,
    );
    project
      .write_file("assets/foo_v.glsl", "")
      .write_file("assets/foo_p.glsl", "")
      .write_file("assets/bar_v.glsl", "")
      .write_file("assets/sky.tga", "");

    let plan = project.plan();
    let debug = configuration(&plan, "assets", Platform::Win64, Optimization::Debug);

    let outputs: Vec<&str> = debug.build_steps.iter().map(|s| s.output.as_str()).collect();
    assert_eq!(outputs, vec!["assets/foo.ion.shader", "assets/sky.ion.texture"]);
    assert_eq!(debug.unmatched_assets, vec!["assets/bar_v.glsl"]);
    assert_eq!(debug.build_steps[0].command[0], "tools/rb.exe");
    assert_eq!(debug.artifacts, outputs);
  }

  #[test]
  fn plans_are_deterministic() {
    let project = TestProject::new(DIAMOND);
    let first = serde_json::to_string(&project.plan()).unwrap();
    let second = serde_json::to_string(&project.plan()).unwrap();
    assert_eq!(first, second);
  }
}
