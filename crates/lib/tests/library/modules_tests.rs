//! Tests for `bg.module{}` as seen from build scripts.

use buildgraph_lib::error::ConfigError;
use buildgraph_lib::eval::EvalError;
use buildgraph_lib::module::{Linkage, ModuleKind, Visibility};
use buildgraph_lib::platform::{Optimization, Platform};

use super::common::{TestProject, configuration};

mod references {
  use super::*;
  use crate::common::create_test_runtime;
  use mlua::prelude::*;

  #[test]
  fn module_returns_typed_reference() -> LuaResult<()> {
    let (lua, manifest, _temp) = create_test_runtime()?;

    let (name, kind, marker): (String, String, String) = lua
      .load(
        r#"
          local core = bg.module({ name = "core", root = ".", sources = { "Core.cpp" } })
          return core.name, core.kind, getmetatable(core).__type
        "#,
      )
      .eval()?;

    assert_eq!(name, "core");
    assert_eq!(kind, "library");
    assert_eq!(marker, "ModuleRef");
    assert!(manifest.borrow().modules.contains_key("core"));
    Ok(())
  }

  #[test]
  fn dependencies_accept_refs_names_and_tables() -> LuaResult<()> {
    let (lua, manifest, _temp) = create_test_runtime()?;

    lua
      .load(
        r#"
          local core = bg.module({ name = "core", root = ".", sources = {} })
          bg.module({ name = "sdk", kind = "dependency_binary", root = "." })
          bg.module({
            name = "app",
            kind = "executable",
            root = ".",
            sources = {},
            dependencies = {
              core,
              "sdk",
              { module = core, visibility = "private", linkage = "headers" },
            },
          })
        "#,
      )
      .exec()?;

    let manifest = manifest.borrow();
    let deps = &manifest.modules["app"].settings.dependencies;
    assert_eq!(deps.len(), 3);
    assert_eq!(deps[0].module, "core");
    assert_eq!(deps[0].visibility, Visibility::Public);
    assert_eq!(deps[1].module, "sdk");
    assert_eq!(deps[2].visibility, Visibility::Private);
    assert_eq!(deps[2].linkage, Linkage::Headers);
    assert_eq!(manifest.modules["sdk"].kind, ModuleKind::DependencyBinary);
    Ok(())
  }

  #[test]
  fn unknown_visibility_is_rejected() -> LuaResult<()> {
    let (lua, _manifest, _temp) = create_test_runtime()?;

    let err = lua
      .load(
        r#"
          bg.module({
            name = "app",
            root = ".",
            sources = {},
            dependencies = { { module = "core", visibility = "protected" } },
          })
        "#,
      )
      .exec()
      .unwrap_err();

    assert!(err.to_string().contains("unknown visibility 'protected'"));
    Ok(())
  }
}

mod discovery {
  use super::*;

  #[test]
  fn sources_are_discovered_under_the_root() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            bg.module({ name = "core", root = "ion/core" })
          end,
        }
      "#,
    );
    project
      .write_file("ion/core/Core.cpp", "")
      .write_file("ion/core/Core.h", "")
      .write_file("ion/core/detail/Hash.inl", "")
      .write_file("ion/core/README.md", "")
      .write_file("ion/core/.cache/stale.cpp", "");

    let manifest = project.evaluate().unwrap();
    assert_eq!(
      manifest.modules["core"].sources,
      vec!["Core.cpp", "Core.h", "detail/Hash.inl"]
    );
  }

  #[test]
  fn extensions_restrict_discovery() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            bg.module({ name = "zlib", kind = "dependency_source", root = "zlib", extensions = { ".c" } })
          end,
        }
      "#,
    );
    project.write_file("zlib/inflate.c", "").write_file("zlib/zlib.h", "");

    let manifest = project.evaluate().unwrap();
    assert_eq!(manifest.modules["zlib"].sources, vec!["inflate.c"]);
  }

  #[test]
  fn missing_root_fails_discovery() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            bg.module({ name = "core", root = "ion/missing" })
          end,
        }
      "#,
    );

    assert!(project.evaluate().is_err());
  }
}

mod rules {
  use super::*;

  #[test]
  fn conditional_exclusion_applies_only_where_it_matches() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            bg.module({
              name = "renderer",
              root = "ion/renderer",
              sources = { "Renderer.cpp", "gl/Device.cpp", "d3d/Device.cpp" },
              exclude = {
                { folder = "gl", when = { platform = "win32" } },
                { folder = "d3d", when = { ["not"] = { platform = { "win32", "win64" } } } },
              },
            })
          end,
        }
      "#,
    );

    let plan = project.plan();
    let win32 = configuration(&plan, "renderer", Platform::Win32, Optimization::Debug);
    let win64 = configuration(&plan, "renderer", Platform::Win64, Optimization::Debug);

    assert_eq!(
      win32.compiled,
      vec!["ion/renderer/Renderer.cpp", "ion/renderer/d3d/Device.cpp"]
    );
    assert_eq!(
      win64.compiled,
      vec![
        "ion/renderer/Renderer.cpp",
        "ion/renderer/d3d/Device.cpp",
        "ion/renderer/gl/Device.cpp"
      ]
    );
  }

  #[test]
  fn exclusion_order_does_not_matter() {
    let script = |rules: &str| {
      format!(
        r#"
          return {{
            setup = function()
              bg.module({{
                name = "core",
                root = ".",
                sources = {{ "a.cpp", "a_tools.cpp", "editor/b.cpp", "c.cpp" }},
                exclude = {{ {} }},
              }})
            end,
          }}
        "#,
        rules
      )
    };

    let first = TestProject::new(&script(r#"{ suffix = "tools" }, { folder = "editor" }"#)).plan();
    let second = TestProject::new(&script(r#"{ folder = "editor" }, { suffix = "tools" }"#)).plan();

    let a = configuration(&first, "core", Platform::Win64, Optimization::Release);
    let b = configuration(&second, "core", Platform::Win64, Optimization::Release);
    assert_eq!(a.compiled, vec!["a.cpp", "c.cpp"]);
    assert_eq!(a.compiled, b.compiled);
  }

  #[test]
  fn malformed_pattern_is_a_config_error() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            bg.module({ name = "core", root = ".", sources = {}, exclude = { { folder = "a/b" } } })
          end,
        }
      "#,
    );

    let err = project.evaluate().unwrap_err();
    assert!(
      matches!(err, EvalError::Config(ConfigError::MalformedPattern { ref module, .. }) if module == "core"),
      "unexpected error: {}",
      err
    );
  }
}

mod conditions {
  use super::*;

  #[test]
  fn conditional_settings_follow_the_target() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            bg.module({
              name = "core",
              root = ".",
              sources = {},
              defines = { "CORE" },
              conditions = {
                { when = { optimization = "retail" }, defines = { "CORE_NO_ASSERTS" } },
                {
                  when = { all = { { platform = "win64" }, { optimization = { "debug", "release" } } } },
                  defines = { "CORE_PROFILE" },
                },
              },
            })
          end,
        }
      "#,
    );

    let plan = project.plan();
    let retail = configuration(&plan, "core", Platform::Win64, Optimization::Retail);
    let debug64 = configuration(&plan, "core", Platform::Win64, Optimization::Debug);
    let debug32 = configuration(&plan, "core", Platform::Win32, Optimization::Debug);

    assert!(retail.defines.contains(&"CORE_NO_ASSERTS".to_string()));
    assert!(!retail.defines.contains(&"CORE_PROFILE".to_string()));
    assert!(debug64.defines.contains(&"CORE_PROFILE".to_string()));
    assert!(!debug32.defines.contains(&"CORE_PROFILE".to_string()));
    assert!(debug32.defines.contains(&"CORE".to_string()));
  }

  #[test]
  fn unknown_toolchain_is_reported() {
    let project = TestProject::new(
      r#"
        return {
          setup = function()
            bg.module({
              name = "core",
              root = ".",
              sources = {},
              conditions = { { when = { toolchain = "vs2005" }, defines = { "OLD" } } },
            })
          end,
        }
      "#,
    );

    let err = project.evaluate().unwrap_err();
    assert!(err.to_string().contains("vs2005"), "unexpected error: {}", err);
  }
}
