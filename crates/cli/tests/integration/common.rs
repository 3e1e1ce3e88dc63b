//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated project directory.
///
/// Each test gets its own temporary root holding `build.lua` and whatever
/// sources the test writes next to it.
pub struct TestEnv {
  pub temp: TempDir,
  pub config_path: PathBuf,
}

impl TestEnv {
  /// Create from a fixture file copied to `build.lua`.
  pub fn from_fixture(name: &str) -> Self {
    let env = Self::empty();
    std::fs::write(&env.config_path, fixture_content(name)).unwrap();
    env
  }

  /// Create an empty project root.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("build.lua");
    Self { temp, config_path }
  }

  /// The `engine.lua` fixture with its sources and assets in place.
  pub fn engine() -> Self {
    let env = Self::from_fixture("engine.lua");
    env.write_file("dependencies/sdl2/include/SDL.h", "");
    env.write_file("ion/core/Core.cpp", "");
    env.write_file("ion/core/Core.h", "");
    env.write_file("ion/core/Core_linux.cpp", "");
    env.write_file("ion/core/win32/Window.cpp", "");
    env.write_file("ion/shaders/basic_v.glsl", "");
    env.write_file("ion/shaders/basic_p.glsl", "");
    env.write_file("ion/shaders/lonely_v.glsl", "");
    env.write_file("ion/shaders/logo.png", "");
    env.write_file("app/main.cpp", "");
    env
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Canonical project root.
  pub fn root_path(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  /// Default build directory.
  pub fn build_path(&self) -> PathBuf {
    self.root_path().join(".build")
  }

  /// Read a generated file as JSON.
  pub fn read_json(&self, relative_path: &str) -> serde_json::Value {
    let content = std::fs::read_to_string(self.build_path().join(relative_path))
      .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative_path, e));
    serde_json::from_str(&content).unwrap()
  }

  /// Get a pre-configured Command for the bgraph binary.
  ///
  /// Sets `BGRAPH_ROOT` to the project root and clears `BGRAPH_BUILD_DIR`.
  pub fn bgraph_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("bgraph");
    cmd.env("BGRAPH_ROOT", self.root_path());
    cmd.env_remove("BGRAPH_BUILD_DIR");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
