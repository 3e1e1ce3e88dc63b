//! Build script evaluation.
//!
//! This module provides the `evaluate_config` function which takes the entry
//! build script and returns the resulting [`Manifest`]: the solution settings
//! and every module defined while the scripts ran.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use mlua::prelude::*;
use tracing::{debug, info};

use crate::config::GenerateConfig;
use crate::error::ConfigError;
use crate::lua::helpers::path::normalize;
use crate::lua::{loaders, runtime};
use crate::manifest::{Manifest, SolutionSettings};

/// Errors that can occur during evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
  /// A module or setting is invalid.
  #[error(transparent)]
  Config(ConfigError),

  /// Lua evaluation error.
  #[error("lua error: {0}")]
  Lua(LuaError),

  #[error("build script {0} does not exist")]
  MissingScript(String),
}

impl From<LuaError> for EvalError {
  fn from(err: LuaError) -> Self {
    match ConfigError::from_lua(&err) {
      Some(config) => Self::Config(config.clone()),
      None => Self::Lua(err),
    }
  }
}

/// Evaluate the entry build script and return the resulting manifest.
///
/// This function:
/// 1. Creates a Lua runtime with the `bg` global rooted at `config.root_dir`
/// 2. Loads and executes the entry script
/// 3. Reads `solution` and `settings` from the returned table
/// 4. Calls the returned `setup()` function, which defines the modules
/// 5. Returns the manifest containing every defined module
///
/// # Example
/// ```ignore
/// use buildgraph_lib::config::GenerateConfig;
/// use buildgraph_lib::eval::evaluate_config;
///
/// let config = GenerateConfig::resolve(None, None)?;
/// let manifest = evaluate_config(&config.entry_script(None), &config)?;
/// println!("modules: {}", manifest.modules.len());
/// ```
pub fn evaluate_config(path: &Path, config: &GenerateConfig) -> Result<Manifest, EvalError> {
  if !path.is_file() {
    return Err(EvalError::MissingScript(path.display().to_string()));
  }

  let manifest = Rc::new(RefCell::new(Manifest::default()));

  // lua holds clones of the manifest handle until it is dropped at the end
  // of this block
  let settings = {
    let lua = runtime::create_runtime(manifest.clone(), &config.root_dir)?;
    let result = runtime::load_entry(&lua, path)?;

    let LuaValue::Table(script) = result else {
      return Err(LuaError::external("build script must return a table with a 'setup' function").into());
    };

    let settings = parse_solution_settings(&script, &config.root_dir)?;

    let setup: LuaFunction = script
      .get("setup")
      .map_err(|_| LuaError::external("build script must return a table with a 'setup' function"))?;

    let entry_dir = dunce::canonicalize(path)
      .ok()
      .and_then(|p| p.parent().map(Path::to_path_buf))
      .unwrap_or_else(|| config.root_dir.clone());
    loaders::with_current_dir(&lua, &entry_dir, || setup.call::<()>(()))?;

    settings
  };

  let mut manifest = manifest.take();
  manifest.settings = settings;

  info!(
    solution = %manifest.settings.solution,
    modules = manifest.modules.len(),
    "evaluated build scripts"
  );
  Ok(manifest)
}

/// Make a script-supplied path relative to the root, `/`-separated.
fn root_relative(root: &Path, path: &str) -> String {
  let path = Path::new(path);
  let relative = path.strip_prefix(root).unwrap_or(path);
  normalize(&relative.to_string_lossy())
}

/// The solution name becomes a file name under the build directory.
fn is_file_name(name: &str) -> bool {
  !name.trim().is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Read `solution` and `settings` from the table the entry script returned.
fn parse_solution_settings(script: &LuaTable, root: &Path) -> LuaResult<SolutionSettings> {
  let mut settings = SolutionSettings::default();

  if let Some(solution) = script.get::<Option<String>>("solution")? {
    settings.solution = solution;
  } else if let Some(name) = root.file_name() {
    settings.solution = name.to_string_lossy().into_owned();
  }
  if !is_file_name(&settings.solution) {
    return Err(LuaError::external(ConfigError::Invalid {
      module: "solution".to_string(),
      message: format!(
        "solution name '{}' must be a non-empty file name without separators",
        settings.solution
      ),
    }));
  }

  match script.get::<LuaValue>("settings")? {
    LuaValue::Nil => {}
    LuaValue::Table(table) => {
      if let Some(prefix) = table.get::<Option<String>>("define_prefix")? {
        settings.define_prefix = prefix;
      }
      if let Some(dirs) = table.get::<Option<Vec<String>>>("include_dirs")? {
        settings.include_dirs = dirs.iter().map(|d| root_relative(root, d)).collect();
      }
      if let Some(options) = table.get::<Option<Vec<String>>>("options")? {
        settings.options = options;
      }
      if let Some(builder) = table.get::<Option<String>>("resource_builder")? {
        settings.resource_builder = root_relative(root, &builder);
      }
    }
    other => {
      return Err(LuaError::external(format!(
        "'settings' must be a table, got {}",
        other.type_name()
      )));
    }
  }

  debug!(
    solution = %settings.solution,
    define_prefix = %settings.define_prefix,
    "solution settings"
  );
  Ok(settings)
}
