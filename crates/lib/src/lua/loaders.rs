//! Script loading with per-file `__dir` injection.
//!
//! Build scripts are split across directories (`ion/core/build.lua`,
//! `dependencies/zlib/build.lua`, ...). Each loaded file gets a `__dir`
//! variable holding its own directory, and the directory of the file being
//! evaluated is tracked in the registry so `bg.module{}` can resolve relative
//! roots and `bg.include` / `dofile` can resolve relative paths.
//!
//! `require` keeps its usual behaviour; only `package.searchers[2]` (the Lua
//! file searcher) is replaced so required files get `__dir` as well.

use std::fs;
use std::path::{Path, PathBuf};

use mlua::prelude::*;
use tracing::trace;

/// Registry key for the directory of the script currently being evaluated.
const CURRENT_DIR_KEY: &str = "__bgraph_current_dir";

/// The directory of the script currently being evaluated, if any.
pub fn current_dir(lua: &Lua) -> LuaResult<Option<String>> {
  lua.named_registry_value(CURRENT_DIR_KEY)
}

/// Run `f` with `dir` as the current script directory, restoring the previous
/// one afterwards.
pub fn with_current_dir<R>(lua: &Lua, dir: &Path, f: impl FnOnce() -> LuaResult<R>) -> LuaResult<R> {
  let prev_dir = current_dir(lua)?;
  lua.set_named_registry_value(CURRENT_DIR_KEY, dir.to_string_lossy().into_owned())?;
  let result = f();
  let _ = lua.set_named_registry_value(CURRENT_DIR_KEY, prev_dir);
  result
}

/// Load and evaluate a Lua file with `__dir` set to its directory.
///
/// The file's environment inherits from `_G`, so globals assigned in the file
/// stay visible to later files.
pub fn load_file_with_dir(lua: &Lua, path: &Path) -> LuaResult<LuaValue> {
  let canonical_path = dunce::canonicalize(path)
    .map_err(|e| LuaError::external(format!("cannot resolve '{}': {}", path.display(), e)))?;

  let content = fs::read_to_string(&canonical_path)
    .map_err(|e| LuaError::external(format!("cannot read '{}': {}", canonical_path.display(), e)))?;

  let dir = canonical_path.parent().unwrap_or(Path::new(".")).to_path_buf();

  let env = lua.create_table()?;
  env.set("__dir", dir.to_string_lossy().into_owned())?;

  let mt = lua.create_table()?;
  mt.set("__index", lua.globals())?;
  mt.set("__newindex", lua.globals())?;
  env.set_metatable(Some(mt))?;

  trace!(path = %canonical_path.display(), "loading script");

  with_current_dir(lua, &dir, || {
    lua
      .load(&content)
      .set_name(format!("@{}", canonical_path.display()))
      .set_environment(env)
      .eval::<LuaValue>()
  })
}

/// Resolve a possibly relative path against the current script directory.
///
/// Falls back to the path as given (relative to the working directory) when
/// no script is being evaluated.
pub fn resolve_path(lua: &Lua, path_str: &str) -> LuaResult<PathBuf> {
  let path = Path::new(path_str);

  if path.is_absolute() {
    return Ok(path.to_path_buf());
  }

  match current_dir(lua)? {
    Some(current_dir) => Ok(Path::new(&current_dir).join(path)),
    None => Ok(path.to_path_buf()),
  }
}

/// A replacement for `package.searchers[2]` that loads files through
/// [`load_file_with_dir`].
fn create_lua_searcher(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|lua, modname: String| {
    let package: LuaTable = lua.globals().get("package")?;
    let path: String = package.get("path")?;

    let searchpath: LuaFunction = package.get("searchpath")?;
    let result: LuaMultiValue = searchpath.call((modname.clone(), path))?;

    // searchpath returns (filepath) on success or (nil, errmsg) on failure
    match result.into_iter().next() {
      Some(LuaValue::String(filepath_lua)) => {
        let filepath = filepath_lua.to_str()?.to_string();
        let path_clone = filepath.clone();

        let loader = lua.create_function(move |lua, _: LuaMultiValue| load_file_with_dir(lua, Path::new(&path_clone)))?;

        Ok((LuaValue::Function(loader), filepath))
      }
      _ => Ok((LuaValue::Nil, format!("\n\tno file for module '{}'", modname))),
    }
  })
}

fn create_dofile(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|lua, path: Option<String>| match path {
    Some(path_str) => {
      let resolved = resolve_path(lua, &path_str)?;
      load_file_with_dir(lua, &resolved)
    }
    None => Err(LuaError::external("dofile() without path not supported")),
  })
}

/// Create the `bg.include(path)` function.
///
/// Like `dofile`, but a missing file is reported with the including
/// script's directory.
pub fn create_include(lua: &Lua) -> LuaResult<LuaFunction> {
  lua.create_function(|lua, path: String| {
    let resolved = resolve_path(lua, &path)?;
    if !resolved.is_file() {
      return Err(LuaError::external(format!(
        "bg.include: no such script '{}'",
        resolved.display()
      )));
    }
    load_file_with_dir(lua, &resolved)
  })
}

/// Install the custom `require` searcher and `dofile`.
pub fn install_loaders(lua: &Lua) -> LuaResult<()> {
  let package: LuaTable = lua.globals().get("package")?;
  let searchers: LuaTable = package.get("searchers")?;
  searchers.set(2, create_lua_searcher(lua)?)?;

  lua.globals().set("dofile", create_dofile(lua)?)?;

  Ok(())
}
