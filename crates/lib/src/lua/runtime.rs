use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use mlua::prelude::*;

use crate::lua::{globals, loaders};
use crate::manifest::Manifest;

/// Create a Lua runtime with the `bg` global and the `__dir`-aware loaders.
///
/// `lua/?.lua` under the project root is added to `package.path` so shared
/// helper modules can be `require`d from any build script.
pub fn create_runtime(manifest: Rc<RefCell<Manifest>>, root: &Path) -> LuaResult<Lua> {
  let lua = Lua::new();

  let package = lua.globals().get::<LuaTable>("package")?;
  let package_path = package.get::<String>("path")?;
  let lua_dir = root.join("lua").to_string_lossy().replace('\\', "/");
  package.set("path", format!("{0}/?.lua;{0}/?/init.lua;{1}", lua_dir, package_path))?;

  globals::register_globals(&lua, manifest, root)?;
  loaders::install_loaders(&lua)?;

  Ok(lua)
}

/// Load the entry script and point `bg.dir` at its directory.
pub fn load_entry(lua: &Lua, path: &Path) -> LuaResult<LuaValue> {
  let canonical_path = dunce::canonicalize(path)
    .map_err(|e| LuaError::external(format!("cannot canonicalize '{}': {}", path.display(), e)))?;

  let bg = lua.globals().get::<LuaTable>("bg")?;
  bg.set(
    "dir",
    canonical_path
      .parent()
      .unwrap_or(Path::new(""))
      .to_string_lossy()
      .into_owned(),
  )?;

  loaders::load_file_with_dir(lua, &canonical_path)
}
