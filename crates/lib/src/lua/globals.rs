//! The `bg` global table.
//!
//! This module registers the `bg` global which provides:
//! - `bg.root` - The project root directory
//! - `bg.dir` - Directory of the entry script
//! - `bg.path` - Path manipulation utilities
//! - `bg.targets` - Built-in target matrices (`default`, `tools`)
//! - `bg.platforms`, `bg.toolchains`, `bg.optimizations` - Valid axis values
//! - `bg.module{}` - Define a module
//! - `bg.include(path)` - Evaluate another build script

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use mlua::prelude::*;

use super::{helpers, loaders};
use crate::manifest::Manifest;
use crate::matrix::TargetSpec;
use crate::module::lua::{register_bg_module, targets_to_lua};
use crate::platform::{Optimization, Platform, Toolchain};

/// Register the `bg` global table in the Lua runtime.
///
/// `root` must already be canonical; module roots are made relative to it.
pub fn register_globals(lua: &Lua, manifest: Rc<RefCell<Manifest>>, root: &Path) -> LuaResult<()> {
  let bg = lua.create_table()?;

  bg.set("root", root.to_string_lossy().into_owned())?;
  bg.set("dir", root.to_string_lossy().into_owned())?;

  bg.set("path", helpers::path::create_path_helpers(lua)?)?;

  let targets = lua.create_table()?;
  targets.set("default", targets_to_lua(lua, &TargetSpec::engine_default())?)?;
  targets.set("tools", targets_to_lua(lua, &TargetSpec::tools())?)?;
  bg.set("targets", targets)?;

  bg.set(
    "platforms",
    lua.create_sequence_from(Platform::ALL.iter().map(|p| p.as_str()))?,
  )?;
  bg.set(
    "toolchains",
    lua.create_sequence_from(Toolchain::ALL.iter().map(|t| t.as_str()))?,
  )?;
  bg.set(
    "optimizations",
    lua.create_sequence_from(Optimization::ALL.iter().map(|o| o.as_str()))?,
  )?;

  register_bg_module(lua, &bg, manifest, root.to_path_buf())?;
  bg.set("include", loaders::create_include(lua)?)?;

  lua.globals().set("bg", bg)?;

  Ok(())
}
