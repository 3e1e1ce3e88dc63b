//! The `bg.path` table.
//!
//! Paths handed to `bg.module{}` end up in generated files, so these helpers
//! always produce `/`-separated strings regardless of the host.

use std::path::{Component, Path};

use mlua::prelude::*;

fn slash(path: &str) -> String {
  path.replace('\\', "/")
}

/// Join segments with `/`. An absolute segment restarts the path.
pub fn join<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
  let mut result = String::new();
  for segment in segments {
    let segment = slash(segment);
    if segment.is_empty() {
      continue;
    }
    if Path::new(&segment).is_absolute() || segment.starts_with('/') || result.is_empty() {
      result = segment;
    } else {
      if !result.ends_with('/') {
        result.push('/');
      }
      result.push_str(segment.trim_start_matches("./"));
    }
  }
  result
}

/// Resolve `.` and `..` lexically.
pub fn normalize(path: &str) -> String {
  let path = slash(path);
  let mut parts: Vec<String> = Vec::new();
  let mut prefix = String::new();

  for component in Path::new(&path).components() {
    match component {
      Component::Prefix(p) => prefix.push_str(&slash(&p.as_os_str().to_string_lossy())),
      Component::RootDir => prefix.push('/'),
      Component::CurDir => {}
      Component::ParentDir => {
        if parts.last().is_some_and(|p| p != "..") {
          parts.pop();
        } else if prefix.is_empty() {
          parts.push("..".to_string());
        }
      }
      Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
    }
  }

  let joined = format!("{}{}", prefix, parts.join("/"));
  if joined.is_empty() { ".".to_string() } else { joined }
}

pub fn dirname(path: &str) -> String {
  let path = slash(path);
  match path.trim_end_matches('/').rsplit_once('/') {
    Some(("", _)) => "/".to_string(),
    Some((dir, _)) => dir.to_string(),
    None => String::new(),
  }
}

pub fn basename(path: &str) -> String {
  let path = slash(path);
  let trimmed = path.trim_end_matches('/');
  trimmed.rsplit_once('/').map(|(_, name)| name).unwrap_or(trimmed).to_string()
}

/// The extension including its dot, or an empty string.
pub fn extname(path: &str) -> String {
  let name = basename(path);
  match name.rfind('.') {
    Some(0) | None => String::new(),
    Some(idx) => name[idx..].to_string(),
  }
}

/// Create the `bg.path` table with path manipulation utilities.
pub fn create_path_helpers(lua: &Lua) -> LuaResult<LuaTable> {
  let path = lua.create_table()?;

  path.set(
    "join",
    lua.create_function(|_, segments: LuaVariadic<String>| Ok(join(segments.iter().map(String::as_str))))?,
  )?;
  path.set("normalize", lua.create_function(|_, p: String| Ok(normalize(&p)))?)?;
  path.set("dirname", lua.create_function(|_, p: String| Ok(dirname(&p)))?)?;
  path.set("basename", lua.create_function(|_, p: String| Ok(basename(&p)))?)?;
  path.set("extname", lua.create_function(|_, p: String| Ok(extname(&p)))?)?;

  Ok(path)
}
