//! Lua bindings for `bg.module{}`.
//!
//! This module provides:
//! - `register_bg_module()` to register the `bg.module` function
//! - Parsers from Lua tables to [`ModuleDef`], [`Predicate`] and friends
//!
//! Every malformed field is reported as a [`ConfigError`] wrapped in a Lua
//! error, so evaluation can surface it with the module name attached.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use mlua::prelude::*;
use tracing::debug;

use super::{
  Conditional, DependencyEdge, ExclusionPattern, ExclusionRule, Linkage, ModuleDef, ModuleKind, Settings, Visibility,
};
use crate::discover::{DEFAULT_SOURCE_EXTENSIONS, discover_files, to_slash};
use crate::error::ConfigError;
use crate::lua::loaders;
use crate::manifest::Manifest;
use crate::matrix::TargetSpec;
use crate::platform::{Optimization, OutputKind, Platform, Toolchain, UnknownValueError};
use crate::predicate::Predicate;
use crate::rules::validate_pattern;
use crate::steps::TransformRule;

/// Metatable `__type` marker of the table returned by `bg.module{}`.
pub const MODULE_REF_TYPE: &str = "ModuleRef";

const MODULE_FIELDS: &[&str] = &[
  "name",
  "kind",
  "output",
  "root",
  "sources",
  "extensions",
  "assets",
  "targets",
  "transforms",
  "folder",
  "conditions",
];

const SETTINGS_FIELDS: &[&str] = &[
  "defines",
  "exported_defines",
  "include_paths",
  "private_include_paths",
  "library_paths",
  "library_files",
  "copy_files",
  "options",
  "target_path",
  "dependencies",
  "exclude",
];

const PREDICATE_FIELDS: &[&str] = &["platform", "toolchain", "optimization", "any", "all", "not"];

fn config_err(err: ConfigError) -> LuaError {
  LuaError::external(err)
}

fn invalid(module: &str, message: impl Into<String>) -> LuaError {
  config_err(ConfigError::Invalid {
    module: module.to_string(),
    message: message.into(),
  })
}

fn unknown_value(module: &str, source: UnknownValueError) -> LuaError {
  config_err(ConfigError::UnknownValue {
    module: module.to_string(),
    source,
  })
}

fn value_to_string(module: &str, field: &str, value: LuaValue) -> LuaResult<String> {
  match value {
    LuaValue::String(s) => Ok(s.to_str()?.to_string()),
    other => Err(invalid(
      module,
      format!("'{}' must be a string, got {}", field, other.type_name()),
    )),
  }
}

fn optional_string(module: &str, table: &LuaTable, field: &str) -> LuaResult<Option<String>> {
  match table.get::<LuaValue>(field)? {
    LuaValue::Nil => Ok(None),
    value => value_to_string(module, field, value).map(Some),
  }
}

/// A string or a list of strings. Nil is an empty list.
fn string_list(module: &str, field: &str, value: LuaValue) -> LuaResult<Vec<String>> {
  match value {
    LuaValue::Nil => Ok(Vec::new()),
    LuaValue::String(s) => Ok(vec![s.to_str()?.to_string()]),
    LuaValue::Table(t) => t
      .sequence_values::<LuaValue>()
      .map(|v| value_to_string(module, field, v?))
      .collect(),
    other => Err(invalid(
      module,
      format!("'{}' must be a string or a list of strings, got {}", field, other.type_name()),
    )),
  }
}

fn list_field(module: &str, table: &LuaTable, field: &str) -> LuaResult<Vec<String>> {
  string_list(module, field, table.get(field)?)
}

/// The entries of a list-valued field. Nil is an empty list.
fn sequence(module: &str, table: &LuaTable, field: &str) -> LuaResult<Vec<LuaValue>> {
  match table.get::<LuaValue>(field)? {
    LuaValue::Nil => Ok(Vec::new()),
    LuaValue::Table(t) => t.sequence_values::<LuaValue>().collect(),
    other => Err(invalid(
      module,
      format!("'{}' must be a list, got {}", field, other.type_name()),
    )),
  }
}

fn check_fields(module: &str, table: &LuaTable, allowed: &[&[&str]], context: &str) -> LuaResult<()> {
  for pair in table.pairs::<LuaValue, LuaValue>() {
    let (key, _) = pair?;
    let known = match &key {
      LuaValue::String(s) => {
        let key = s.to_str()?;
        allowed.iter().any(|fields| fields.contains(&&*key))
      }
      _ => false,
    };
    if !known {
      let key = match key {
        LuaValue::String(s) => s.to_str()?.to_string(),
        other => format!("<{}>", other.type_name()),
      };
      return Err(invalid(module, format!("unknown {} field '{}'", context, key)));
    }
  }
  Ok(())
}

fn parse_axis<T>(module: &str, values: &[String]) -> LuaResult<BTreeSet<T>>
where
  T: FromStr<Err = UnknownValueError> + Ord,
{
  values
    .iter()
    .map(|v| v.parse::<T>().map_err(|e| unknown_value(module, e)))
    .collect()
}

/// One axis of a `when` table. An axis that is present must name at least
/// one value, or the predicate could never match.
fn predicate_axis<T>(module: &str, table: &LuaTable, field: &str) -> LuaResult<Option<BTreeSet<T>>>
where
  T: FromStr<Err = UnknownValueError> + Ord,
{
  if !table.contains_key(field)? {
    return Ok(None);
  }
  let values = list_field(module, table, field)?;
  if values.is_empty() {
    return Err(invalid(module, format!("predicate '{}' lists no values", field)));
  }
  parse_axis(module, &values).map(Some)
}

/// Parse a `when` table.
///
/// Axes are ANDed together, the values of one axis are ORed. `any`, `all`
/// and `not` nest further predicates.
pub fn parse_predicate(module: &str, value: LuaValue) -> LuaResult<Predicate> {
  let table = match value {
    LuaValue::Nil => return Ok(Predicate::Always),
    LuaValue::Table(t) => t,
    other => {
      return Err(invalid(
        module,
        format!("predicate must be a table, got {}", other.type_name()),
      ));
    }
  };
  check_fields(module, &table, &[PREDICATE_FIELDS], "predicate")?;

  let mut parts = Vec::new();

  if let Some(platforms) = predicate_axis::<Platform>(module, &table, "platform")? {
    parts.push(Predicate::Platforms(platforms));
  }
  if let Some(toolchains) = predicate_axis::<Toolchain>(module, &table, "toolchain")? {
    parts.push(Predicate::Toolchains(toolchains));
  }
  if let Some(optimizations) = predicate_axis::<Optimization>(module, &table, "optimization")? {
    parts.push(Predicate::Optimizations(optimizations));
  }

  if table.contains_key("any")? {
    let inner = sequence(module, &table, "any")?
      .into_iter()
      .map(|v| parse_predicate(module, v))
      .collect::<LuaResult<Vec<_>>>()?;
    parts.push(Predicate::Any(inner));
  }
  if table.contains_key("all")? {
    let inner = sequence(module, &table, "all")?
      .into_iter()
      .map(|v| parse_predicate(module, v))
      .collect::<LuaResult<Vec<_>>>()?;
    parts.push(Predicate::all(inner));
  }
  if table.contains_key("not")? {
    let inner = parse_predicate(module, table.get("not")?)?;
    parts.push(Predicate::Not(Box::new(inner)));
  }

  Ok(Predicate::all(parts))
}

/// Parse a `targets` table: `{ platforms = {...}, toolchains = {...},
/// optimizations = {...} }`. A missing axis is an empty axis.
pub fn parse_targets(module: &str, value: LuaValue) -> LuaResult<Option<TargetSpec>> {
  let table = match value {
    LuaValue::Nil => return Ok(None),
    LuaValue::Table(t) => t,
    other => {
      return Err(invalid(
        module,
        format!("'targets' must be a table, got {}", other.type_name()),
      ));
    }
  };
  check_fields(module, &table, &[&["platforms", "toolchains", "optimizations"]], "targets")?;

  let platforms = parse_axis::<Platform>(module, &list_field(module, &table, "platforms")?)?;
  let toolchains = parse_axis::<Toolchain>(module, &list_field(module, &table, "toolchains")?)?;
  let optimizations = parse_axis::<Optimization>(module, &list_field(module, &table, "optimizations")?)?;

  TargetSpec::new(module, platforms, toolchains, optimizations)
    .map(Some)
    .map_err(config_err)
}

/// Lua table for a target spec, as exposed on `bg.targets`.
pub fn targets_to_lua(lua: &Lua, spec: &TargetSpec) -> LuaResult<LuaTable> {
  let table = lua.create_table()?;
  table.set(
    "platforms",
    lua.create_sequence_from(spec.platforms.iter().map(|p| p.as_str()))?,
  )?;
  table.set(
    "toolchains",
    lua.create_sequence_from(spec.toolchains.iter().map(|t| t.as_str()))?,
  )?;
  table.set(
    "optimizations",
    lua.create_sequence_from(spec.optimizations.iter().map(|o| o.as_str()))?,
  )?;
  Ok(table)
}

fn module_ref_name(table: &LuaTable) -> LuaResult<Option<String>> {
  if let Some(mt) = table.metatable()
    && let Ok(type_name) = mt.get::<String>("__type")
    && type_name == MODULE_REF_TYPE
  {
    return Ok(Some(table.get("name")?));
  }
  Ok(None)
}

fn dependency_target(module: &str, value: LuaValue) -> LuaResult<String> {
  match value {
    LuaValue::String(s) => Ok(s.to_str()?.to_string()),
    LuaValue::Table(t) => module_ref_name(&t)?.ok_or_else(|| invalid(module, "dependency must be a module reference")),
    other => Err(invalid(
      module,
      format!("dependency must be a module name or reference, got {}", other.type_name()),
    )),
  }
}

/// Parse one `dependencies` entry: a name, a module reference, or
/// `{ module = ..., visibility = "public"|"private", linkage = "link"|"headers" }`.
pub fn parse_dependency(module: &str, value: LuaValue) -> LuaResult<DependencyEdge> {
  let table = match value {
    LuaValue::Table(t) if module_ref_name(&t)?.is_none() => t,
    other => return Ok(DependencyEdge::public(&dependency_target(module, other)?)),
  };
  check_fields(module, &table, &[&["module", "visibility", "linkage"]], "dependency")?;

  let name = dependency_target(module, table.get("module")?)?;
  let visibility = match optional_string(module, &table, "visibility")?.as_deref() {
    None | Some("public") => Visibility::Public,
    Some("private") => Visibility::Private,
    Some(other) => return Err(invalid(module, format!("unknown visibility '{}'", other))),
  };
  let linkage = match optional_string(module, &table, "linkage")?.as_deref() {
    None | Some("link") => Linkage::Link,
    Some("headers") => Linkage::Headers,
    Some(other) => return Err(invalid(module, format!("unknown linkage '{}'", other))),
  };

  Ok(DependencyEdge {
    module: name,
    visibility,
    linkage,
  })
}

/// Parse one `exclude` entry: `{ suffix = "linux" }` or `{ folder = "win32",
/// when = {...} }`.
pub fn parse_exclusion(module: &str, value: LuaValue) -> LuaResult<ExclusionRule> {
  let LuaValue::Table(table) = value else {
    return Err(invalid(module, "exclusion must be a table with 'suffix' or 'folder'"));
  };
  check_fields(module, &table, &[&["suffix", "folder", "when"]], "exclusion")?;

  let pattern = match (
    optional_string(module, &table, "suffix")?,
    optional_string(module, &table, "folder")?,
  ) {
    (Some(suffix), None) => ExclusionPattern::Suffix(suffix),
    (None, Some(folder)) => ExclusionPattern::Folder(folder),
    _ => return Err(invalid(module, "exclusion needs exactly one of 'suffix' or 'folder'")),
  };
  validate_pattern(module, &pattern).map_err(config_err)?;

  Ok(ExclusionRule {
    pattern,
    when: parse_predicate(module, table.get("when")?)?,
  })
}

/// Parse one `transforms` entry: `"texture"`, `"shader_pair"`, or a table
/// with a `kind` and overrides for the defaults.
pub fn parse_transform(module: &str, value: LuaValue) -> LuaResult<TransformRule> {
  let (kind, table) = match value {
    LuaValue::String(s) => (s.to_str()?.to_string(), None),
    LuaValue::Table(t) => {
      let kind = optional_string(module, &t, "kind")?.ok_or_else(|| invalid(module, "transform needs a 'kind'"))?;
      (kind, Some(t))
    }
    other => {
      return Err(invalid(
        module,
        format!("transform must be a string or a table, got {}", other.type_name()),
      ));
    }
  };

  let field = |name: &str| -> LuaResult<Option<String>> {
    match &table {
      Some(t) => optional_string(module, t, name),
      None => Ok(None),
    }
  };

  match kind.as_str() {
    "texture" => {
      let mut rule = TransformRule::texture();
      if let (TransformRule::Texture { extension }, Some(ext)) = (&mut rule, field("extension")?) {
        *extension = ext;
      }
      Ok(rule)
    }
    "shader_pair" => {
      let mut rule = TransformRule::shader_pair();
      if let TransformRule::ShaderPair {
        vertex_suffix,
        fragment_suffix,
        entry_point,
      } = &mut rule
      {
        if let Some(v) = field("vertex_suffix")? {
          *vertex_suffix = v;
        }
        if let Some(p) = field("fragment_suffix")? {
          *fragment_suffix = p;
        }
        if let Some(e) = field("entry_point")? {
          *entry_point = e;
        }
      }
      Ok(rule)
    }
    other => Err(invalid(module, format!("unknown transform kind '{}'", other))),
  }
}

/// Parse the settings fields of a module or `conditions` entry.
pub fn parse_settings(module: &str, table: &LuaTable) -> LuaResult<Settings> {
  Ok(Settings {
    defines: list_field(module, table, "defines")?,
    exported_defines: list_field(module, table, "exported_defines")?,
    include_paths: list_field(module, table, "include_paths")?,
    private_include_paths: list_field(module, table, "private_include_paths")?,
    library_paths: list_field(module, table, "library_paths")?,
    library_files: list_field(module, table, "library_files")?,
    copy_files: list_field(module, table, "copy_files")?,
    options: list_field(module, table, "options")?,
    target_path: optional_string(module, table, "target_path")?,
    dependencies: sequence(module, table, "dependencies")?
      .into_iter()
      .map(|v| parse_dependency(module, v))
      .collect::<LuaResult<_>>()?,
    exclude: sequence(module, table, "exclude")?
      .into_iter()
      .map(|v| parse_exclusion(module, v))
      .collect::<LuaResult<_>>()?,
  })
}

fn parse_conditional(module: &str, value: LuaValue) -> LuaResult<Conditional> {
  let LuaValue::Table(table) = value else {
    return Err(invalid(module, "condition must be a table"));
  };
  check_fields(module, &table, &[&["when"], SETTINGS_FIELDS], "condition")?;

  Ok(Conditional {
    when: parse_predicate(module, table.get("when")?)?,
    settings: parse_settings(module, &table)?,
  })
}

/// Lexically resolve `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::ParentDir => {
        normalized.pop();
      }
      Component::CurDir => {}
      _ => normalized.push(component),
    }
  }
  normalized
}

/// Resolve a module root against the current script's directory and return
/// it both absolute and relative to the project root.
fn resolve_root(lua: &Lua, module: &str, project_root: &Path, root: Option<&str>) -> LuaResult<(PathBuf, String)> {
  let base = loaders::current_dir(lua)?
    .map(PathBuf::from)
    .unwrap_or_else(|| project_root.to_path_buf());
  let joined = match root {
    Some(root) => base.join(root),
    None => base,
  };
  let absolute = dunce::canonicalize(&joined).unwrap_or_else(|_| normalize(&joined));

  let relative = absolute
    .strip_prefix(project_root)
    .map_err(|_| invalid(module, format!("root '{}' is outside the project root", absolute.display())))?;
  let relative = to_slash(relative);

  Ok((
    absolute,
    if relative.is_empty() {
      ".".to_string()
    } else {
      relative
    },
  ))
}

fn normalize_files(files: Vec<String>) -> Vec<String> {
  let mut files: Vec<String> = files
    .into_iter()
    .map(|f| f.replace('\\', "/").trim_start_matches("./").to_string())
    .collect();
  files.sort();
  files.dedup();
  files
}

/// Parse a `bg.module{}` table into a [`ModuleDef`].
///
/// Relative roots resolve against the directory of the script being
/// evaluated. Sources and assets are discovered under the root unless
/// listed explicitly.
pub fn parse_module(lua: &Lua, project_root: &Path, table: &LuaTable) -> LuaResult<ModuleDef> {
  let name = optional_string("<unnamed>", table, "name")?.ok_or_else(|| invalid("<unnamed>", "module requires 'name'"))?;
  if name.is_empty() || name.contains(['/', '\\']) || name.chars().any(char::is_whitespace) {
    return Err(invalid(&name, "module name must be non-empty without separators or whitespace"));
  }
  let module = name.as_str();
  check_fields(module, table, &[MODULE_FIELDS, SETTINGS_FIELDS], "module")?;

  let kind = match optional_string(module, table, "kind")? {
    None => ModuleKind::Library,
    Some(kind) => ModuleKind::parse(&kind).ok_or_else(|| invalid(module, format!("unknown module kind '{}'", kind)))?,
  };

  let root = optional_string(module, table, "root")?;
  let (root_abs, root_rel) = resolve_root(lua, module, project_root, root.as_deref())?;

  let mut def = ModuleDef::new(module, kind, &root_rel);

  if let Some(output) = optional_string(module, table, "output")? {
    def.output = OutputKind::from_str(&output).map_err(|e| unknown_value(module, e))?;
  }
  if let Some(targets) = parse_targets(module, table.get("targets")?)? {
    def.targets = targets;
  }
  def.folder = optional_string(module, table, "folder")?;
  def.transforms = sequence(module, table, "transforms")?
    .into_iter()
    .map(|v| parse_transform(module, v))
    .collect::<LuaResult<_>>()?;
  def.settings = parse_settings(module, table)?;
  def.conditionals = sequence(module, table, "conditions")?
    .into_iter()
    .map(|v| parse_conditional(module, v))
    .collect::<LuaResult<_>>()?;

  let explicit_sources = table.contains_key("sources")?;
  def.sources = if explicit_sources {
    normalize_files(list_field(module, table, "sources")?)
  } else if kind.builds_from_source() {
    let extensions = list_field(module, table, "extensions")?;
    let extensions: Vec<&str> = if extensions.is_empty() {
      DEFAULT_SOURCE_EXTENSIONS.to_vec()
    } else {
      extensions.iter().map(String::as_str).collect()
    };
    discover_files(&root_abs, &extensions).map_err(LuaError::external)?
  } else {
    Vec::new()
  };

  def.assets = if table.contains_key("assets")? {
    normalize_files(list_field(module, table, "assets")?)
  } else if def.transforms.is_empty() {
    Vec::new()
  } else {
    let suffixes: Vec<&str> = def.transforms.iter().flat_map(|t| t.suffixes()).collect();
    discover_files(&root_abs, &suffixes).map_err(LuaError::external)?
  };

  Ok(def)
}

/// Build the reference table handed back to the script.
fn module_ref(lua: &Lua, def: &ModuleDef) -> LuaResult<LuaTable> {
  let table = lua.create_table()?;
  table.set("name", def.name.as_str())?;
  table.set("kind", def.kind.as_str())?;
  table.set("root", def.root.as_str())?;

  let mt = lua.create_table()?;
  mt.set("__type", MODULE_REF_TYPE)?;
  table.set_metatable(Some(mt))?;
  Ok(table)
}

/// Register the `bg.module` function on the bg table.
///
/// The `bg.module{}` function:
/// 1. Parses and validates a [`ModuleDef`] from the Lua table
/// 2. Rejects a name that is already defined
/// 3. Adds the module to the manifest
/// 4. Returns a ModuleRef table usable in other modules' `dependencies`
pub fn register_bg_module(
  lua: &Lua,
  bg_table: &LuaTable,
  manifest: Rc<RefCell<Manifest>>,
  project_root: PathBuf,
) -> LuaResult<()> {
  let module_fn = lua.create_function(move |lua, spec_table: LuaTable| {
    let def = parse_module(lua, &project_root, &spec_table)?;

    let mut manifest = manifest.borrow_mut();
    if manifest.modules.contains_key(&def.name) {
      return Err(config_err(ConfigError::DuplicateModule(def.name)));
    }

    debug!(
      module = %def.name,
      kind = %def.kind,
      root = %def.root,
      sources = def.sources.len(),
      assets = def.assets.len(),
      "defined module"
    );

    let module_ref = module_ref(lua, &def)?;
    manifest.modules.insert(def.name.clone(), def);
    Ok(module_ref)
  })?;

  bg_table.set("module", module_fn)?;
  Ok(())
}
