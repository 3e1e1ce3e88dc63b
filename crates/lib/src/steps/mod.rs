//! Custom build step binding.
//!
//! Assets that are not compiled (textures, shader pairs) are turned into
//! [`CustomBuildStep`]s: a command for the external resource builder plus the
//! artifact it produces. Generation only records the command; the resource
//! builder runs at build time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{SHADER_ARTIFACT_SUFFIX, TEXTURE_ARTIFACT_SUFFIX};

/// How a module's assets become build steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformRule {
  /// One asset in, one artifact out.
  Texture { extension: String },
  /// A vertex half and a fragment half sharing a stem, combined into one
  /// artifact.
  ShaderPair {
    vertex_suffix: String,
    fragment_suffix: String,
    entry_point: String,
  },
}

impl TransformRule {
  /// PNG textures.
  pub fn texture() -> Self {
    Self::Texture {
      extension: ".png".to_string(),
    }
  }

  /// GLSL `_v.glsl` / `_p.glsl` pairs with a `main` entry point.
  pub fn shader_pair() -> Self {
    Self::ShaderPair {
      vertex_suffix: "_v.glsl".to_string(),
      fragment_suffix: "_p.glsl".to_string(),
      entry_point: "main".to_string(),
    }
  }

  /// Whether an asset is consumed by this rule.
  pub fn accepts(&self, path: &str) -> bool {
    match self {
      Self::Texture { extension } => ends_with_ignore_case(path, extension),
      Self::ShaderPair {
        vertex_suffix,
        fragment_suffix,
        ..
      } => ends_with_ignore_case(path, vertex_suffix) || ends_with_ignore_case(path, fragment_suffix),
    }
  }

  /// File extensions (or suffixes) this rule looks for during discovery.
  pub fn suffixes(&self) -> Vec<&str> {
    match self {
      Self::Texture { extension } => vec![extension.as_str()],
      Self::ShaderPair {
        vertex_suffix,
        fragment_suffix,
        ..
      } => vec![vertex_suffix.as_str(), fragment_suffix.as_str()],
    }
  }
}

/// A non-compile transformation bound to a generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomBuildStep {
  /// The file whose change triggers the step.
  pub input: String,
  /// The artifact the step produces.
  pub output: String,
  pub description: String,
  /// Full command line, program first.
  pub command: Vec<String>,
}

/// Result of binding one rule over a set of assets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
  pub steps: Vec<CustomBuildStep>,
  /// Assets the rule accepted but could not use (half of a shader pair).
  pub unmatched: Vec<String>,
}

impl Binding {
  /// Artifact paths produced by the bound steps.
  pub fn artifacts(&self) -> impl Iterator<Item = &str> {
    self.steps.iter().map(|s| s.output.as_str())
  }

  fn extend(&mut self, other: Binding) {
    self.steps.extend(other.steps);
    self.unmatched.extend(other.unmatched);
  }
}

/// Bind `rule` over `assets`, producing commands that invoke `tool`.
///
/// Assets are `/`-separated paths. Assets not accepted by the rule are
/// ignored. Steps come out sorted by input path.
pub fn bind<'a>(assets: impl IntoIterator<Item = &'a str>, rule: &TransformRule, tool: &str) -> Binding {
  let accepted: Vec<&str> = assets.into_iter().filter(|a| rule.accepts(a)).collect();

  let binding = match rule {
    TransformRule::Texture { extension } => bind_textures(&accepted, extension, tool),
    TransformRule::ShaderPair {
      vertex_suffix,
      fragment_suffix,
      entry_point,
    } => bind_shader_pairs(&accepted, vertex_suffix, fragment_suffix, entry_point, tool),
  };

  for asset in &binding.unmatched {
    debug!(asset = %asset, "shader half has no matching pair, skipping");
  }
  debug!(steps = binding.steps.len(), "bound custom build steps");
  binding
}

/// Bind every rule in turn over the same assets.
pub fn bind_all<'a>(assets: &[&'a str], rules: &[TransformRule], tool: &str) -> Binding {
  let mut binding = Binding::default();
  for rule in rules {
    binding.extend(bind(assets.iter().copied(), rule, tool));
  }
  binding
}

fn bind_textures(assets: &[&str], extension: &str, tool: &str) -> Binding {
  let mut inputs: Vec<&str> = assets.to_vec();
  inputs.sort_unstable();
  inputs.dedup();

  let steps = inputs
    .into_iter()
    .map(|input| {
      let base = strip_suffix_ignore_case(input, extension);
      let output = format!("{}{}", base, TEXTURE_ARTIFACT_SUFFIX);
      CustomBuildStep {
        input: input.to_string(),
        description: format!("texture {}", file_name(base)),
        command: vec![tool.to_string(), "texture".to_string(), output.clone(), input.to_string()],
        output,
      }
    })
    .collect();

  Binding {
    steps,
    unmatched: Vec::new(),
  }
}

fn bind_shader_pairs(assets: &[&str], vertex_suffix: &str, fragment_suffix: &str, entry: &str, tool: &str) -> Binding {
  // Keyed by lowercase stem so `Foo_V.glsl` pairs with `foo_p.glsl`.
  let mut vertex: BTreeMap<String, &str> = BTreeMap::new();
  let mut fragment: BTreeMap<String, &str> = BTreeMap::new();
  let mut binding = Binding::default();

  let mut inputs: Vec<&str> = assets.to_vec();
  inputs.sort_unstable();
  inputs.dedup();

  // Halves whose stems differ only in case: the last in sort order pairs,
  // the others are unmatched.
  for asset in inputs {
    let displaced = if ends_with_ignore_case(asset, vertex_suffix) {
      vertex.insert(strip_suffix_ignore_case(asset, vertex_suffix).to_ascii_lowercase(), asset)
    } else if ends_with_ignore_case(asset, fragment_suffix) {
      fragment.insert(strip_suffix_ignore_case(asset, fragment_suffix).to_ascii_lowercase(), asset)
    } else {
      None
    };
    if let Some(displaced) = displaced {
      binding.unmatched.push(displaced.to_string());
    }
  }

  for (stem, &v) in &vertex {
    let Some(&p) = fragment.get(stem) else {
      binding.unmatched.push(v.to_string());
      continue;
    };

    let base = strip_suffix_ignore_case(v, vertex_suffix);
    let output = format!("{}{}", base, SHADER_ARTIFACT_SUFFIX);
    binding.steps.push(CustomBuildStep {
      input: v.to_string(),
      description: format!("shader {}", file_name(base)),
      command: vec![
        tool.to_string(),
        "shader".to_string(),
        output.clone(),
        "vshader".to_string(),
        "glsl".to_string(),
        v.to_string(),
        entry.to_string(),
        "pshader".to_string(),
        "glsl".to_string(),
        p.to_string(),
        entry.to_string(),
      ],
      output,
    });
  }

  for (stem, &p) in &fragment {
    if !vertex.contains_key(stem) {
      binding.unmatched.push(p.to_string());
    }
  }
  binding.unmatched.sort();

  binding
}

fn ends_with_ignore_case(path: &str, suffix: &str) -> bool {
  path.len() >= suffix.len()
    && path.is_char_boundary(path.len() - suffix.len())
    && path[path.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

fn strip_suffix_ignore_case<'a>(path: &'a str, suffix: &str) -> &'a str {
  if ends_with_ignore_case(path, suffix) {
    &path[..path.len() - suffix.len()]
  } else {
    path
  }
}

fn file_name(path: &str) -> &str {
  path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}
