//! Platform rule engine.
//!
//! Decides which of a module's declared files are compiled for a target.
//! Rules only ever remove files: a file matched by any active exclusion rule
//! is excluded, whatever else applies to it.

use std::collections::BTreeSet;

use tracing::trace;

use crate::error::ConfigError;
use crate::module::{ExclusionPattern, ExclusionRule, ModuleDef};
use crate::platform::{Platform, PlatformTarget, TargetKey};
use crate::predicate::Predicate;

/// Check that a pattern is a plain name that can be matched literally.
pub fn validate_pattern(module: &str, pattern: &ExclusionPattern) -> Result<(), ConfigError> {
  let value = match pattern {
    ExclusionPattern::Suffix(s) | ExclusionPattern::Folder(s) => s,
  };

  let reason = if value.is_empty() {
    Some("pattern is empty")
  } else if value.contains(['/', '\\']) {
    Some("pattern must not contain path separators")
  } else if value.chars().any(char::is_whitespace) {
    Some("pattern must not contain whitespace")
  } else if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
    Some("pattern may only contain letters, digits, '_' and '-'")
  } else {
    None
  };

  match reason {
    Some(reason) => Err(ConfigError::MalformedPattern {
      module: module.to_string(),
      pattern: value.clone(),
      reason,
    }),
    None => Ok(()),
  }
}

/// Built-in rules excluding every other platform's sources.
///
/// For each platform token (`windows`, `linux`, `switch`, ...) both the
/// `_<token>` file suffix and the `<token>/` folder are excluded unless the
/// target is one of the platforms owning that token.
pub fn platform_rules() -> Vec<ExclusionRule> {
  let mut tokens: Vec<&'static str> = Vec::new();
  for platform in Platform::ALL {
    for &token in platform.tokens() {
      if !tokens.contains(&token) {
        tokens.push(token);
      }
    }
  }

  let mut rules = Vec::with_capacity(tokens.len() * 2);
  for token in tokens {
    let owners = Platform::ALL.into_iter().filter(|p| p.tokens().contains(&token));
    let when = Predicate::unless_platforms(owners);
    rules.push(ExclusionRule {
      pattern: ExclusionPattern::Suffix(token.to_string()),
      when: when.clone(),
    });
    rules.push(ExclusionRule {
      pattern: ExclusionPattern::Folder(token.to_string()),
      when,
    });
  }
  rules
}

/// Whether `pattern` matches a `/`-separated path. Case-insensitive.
pub fn pattern_matches(pattern: &ExclusionPattern, path: &str) -> bool {
  let lower = path.to_ascii_lowercase();
  let (dirs, file) = match lower.rsplit_once('/') {
    Some((dirs, file)) => (Some(dirs), file),
    None => (None, lower.as_str()),
  };

  match pattern {
    ExclusionPattern::Suffix(suffix) => {
      let stem = file.split_once('.').map(|(stem, _)| stem).unwrap_or(file);
      let suffix = suffix.to_ascii_lowercase();
      stem
        .strip_suffix(suffix.as_str())
        .is_some_and(|rest| rest.ends_with('_'))
    }
    ExclusionPattern::Folder(folder) => {
      let folder = folder.to_ascii_lowercase();
      dirs.is_some_and(|dirs| dirs.split('/').any(|d| d == folder))
    }
  }
}

/// Rules active for `key`: the module's own (base and matching conditionals)
/// followed by the built-in platform rules.
pub fn active_rules(module: &ModuleDef, key: &TargetKey, builtin: &[ExclusionRule]) -> Vec<ExclusionRule> {
  module
    .active_settings(key)
    .flat_map(|s| s.exclude.iter())
    .chain(builtin.iter())
    .filter(|rule| rule.when.matches(key))
    .cloned()
    .collect()
}

/// Whether any of `rules` matches `path`.
pub fn is_excluded(path: &str, rules: &[ExclusionRule]) -> bool {
  rules.iter().any(|rule| pattern_matches(&rule.pattern, path))
}

/// Filter `files` down to those not excluded for `target`.
pub fn filter_files<'a>(files: &'a [String], module: &ModuleDef, target: &PlatformTarget) -> Vec<&'a String> {
  let key = target.key();
  let rules = active_rules(module, &key, &platform_rules());
  files
    .iter()
    .filter(|file| {
      let excluded = is_excluded(file, &rules);
      if excluded {
        trace!(module = %module.name, target = %key, file = %file, "excluded");
      }
      !excluded
    })
    .collect()
}

/// The files of `module` compiled for `target`.
///
/// Deterministic for a given (module, target) pair; an empty set is valid.
pub fn compile_source_set(module: &ModuleDef, target: &PlatformTarget) -> BTreeSet<String> {
  filter_files(&module.sources, module, target).into_iter().cloned().collect()
}
