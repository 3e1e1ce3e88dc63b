//! Configuration errors.
//!
//! Every variant is fatal: generation stops at the first one and reports the
//! offending module (and target, where one is involved).

use thiserror::Error;

use crate::platform::{TargetKey, UnknownValueError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  /// The dependency graph for a target is not a DAG.
  #[error("dependency cycle detected for {target} between modules: {}", modules.join(", "))]
  Cycle { target: TargetKey, modules: Vec<String> },

  /// A dependency edge names a module that was never defined.
  #[error("module '{module}' depends on unknown module '{dependency}'")]
  UnknownModule { module: String, dependency: String },

  /// A dependency does not declare the target its dependent is built for.
  #[error("module '{module}' depends on '{dependency}', which has no configuration for {target}")]
  MissingTarget {
    module: String,
    dependency: String,
    target: TargetKey,
  },

  /// A predicate or target matrix names a platform, toolchain or
  /// optimization that does not exist.
  #[error("module '{module}': {source}")]
  UnknownValue {
    module: String,
    #[source]
    source: UnknownValueError,
  },

  /// An exclusion pattern that can never be matched reliably.
  #[error("module '{module}': malformed exclusion pattern '{pattern}': {reason}")]
  MalformedPattern {
    module: String,
    pattern: String,
    reason: &'static str,
  },

  /// A target matrix axis with no values.
  #[error("module '{module}': target matrix has no {axis}")]
  EmptyAxis { module: String, axis: &'static str },

  #[error("module '{0}' is defined more than once")]
  DuplicateModule(String),

  /// A module field with the wrong shape.
  #[error("module '{module}': {message}")]
  Invalid { module: String, message: String },
}

impl ConfigError {
  /// Find a `ConfigError` raised from inside a Lua callback.
  pub fn from_lua(err: &mlua::Error) -> Option<&ConfigError> {
    match err {
      mlua::Error::ExternalError(inner) => inner.downcast_ref::<ConfigError>(),
      mlua::Error::CallbackError { cause, .. } | mlua::Error::WithContext { cause, .. } => Self::from_lua(cause),
      _ => None,
    }
  }
}
