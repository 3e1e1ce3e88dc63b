//! Platform predicates.
//!
//! A [`Predicate`] is a boolean condition over a target's platform, toolchain
//! and optimization level. Exclusion rules, conditional settings and
//! conditional dependency edges are all gated by one.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::platform::{Optimization, Platform, TargetKey, Toolchain};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
  /// Holds for every target.
  #[default]
  Always,
  /// Holds if the target platform is one of the set.
  Platforms(BTreeSet<Platform>),
  /// Holds if the target toolchain is one of the set.
  Toolchains(BTreeSet<Toolchain>),
  /// Holds if the target optimization is one of the set.
  Optimizations(BTreeSet<Optimization>),
  /// Holds if every inner predicate holds. An empty list holds.
  All(Vec<Predicate>),
  /// Holds if any inner predicate holds. An empty list does not hold.
  Any(Vec<Predicate>),
  Not(Box<Predicate>),
}

impl Predicate {
  pub fn platforms(platforms: impl IntoIterator<Item = Platform>) -> Self {
    Self::Platforms(platforms.into_iter().collect())
  }

  /// Holds for every platform except the given ones.
  pub fn unless_platforms(platforms: impl IntoIterator<Item = Platform>) -> Self {
    Self::Not(Box::new(Self::platforms(platforms)))
  }

  pub fn optimizations(optimizations: impl IntoIterator<Item = Optimization>) -> Self {
    Self::Optimizations(optimizations.into_iter().collect())
  }

  pub fn toolchains(toolchains: impl IntoIterator<Item = Toolchain>) -> Self {
    Self::Toolchains(toolchains.into_iter().collect())
  }

  /// Evaluate against a target.
  pub fn matches(&self, key: &TargetKey) -> bool {
    match self {
      Self::Always => true,
      Self::Platforms(set) => set.contains(&key.platform),
      Self::Toolchains(set) => set.contains(&key.toolchain),
      Self::Optimizations(set) => set.contains(&key.optimization),
      Self::All(inner) => inner.iter().all(|p| p.matches(key)),
      Self::Any(inner) => inner.iter().any(|p| p.matches(key)),
      Self::Not(inner) => !inner.matches(key),
    }
  }

  /// Combine predicates with AND, collapsing the trivial cases.
  pub fn all(mut predicates: Vec<Predicate>) -> Self {
    predicates.retain(|p| *p != Self::Always);
    match predicates.len() {
      0 => Self::Always,
      1 => predicates.remove(0),
      _ => Self::All(predicates),
    }
  }
}
