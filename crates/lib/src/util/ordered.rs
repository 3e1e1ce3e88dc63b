//! Insertion-ordered string set.

use std::collections::HashSet;

/// A set of strings that remembers first-seen insertion order.
///
/// Used wherever propagated values must be deduplicated without losing the
/// order they were declared in.
#[derive(Debug, Clone, Default)]
pub struct OrderedSet {
  items: Vec<String>,
  seen: HashSet<String>,
}

impl OrderedSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a value, returning `false` if it was already present.
  pub fn insert(&mut self, value: &str) -> bool {
    if self.seen.contains(value) {
      return false;
    }
    self.seen.insert(value.to_string());
    self.items.push(value.to_string());
    true
  }

  pub fn extend<'a>(&mut self, values: impl IntoIterator<Item = &'a String>) {
    for value in values {
      self.insert(value);
    }
  }

  pub fn into_vec(self) -> Vec<String> {
    self.items
  }
}
