//! The variable store.

use std::collections::BTreeMap;

use crate::consts::{AUTHORITY_VAR, DEFAULT_STRAND};

/// Name → value bindings visible to one recipe run.
///
/// Binding `project` also binds `lcproject` to its lowercase form. A child run
/// receives a [`Variables::snapshot`], so its changes never flow back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
  values: BTreeMap<String, String>,
}

impl Variables {
  /// An empty store.
  pub fn new() -> Self {
    Self::default()
  }

  /// The store a top-level run starts with: `strand = master`, `path = ""`.
  pub fn with_defaults() -> Self {
    let mut vars = Self::new();
    vars.set("strand", DEFAULT_STRAND);
    vars.set("path", "");
    vars
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.values.get(name).map(String::as_str)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.values.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Bind `name` unconditionally.
  pub fn set(&mut self, name: &str, value: &str) {
    self.values.insert(name.to_string(), value.to_string());
    if name == "project" {
      self.values.insert("lcproject".to_string(), value.to_lowercase());
    }
  }

  /// Bind `name` only when it is currently unbound. Returns whether it bound.
  pub fn set_default(&mut self, name: &str, value: &str) -> bool {
    if self.contains(name) {
      return false;
    }
    self.set(name, value);
    true
  }

  /// Whether `name` is bound to something other than an empty string, `0`,
  /// or any casing of `false`.
  pub fn is_truthy(&self, name: &str) -> bool {
    match self.get(name) {
      Some(value) => !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false")),
      None => false,
    }
  }

  /// Copy of the store suitable for handing to a child run.
  pub fn snapshot(&self) -> Self {
    let mut copy = self.clone();
    copy.values.remove(AUTHORITY_VAR);
    copy
  }

  /// Bindings in name order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Variables {
  fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
    let mut vars = Self::new();
    for (name, value) in iter {
      vars.set(name, value);
    }
    vars
  }
}
