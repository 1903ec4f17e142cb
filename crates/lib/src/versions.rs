//! Version-alias table and strand resolution.
//!
//! A versions manifest maps sets of requested strand names onto the strand
//! that should actually be fetched:
//!
//! ```text
//! # canonical   aliases...
//! zen           apple banana
//! yuka          carrot date
//! ```

use thiserror::Error;

use crate::command::strip_comment;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrandError {
  #[error("no suitable 'strand' variable available for substitution")]
  Missing,
}

/// One manifest entry: a whitespace-joined alias set and its canonical strand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
  pub aliases: String,
  pub canonical: String,
}

impl VersionEntry {
  /// Whether `strand` is a member of this entry's alias set.
  pub fn matches(&self, strand: &str) -> bool {
    self.aliases.split_whitespace().any(|alias| alias == strand)
  }
}

/// Alias table built from one or more versions manifests.
///
/// Entries keep their insertion order and the first matching entry wins.
/// Merging an entry with an alias string already present replaces its
/// canonical value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionTable {
  entries: Vec<VersionEntry>,
}

impl VersionTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn entries(&self) -> &[VersionEntry] {
    &self.entries
  }

  pub fn insert(&mut self, aliases: impl Into<String>, canonical: impl Into<String>) {
    let aliases = aliases.into();
    let canonical = canonical.into();
    match self.entries.iter_mut().find(|entry| entry.aliases == aliases) {
      Some(entry) => entry.canonical = canonical,
      None => self.entries.push(VersionEntry { aliases, canonical }),
    }
  }

  /// Parse manifest text and merge its entries into this table.
  ///
  /// Blank and comment lines are skipped, as are lines with a canonical
  /// strand but no aliases.
  pub fn merge_manifest(&mut self, text: &str) {
    for line in text.lines() {
      let line = strip_comment(line);
      let line = line.trim_start();
      if line.is_empty() {
        continue;
      }
      if let Some((canonical, aliases)) = line.split_once(char::is_whitespace) {
        self.insert(aliases.trim_start(), canonical);
      }
    }
  }

  /// Canonical strand for `strand`, if any entry lists it.
  pub fn lookup(&self, strand: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|entry| entry.matches(strand))
      .map(|entry| entry.canonical.as_str())
  }
}

/// Effective strand for a run.
///
/// `strand` is the current value of the `strand` variable. A value listed by
/// the alias table maps to that entry's canonical strand; any other value is
/// returned unchanged.
///
/// # Errors
///
/// [`StrandError::Missing`] when `strand` is unset.
pub fn resolve_strand(strand: Option<&str>, table: &VersionTable) -> Result<String, StrandError> {
  let strand = strand.ok_or(StrandError::Missing)?;
  Ok(table.lookup(strand).unwrap_or(strand).to_string())
}
