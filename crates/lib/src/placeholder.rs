//! Placeholder expansion against the variable store.
//!
//! Recipe arguments reference variables with placeholders that are replaced
//! textually before a command acts on them.
//!
//! # Placeholder Formats
//!
//! - `${name}` - ordinary expansion, used in recipe lines and URI templates
//! - `${exodep:name}` - the form recognised inside files processed by `subst`,
//!   so template files can keep literal `${...}` text untouched
//!
//! A name is one or more ASCII letters, digits or underscores. Anything else
//! that merely looks like a placeholder (`${a-b}`, an unclosed `${`, a lone
//! `$HOME`) passes through unchanged.
//!
//! # Deferred strand
//!
//! `strand` is never read straight from the store. The resolver maps it
//! through the version-alias table first, see [`crate::versions::resolve_strand`].
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use exodep_lib::placeholder::{expand, Syntax, Resolver, PlaceholderError};
//!
//! struct Vars(BTreeMap<String, String>);
//!
//! impl Resolver for Vars {
//!   fn resolve_var(&self, name: &str) -> Option<&str> {
//!     self.0.get(name).map(|s| s.as_str())
//!   }
//!   fn resolve_strand(&self) -> Result<String, PlaceholderError> {
//!     Ok("master".to_string())
//!   }
//! }
//!
//! let mut vars = BTreeMap::new();
//! vars.insert("project".to_string(), "exodep".to_string());
//! let resolver = Vars(vars);
//!
//! let uri = expand("https://h/${project}/${strand}/a.txt", Syntax::Recipe, &resolver).unwrap();
//! assert_eq!(uri, "https://h/exodep/master/a.txt");
//! ```

use thiserror::Error;

use crate::versions::StrandError;

/// Upper bound on substitutions performed for one input string.
///
/// Recipes do not define cyclic variables; hitting this limit means one did.
pub const MAX_SUBSTITUTIONS: usize = 256;

/// The two placeholder spellings the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
  /// `${name}`
  Recipe,
  /// `${exodep:name}`
  Subst,
}

impl Syntax {
  fn opener(self) -> &'static str {
    match self {
      Syntax::Recipe => "${",
      Syntax::Subst => "${exodep:",
    }
  }

  /// Render the placeholder token for `name` in this syntax.
  pub fn token(self, name: &str) -> String {
    format!("{}{}}}", self.opener(), name)
  }
}

/// Errors that can occur during expansion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
  #[error("unrecognised substitution variable: {0}")]
  Unresolved(String),

  #[error(transparent)]
  Strand(#[from] StrandError),

  #[error("expansion did not settle after {0} substitutions (cyclic variables?)")]
  TooDeep(usize),
}

/// Supplies values for placeholders.
pub trait Resolver {
  /// Look up a plain variable. `None` means unbound.
  fn resolve_var(&self, name: &str) -> Option<&str>;

  /// Compute the effective strand.
  fn resolve_strand(&self) -> Result<String, PlaceholderError>;
}

/// Locate the first well-formed placeholder at or after `from`.
///
/// Returns the byte range of the whole token and the variable name.
fn find_placeholder(input: &str, syntax: Syntax, from: usize) -> Option<(usize, usize, &str)> {
  let opener = syntax.opener();
  let mut search = from;

  while let Some(offset) = input[search..].find(opener) {
    let start = search + offset;
    let name_start = start + opener.len();
    let name_len = input[name_start..]
      .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
      .unwrap_or(input.len() - name_start);
    let name_end = name_start + name_len;

    if name_len > 0 && input[name_end..].starts_with('}') {
      return Some((start, name_end + 1, &input[name_start..name_end]));
    }
    search = start + 1;
  }

  None
}

/// Expand every placeholder in `input`.
///
/// Expansion is iterative: the leftmost placeholder is resolved, every
/// occurrence of that exact token is replaced, and the string is scanned again
/// from the start, so values may themselves contain placeholders.
///
/// # Errors
///
/// Fails on the first unbound variable, on a missing strand, or when the
/// number of substitutions exceeds [`MAX_SUBSTITUTIONS`]. No partial result is
/// returned.
pub fn expand(input: &str, syntax: Syntax, resolver: &impl Resolver) -> Result<String, PlaceholderError> {
  let mut result = input.to_string();

  for _ in 0..MAX_SUBSTITUTIONS {
    let Some((_, _, name)) = find_placeholder(&result, syntax, 0) else {
      return Ok(result);
    };

    let value = if name == "strand" {
      resolver.resolve_strand()?
    } else {
      resolver
        .resolve_var(name)
        .map(str::to_string)
        .ok_or_else(|| PlaceholderError::Unresolved(name.to_string()))?
    };

    let token = syntax.token(name);
    result = result.replace(&token, &value);
  }

  if find_placeholder(&result, syntax, 0).is_some() {
    return Err(PlaceholderError::TooDeep(MAX_SUBSTITUTIONS));
  }
  Ok(result)
}
