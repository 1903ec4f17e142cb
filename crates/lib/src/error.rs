//! Line-level errors and the stop signal.
//!
//! Every [`RecipeError`] is recovered where it happens: the run reports it
//! with source and line number and carries on with the next line. [`Stop`] is
//! not an error; it unwinds every enclosing run up to the driver.

use std::path::PathBuf;

use thiserror::Error;

use crate::placeholder::PlaceholderError;
use crate::sync::SyncError;
use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum RecipeError {
  #[error("unrecognised command: {0}")]
  UnrecognizedCommand(String),

  /// Unbound variable, missing strand, or runaway expansion.
  #[error(transparent)]
  Placeholder(#[from] PlaceholderError),

  #[error("unrecognised hosting server provider: {0}")]
  UnknownProvider(String),

  #[error("unable to retrieve {uri}: {source}")]
  Transport {
    uri: String,
    #[source]
    source: TransportError,
  },

  #[error("unable to open exodep file: {0}")]
  RecipeNotFound(PathBuf),

  #[error("'include' file not found: {0}")]
  IncludeNotFound(PathBuf),

  #[error("unable to open file for 'subst' command: {path}")]
  SubstSource {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("local exodep file out of sync with authority: {0}")]
  AuthorityMismatch(String),

  #[error("uses command specifies unfound exodep file: {0}")]
  UnknownRecipe(String),

  #[error("explicit uri not supported with commands of the form 'get src_and_dst': {0}")]
  ExplicitUriWithoutDest(String),

  #[error("`$project` variable must be set before calling `autovars` command")]
  MissingProject,

  #[error("variable assignment without a variable name")]
  MissingVariableName,

  #[error(transparent)]
  Sync(#[from] SyncError),

  #[error("unable to '{op}' {target}: {source}")]
  FileOp {
    op: &'static str,
    target: String,
    #[source]
    source: std::io::Error,
  },

  #[error("unable to write alerts to '{path}': {source}")]
  AlertsFile {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Raised by the `stop` command. Carries where it was raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stopped at {origin}, line {line}")]
pub struct Stop {
  pub origin: String,
  pub line: usize,
}

/// What can cut a command short: a reportable error or a stop.
#[derive(Debug)]
pub(crate) enum Interrupt {
  Error(RecipeError),
  Stop(Stop),
}

impl From<Stop> for Interrupt {
  fn from(stop: Stop) -> Self {
    Interrupt::Stop(stop)
  }
}

impl From<RecipeError> for Interrupt {
  fn from(err: RecipeError) -> Self {
    Interrupt::Error(err)
  }
}

impl From<PlaceholderError> for Interrupt {
  fn from(err: PlaceholderError) -> Self {
    Interrupt::Error(err.into())
  }
}

impl From<SyncError> for Interrupt {
  fn from(err: SyncError) -> Self {
    Interrupt::Error(err.into())
  }
}
