//! Idempotent placement of retrieved content.
//!
//! Retrieved content only replaces a destination when it differs
//! byte-for-byte, so re-running a recipe against an up-to-date working
//! directory touches nothing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::console::Progress;

/// What [`sync_file`] did to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
  /// The destination did not exist and was created.
  Created,
  /// The destination existed with different content and was replaced.
  Changed,
  /// The destination already held identical content.
  Unchanged,
}

impl SyncOutcome {
  pub fn is_change(self) -> bool {
    !matches!(self, SyncOutcome::Unchanged)
  }

  pub fn progress(self) -> Progress {
    match self {
      SyncOutcome::Created => Progress::Created,
      SyncOutcome::Changed => Progress::Updated,
      SyncOutcome::Unchanged => Progress::Same,
    }
  }
}

#[derive(Debug, Error)]
pub enum SyncError {
  #[error("failed to create directory '{path}': {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to write '{path}': {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

fn read(path: &Path) -> Result<Vec<u8>, SyncError> {
  fs::read(path).map_err(|source| SyncError::Read {
    path: path.to_path_buf(),
    source,
  })
}

/// Place the content of `temp` at `dest` unless it is already there.
///
/// Missing parent directories are created. New content is staged beside the
/// destination and renamed over it, so a failed write never leaves a partial
/// file. The temporary file is removed in every case.
pub fn sync_file(temp: NamedTempFile, dest: &Path) -> Result<SyncOutcome, SyncError> {
  let content = read(temp.path())?;
  let parent = dest
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or(Path::new("."));

  let outcome = if !dest.is_file() {
    fs::create_dir_all(parent).map_err(|source| SyncError::CreateDir {
      path: parent.to_path_buf(),
      source,
    })?;
    SyncOutcome::Created
  } else if read(dest)? != content {
    SyncOutcome::Changed
  } else {
    SyncOutcome::Unchanged
  };

  if outcome.is_change() {
    replace(parent, dest, &content)?;
  }

  debug!(dest = %dest.display(), ?outcome, "synced");
  Ok(outcome)
}

fn replace(parent: &Path, dest: &Path, content: &[u8]) -> Result<(), SyncError> {
  let write_err = |source| SyncError::Write {
    path: dest.to_path_buf(),
    source,
  };

  let mut staged = NamedTempFile::new_in(parent).map_err(write_err)?;
  staged.write_all(content).map_err(write_err)?;
  staged.persist(dest).map_err(|err| write_err(err.error))?;
  Ok(())
}

/// Whether two files hold identical bytes. A missing file never matches.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool, SyncError> {
  if !a.is_file() || !b.is_file() {
    return Ok(false);
  }
  Ok(read(a)? == read(b)?)
}

/// Whether two texts hold the same lines, ignoring line endings and
/// trailing whitespace.
pub fn text_matches(a: &str, b: &str) -> bool {
  a.lines().map(str::trim_end).eq(b.lines().map(str::trim_end))
}
