//! Local file operations: `cp`, `mv`, `mkdir`, `rmdir`, `rm` and `touch`.
//!
//! Paths arrive already resolved. Each function reports failure as a plain
//! `io::Error`; the caller attaches the operation name.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use tracing::debug;

use crate::sync::files_identical;

/// Copy `src` to `dst` unless `dst` already holds the same bytes.
///
/// Returns whether a copy happened.
pub fn copy_if_changed(src: &Path, dst: &Path) -> io::Result<bool> {
  if files_identical(src, dst).map_err(io::Error::other)? {
    debug!(src = %src.display(), dst = %dst.display(), "copy skipped, identical");
    return Ok(false);
  }
  create_parent(dst)?;
  fs::copy(src, dst)?;
  Ok(true)
}

/// Move `src` to `dst`, replacing any existing file.
///
/// Falls back to copy and delete when a rename is not possible, such as
/// across filesystems.
pub fn move_path(src: &Path, dst: &Path) -> io::Result<()> {
  create_parent(dst)?;
  if dst.is_file() {
    fs::remove_file(dst)?;
  }
  if fs::rename(src, dst).is_ok() {
    return Ok(());
  }
  fs::copy(src, dst)?;
  fs::remove_file(src)
}

/// Create `path` and any missing parents.
pub fn make_dir(path: &Path) -> io::Result<()> {
  fs::create_dir_all(path)
}

/// Remove the directory tree at `path`.
pub fn remove_dir(path: &Path) -> io::Result<()> {
  fs::remove_dir_all(path)
}

pub fn remove_file(path: &Path) -> io::Result<()> {
  fs::remove_file(path)
}

/// Create `path` if missing. Existing content is left untouched.
pub fn touch(path: &Path) -> io::Result<()> {
  create_parent(path)?;
  OpenOptions::new().create(true).append(true).open(path)?;
  Ok(())
}

fn create_parent(path: &Path) -> io::Result<()> {
  match path.parent().filter(|p| !p.as_os_str().is_empty()) {
    Some(parent) => fs::create_dir_all(parent),
    None => Ok(()),
  }
}
