//! Shared helpers for library integration tests.

use std::path::{Path, PathBuf};

use exodep_lib::console::BufferConsole;
use exodep_lib::context::{ExecutionContext, RunOptions};
use exodep_lib::transport::MemoryTransport;
use tempfile::TempDir;

pub const GITHUB: &str = "https://raw.githubusercontent.com";

/// Isolated working directory with an in-memory transport and a captured
/// console.
pub struct TestEnv {
  pub temp: TempDir,
  pub transport: MemoryTransport,
  pub console: BufferConsole,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
      transport: MemoryTransport::new(),
      console: BufferConsole::new(),
    }
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.temp.path().join(relative)
  }

  /// Write a file relative to the working directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.path(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path)).unwrap()
  }

  /// Serve `content` from the github raw host.
  pub fn serve_github(&self, path: &str, content: &str) {
    self.transport.insert(&format!("{}/{}", GITHUB, path), content);
  }

  /// A fresh context sharing this environment's transport and console.
  pub fn context(&self) -> ExecutionContext {
    let options = RunOptions {
      root: self.root().to_path_buf(),
      imports_dir: PathBuf::from("exodep-imports"),
    };
    ExecutionContext::new(options, Box::new(self.transport.clone()), Box::new(self.console.clone()))
  }
}
