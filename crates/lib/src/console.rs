//! User-visible output.
//!
//! Everything a recipe run says to the user goes through [`Console`], so the
//! CLI can colour it and tests can capture it.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

/// Outcome labels printed for file operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
  Created,
  Updated,
  Same,
  Repeat,
  Copied,
  Moved,
  MadeDir,
  RemovedDir,
  Removed,
}

impl Progress {
  /// Fixed-width label so targets line up in a column.
  pub fn label(self) -> &'static str {
    match self {
      Progress::Created => "Created...",
      Progress::Updated => "Updated...",
      Progress::Same => "Same......",
      Progress::Repeat => "Repeat....",
      Progress::Copied => "cp........",
      Progress::Moved => "mv........",
      Progress::MadeDir => "mkdir.....",
      Progress::RemovedDir => "rmdir.....",
      Progress::Removed => "rm........",
    }
  }
}

/// Sink for user-visible output and interactive pauses.
pub trait Console {
  /// Free text such as `echo` output or alert banners.
  fn message(&mut self, text: &str);

  /// A file operation outcome.
  fn progress(&mut self, progress: Progress, target: &str);

  /// A recovered, line-level error.
  fn error(&mut self, source: &str, line: usize, message: &str);

  /// A recorded alert. Defaults to printing it as a message.
  fn alert(&mut self, text: &str) {
    self.message(text);
  }

  /// Block until the user acknowledges.
  fn pause(&mut self, message: Option<&str>);
}

/// Format an error report the way every console prints it.
pub fn format_error(source: &str, line: usize, message: &str) -> String {
  format!("Error: {}, line {}:\n       {}", source, line, message)
}

/// Print the pause banner and wait for a line on stdin.
///
/// A closed or unreadable stdin counts as acknowledgement.
pub fn wait_for_return(message: Option<&str>) {
  let mut stdout = io::stdout();
  let _ = writeln!(stdout);
  if let Some(message) = message {
    let _ = writeln!(stdout, "{}", message);
  }
  let _ = writeln!(stdout, ">>> Press <Return> to continue <<<");
  let _ = stdout.flush();

  let mut input = String::new();
  let _ = io::stdin().lock().read_line(&mut input);
}

/// Console that records everything in memory.
///
/// Clones share the same buffer, so a test can keep one handle and give
/// another to the execution context.
#[derive(Debug, Clone, Default)]
pub struct BufferConsole {
  lines: Rc<RefCell<Vec<String>>>,
  errors: Rc<RefCell<Vec<String>>>,
}

impl BufferConsole {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every printed line, errors included, in order.
  pub fn lines(&self) -> Vec<String> {
    self.lines.borrow().clone()
  }

  /// Error messages only, without location.
  pub fn errors(&self) -> Vec<String> {
    self.errors.borrow().clone()
  }

  /// Whether any printed line contains `needle`.
  pub fn contains(&self, needle: &str) -> bool {
    self.lines.borrow().iter().any(|line| line.contains(needle))
  }

  fn push(&self, text: String) {
    self.lines.borrow_mut().extend(text.lines().map(str::to_string));
  }
}

impl Console for BufferConsole {
  fn message(&mut self, text: &str) {
    if text.is_empty() {
      self.lines.borrow_mut().push(String::new());
    } else {
      self.push(text.to_string());
    }
  }

  fn progress(&mut self, progress: Progress, target: &str) {
    self.push(format!("{} {}", progress.label(), target));
  }

  fn error(&mut self, source: &str, line: usize, message: &str) {
    self.errors.borrow_mut().push(message.to_string());
    self.push(format_error(source, line, message));
  }

  fn pause(&mut self, message: Option<&str>) {
    self.push(format!("PAUSE {}", message.unwrap_or_default()));
  }
}
