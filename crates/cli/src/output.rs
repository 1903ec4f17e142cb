//! CLI output formatting.
//!
//! Colored terminal rendering of recipe output. Colors are dropped when the
//! stream is not a terminal.

use owo_colors::{OwoColorize, Stream};

use exodep_lib::console::{Console, Progress, format_error, wait_for_return};

pub mod symbols {
  pub const INFO: &str = "•";
}

/// Terminal console for recipe runs.
#[derive(Debug, Default)]
pub struct TermConsole;

impl Console for TermConsole {
  fn message(&mut self, text: &str) {
    println!("{}", text);
  }

  fn progress(&mut self, progress: Progress, target: &str) {
    let label = progress.label();
    println!(
      "{} {}",
      label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      target
    );
  }

  fn error(&mut self, source: &str, line: usize, message: &str) {
    let report = format_error(source, line, message);
    let (header, detail) = report.split_once('\n').unwrap_or((report.as_str(), ""));
    println!(
      "{}\n{}",
      header.if_supports_color(Stream::Stdout, |s| s.red()),
      detail
    );
  }

  fn alert(&mut self, text: &str) {
    println!("{}", text.if_supports_color(Stream::Stdout, |s| s.yellow()));
  }

  fn pause(&mut self, message: Option<&str>) {
    wait_for_return(message);
  }
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}
