//! Implementation of the `exodep run` command.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use exodep_lib::bootstrap;
use exodep_lib::console::wait_for_return;
use exodep_lib::context::{ExecutionContext, RunOptions};
use exodep_lib::transport::HttpTransport;

use crate::output::TermConsole;

/// Execute the run command.
///
/// Paths inside recipes, and `recipe` itself, resolve against `dir` when given,
/// otherwise against the current directory. A recipe that stops still exits
/// successfully; the stop banner has already been printed.
pub fn cmd_run(recipe: Option<&Path>, dir: Option<&Path>, pause: bool) -> Result<()> {
  let root = match dir {
    Some(dir) => dir.to_path_buf(),
    None => std::env::current_dir().context("Failed to determine current directory")?,
  };
  if !root.is_dir() {
    bail!("working directory not found: {}", root.display());
  }

  let transport = HttpTransport::new().context("Failed to create HTTP client")?;
  let mut ctx = ExecutionContext::new(RunOptions::new(root), Box::new(transport), Box::new(TermConsole));

  if let Err(stop) = bootstrap::run(&mut ctx, recipe) {
    info!(origin = %stop.origin, line = stop.line, "run stopped");
  }

  info!(
    changed = ctx.any_changed(),
    alerts = ctx.alerts().any(),
    "run complete"
  );

  if pause {
    wait_for_return(None);
  }

  Ok(())
}
