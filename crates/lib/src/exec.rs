//! Shell command execution for the `exec` command.

use std::path::Path;
use std::process::{Command, ExitStatus};

use tracing::{debug, info};

/// Run `cmd` through the platform shell in `working_dir`.
///
/// The child inherits stdin, stdout and stderr. The exit status is returned
/// for logging only; recipes never branch on it.
pub fn run_shell(cmd: &str, working_dir: &Path) -> std::io::Result<ExitStatus> {
  info!(cmd = %cmd, "executing command");

  let (shell, shell_args) = get_shell();
  debug!(shell = %shell, working_dir = ?working_dir, "spawning process");

  let status = Command::new(shell).args(shell_args).arg(cmd).current_dir(working_dir).status()?;

  if !status.success() {
    debug!(cmd = %cmd, code = ?status.code(), "command exited unsuccessfully");
  }
  Ok(status)
}

/// The shell binary and the flag that introduces a command string.
fn get_shell() -> (&'static str, &'static [&'static str]) {
  #[cfg(windows)]
  {
    ("cmd.exe", &["/C"])
  }

  #[cfg(not(windows))]
  {
    ("/bin/sh", &["-c"])
  }
}
