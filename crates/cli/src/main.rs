mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// exodep - pull project dependencies from source hosting services
#[derive(Parser)]
#[command(name = "exodep")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a recipe, or every recipe in the imports directory
  Run {
    /// Recipe file to run (default: mydeps.exodep, then the imports directory)
    recipe: Option<PathBuf>,

    /// Pause for <Return> once the run is complete
    #[arg(short, long)]
    pause: bool,

    /// Working directory to run in (default: current directory)
    #[arg(short = 'C', long)]
    dir: Option<PathBuf>,
  },

  /// Show platform and configuration details
  Info,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("exodep=debug,exodep_lib=debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Run { recipe, pause, dir } => cmd::cmd_run(recipe.as_deref(), dir.as_deref(), pause),
    Commands::Info => {
      cmd::cmd_info();
      Ok(())
    }
  }
}
