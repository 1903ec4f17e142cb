//! exodep-lib: the recipe engine behind `exodep`
//!
//! A recipe is a line-oriented script that pulls files from source hosting
//! services (or local paths) into a project tree:
//! - [`recipe::RecipeRun`]: runs one recipe file or text
//! - [`context::ExecutionContext`]: state shared across one invocation
//! - [`bootstrap`]: recipe discovery and the imports directory walk
//! - [`transport::Transport`] and [`console::Console`]: the I/O seams

pub mod bootstrap;
pub mod command;
pub mod console;
pub mod consts;
pub mod context;
pub mod error;
pub mod exec;
pub mod fileops;
pub mod macros;
pub mod placeholder;
pub mod platform;
pub mod recipe;
pub mod sync;
pub mod transport;
pub mod vars;
pub mod versions;
