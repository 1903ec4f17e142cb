//! Top-level driver: recipe discovery, selection and the imports directory
//! walk.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::consts::{DEFAULT_RECIPE, END_RECIPE, INIT_RECIPE, PAUSE_RECIPE, RECIPE_EXTENSION};
use crate::context::ExecutionContext;
use crate::error::Stop;
use crate::recipe::RecipeRun;
use crate::vars::Variables;

/// What a top-level invocation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
  /// A single recipe file.
  Recipe(PathBuf),
  /// Every recipe under a directory, in walk order.
  Directory(PathBuf),
}

/// Pick what to run, relative to the context root.
///
/// An explicit recipe wins; then `mydeps.exodep` in the root; then
/// `mydeps.exodep` in the imports directory; otherwise the imports directory
/// is walked.
pub fn select(ctx: &ExecutionContext, explicit: Option<&Path>) -> Selection {
  if let Some(recipe) = explicit {
    return Selection::Recipe(recipe.to_path_buf());
  }

  let imports = ctx.options().imports_dir.clone();
  [PathBuf::from(DEFAULT_RECIPE), imports.join(DEFAULT_RECIPE)]
    .into_iter()
    .find(|candidate| ctx.resolve(candidate).is_file())
    .map_or(Selection::Directory(imports), Selection::Recipe)
}

/// Basenames of every recipe file below `dir`. A missing directory yields an
/// empty set.
pub fn collect_recipe_names(dir: &Path) -> BTreeSet<String> {
  WalkDir::new(dir)
    .into_iter()
    .filter_map(|entry| match entry {
      Ok(entry) => Some(entry),
      Err(err) => {
        debug!(error = %err, "skipping unreadable entry");
        None
      }
    })
    .filter(|entry| entry.file_type().is_file() && is_recipe(entry.path()))
    .map(|entry| entry.file_name().to_string_lossy().into_owned())
    .collect()
}

/// Run an invocation: discover recipe names, then run the selection with the
/// default variables.
pub fn run(ctx: &mut ExecutionContext, explicit: Option<&Path>) -> Result<(), Stop> {
  let names = collect_recipe_names(&ctx.resolve(&ctx.options().imports_dir));
  debug!(count = names.len(), "recipes discovered");
  ctx.set_known_recipes(names);

  let vars = Variables::with_defaults();
  match select(ctx, explicit) {
    Selection::Recipe(recipe) => {
      info!(recipe = %recipe.display(), "running recipe");
      RecipeRun::run_file(ctx, &recipe, &vars)?;
    }
    Selection::Directory(dir) => {
      info!(dir = %dir.display(), "walking imports directory");
      run_directory(ctx, &dir, &vars)?;
    }
  }
  Ok(())
}

/// Run every recipe under `dir` (relative to the context root).
///
/// `__init.exodep` runs first and its final variables seed everything else in
/// the directory tree. Then come the directory's own recipes, then each
/// subdirectory, then `__end.exodep`. A `__pause.exodep` marker pauses once the
/// directory is done.
pub fn run_directory(ctx: &mut ExecutionContext, dir: &Path, vars: &Variables) -> Result<(), Stop> {
  let init = dir.join(INIT_RECIPE);
  let seeded = if ctx.resolve(&init).is_file() {
    RecipeRun::run_file(ctx, &init, vars)?.vars
  } else {
    vars.clone()
  };

  let (files, subdirs) = list_directory(&ctx.resolve(dir));

  for name in files.iter().filter(|name| is_recipe(Path::new(name))) {
    let recipe = dir.join(name);
    if is_ignored(&recipe) {
      debug!(recipe = %recipe.display(), "ignored");
      continue;
    }
    RecipeRun::run_file(ctx, &recipe, &seeded)?;
  }

  for name in &subdirs {
    run_directory(ctx, &dir.join(name), &seeded)?;
  }

  let end = dir.join(END_RECIPE);
  if ctx.resolve(&end).is_file() {
    RecipeRun::run_file(ctx, &end, &seeded)?;
  }

  if ctx.resolve(dir.join(PAUSE_RECIPE)).is_file() {
    ctx.console().pause(None);
  }
  Ok(())
}

/// Sorted file and subdirectory names directly inside `dir`.
fn list_directory(dir: &Path) -> (Vec<String>, Vec<String>) {
  let mut files = Vec::new();
  let mut subdirs = Vec::new();

  for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
    let entry = match entry {
      Ok(entry) => entry,
      Err(err) => {
        debug!(error = %err, "skipping unreadable entry");
        continue;
      }
    };
    let name = entry.file_name().to_string_lossy().into_owned();
    if entry.file_type().is_dir() {
      subdirs.push(name);
    } else {
      files.push(name);
    }
  }

  (files, subdirs)
}

fn is_recipe(path: &Path) -> bool {
  path.extension().is_some_and(|ext| ext == RECIPE_EXTENSION)
}

/// Whether a walked recipe is skipped: any path component starting with `__`
/// or `^` marks it as special or disabled.
fn is_ignored(path: &Path) -> bool {
  path.components().any(|component| match component {
    Component::Normal(name) => {
      let name = name.to_string_lossy();
      name.starts_with("__") || name.starts_with('^')
    }
    _ => false,
  })
}
