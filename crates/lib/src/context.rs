//! State shared by every recipe run of one invocation.

use std::collections::{BTreeSet, HashSet};
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::consts::{ONSTOP_RECIPE, imports_dir};
use crate::console::Console;
use crate::transport::Transport;

/// Where an invocation runs.
#[derive(Debug, Clone)]
pub struct RunOptions {
  /// The working directory every relative path resolves against.
  pub root: PathBuf,
  /// Directory holding shared recipes, relative to `root`.
  pub imports_dir: PathBuf,
}

impl RunOptions {
  /// Options rooted at `root` with the configured imports directory.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      imports_dir: PathBuf::from(imports_dir()),
    }
  }

  /// Hook run when a recipe stops, relative to `root`.
  pub fn onstop_recipe(&self) -> PathBuf {
    self.imports_dir.join(ONSTOP_RECIPE)
  }
}

/// Alerts recorded so far, split into those already shown by `showalerts`
/// and those still pending.
#[derive(Debug, Clone, Default)]
pub struct Alerts {
  shown: Vec<String>,
  pending: Vec<String>,
}

impl Alerts {
  pub fn record(&mut self, text: String) {
    self.pending.push(text);
  }

  pub fn any(&self) -> bool {
    !self.shown.is_empty() || !self.pending.is_empty()
  }

  pub fn pending(&self) -> &[String] {
    &self.pending
  }

  /// Move pending alerts to the shown list, returning the ones moved.
  pub fn take_pending(&mut self) -> Vec<String> {
    let moved = self.pending.clone();
    self.shown.append(&mut self.pending);
    moved
  }

  /// Every alert, shown ones first.
  pub fn all(&self) -> impl Iterator<Item = &str> {
    self.shown.iter().chain(&self.pending).map(String::as_str)
  }
}

/// Invocation-wide state: the include guard, fetch dedup, the global change
/// flag, alerts and the known recipe names.
pub struct ExecutionContext {
  options: RunOptions,
  transport: Box<dyn Transport>,
  console: Box<dyn Console>,
  processed_recipes: HashSet<PathBuf>,
  processed_fetches: HashSet<(String, PathBuf)>,
  any_changed: bool,
  alerts: Alerts,
  known_recipes: BTreeSet<String>,
}

impl ExecutionContext {
  /// The root is canonicalized once here, so identity keys built from it
  /// agree whether or not the keyed file exists yet.
  pub fn new(mut options: RunOptions, transport: Box<dyn Transport>, console: Box<dyn Console>) -> Self {
    if let Ok(root) = dunce::canonicalize(&options.root) {
      options.root = root;
    }
    Self {
      options,
      transport,
      console,
      processed_recipes: HashSet::new(),
      processed_fetches: HashSet::new(),
      any_changed: false,
      alerts: Alerts::default(),
      known_recipes: BTreeSet::new(),
    }
  }

  pub fn options(&self) -> &RunOptions {
    &self.options
  }

  pub fn root(&self) -> &Path {
    &self.options.root
  }

  /// Resolve a recipe-relative path against the working directory.
  pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
    self.options.root.join(path)
  }

  /// Identity of `path` for the include guard and fetch dedup: the
  /// canonical root joined with the lexically normalized path.
  pub fn canonical(&self, path: impl AsRef<Path>) -> PathBuf {
    normalize(&self.resolve(path))
  }

  pub fn transport(&self) -> &dyn Transport {
    self.transport.as_ref()
  }

  pub fn console(&mut self) -> &mut dyn Console {
    self.console.as_mut()
  }

  /// Record that the recipe at `path` is being processed.
  ///
  /// Returns `false` when it was already processed in this invocation.
  pub fn mark_recipe(&mut self, path: &Path) -> bool {
    let key = self.canonical(path);
    let first = self.processed_recipes.insert(key);
    if !first {
      debug!(path = %path.display(), "recipe already processed");
    }
    first
  }

  /// Whether fetching `uri` into `dest` already happened and its result is
  /// still on disk. Otherwise the pair is recorded.
  pub fn is_repeat_fetch(&mut self, uri: &str, dest: &Path) -> bool {
    let key = (uri.to_string(), self.canonical(dest));
    if self.processed_fetches.contains(&key) && dest.is_file() {
      return true;
    }
    self.processed_fetches.insert(key);
    false
  }

  pub fn record_change(&mut self) {
    self.any_changed = true;
  }

  pub fn any_changed(&self) -> bool {
    self.any_changed
  }

  pub fn alerts(&self) -> &Alerts {
    &self.alerts
  }

  pub fn alerts_mut(&mut self) -> &mut Alerts {
    &mut self.alerts
  }

  pub fn set_known_recipes(&mut self, names: BTreeSet<String>) {
    self.known_recipes = names;
  }

  pub fn knows_recipe(&self, name: &str) -> bool {
    self.known_recipes.contains(name)
  }
}

/// Remove `.` segments and fold `..` into its parent where possible.
pub(crate) fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir if matches!(out.components().next_back(), Some(Component::Normal(_))) => {
        out.pop();
      }
      other => out.push(other),
    }
  }
  out
}
