//! Recipe interpretation.
//!
//! A [`RecipeRun`] executes one recipe, file or in-memory text, line by line.
//! Each run owns its variables, URI template, version table, default
//! destination and change flags. `include`, `sinclude` and the bootstrap
//! driver start child runs that receive a snapshot of the parent's variables.
//!
//! Errors are reported against the offending line and never end the run. Only
//! `stop` does, by returning [`Stop`] up through every enclosing run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::command::{Command, PathOp, Predicate, TransferOp, strip_comment};
use crate::console::Progress;
use crate::consts::{AUTHORITY_VAR, DEFAULT_HOSTING, DEFAULT_STRAND, VERSIONS_FILE, host_template};
use crate::context::{ExecutionContext, normalize};
use crate::error::{Interrupt, RecipeError, Stop};
use crate::exec::run_shell;
use crate::fileops;
use crate::macros;
use crate::placeholder::{self, PlaceholderError, Resolver, Syntax};
use crate::sync::{SyncOutcome, sync_file, text_matches};
use crate::transport::{self, FetchMode, is_remote};
use crate::vars::Variables;
use crate::versions::{self, VersionTable};

/// Source name used for recipes that do not come from a file.
pub const INLINE_SOURCE: &str = "<inline>";

/// Indentation of continuation lines in alert and stop banners.
const CONTINUATION: &str = "       ";

/// What a finished run hands back to its caller.
#[derive(Debug, Clone)]
pub struct RunSummary {
  pub vars: Variables,
  /// Some fetch in the run changed its destination.
  pub files_changed: bool,
  /// The last fetch in the run changed its destination.
  pub last_changed: bool,
}

pub struct RecipeRun {
  source: String,
  file: Option<PathBuf>,
  line: usize,
  vars: Variables,
  uri_template: String,
  versions: VersionTable,
  default_dest: Option<String>,
  last_changed: bool,
  files_changed: bool,
}

impl RecipeRun {
  fn new(source: String, file: Option<PathBuf>, vars: &Variables) -> Self {
    Self {
      source,
      file,
      line: 0,
      vars: vars.snapshot(),
      uri_template: host_template(DEFAULT_HOSTING).unwrap_or_default().to_string(),
      versions: VersionTable::new(),
      default_dest: None,
      last_changed: false,
      files_changed: false,
    }
  }

  /// Run the recipe file at `path` (relative to the working directory).
  ///
  /// A file already processed in this invocation is skipped silently. A
  /// missing file is reported and yields an empty run.
  pub fn run_file(ctx: &mut ExecutionContext, path: impl AsRef<Path>, vars: &Variables) -> Result<RunSummary, Stop> {
    let path = normalize(path.as_ref());
    let mut run = Self::new(path.display().to_string(), Some(path.clone()), vars);

    if !ctx.mark_recipe(&path) {
      return Ok(run.finish());
    }

    let text = match fs::read_to_string(ctx.resolve(&path)) {
      Ok(text) => text,
      Err(err) => {
        debug!(path = %path.display(), error = %err, "recipe unreadable");
        run.report(ctx, &RecipeError::RecipeNotFound(path));
        return Ok(run.finish());
      }
    };

    info!(recipe = %run.source, "processing");
    run.run_lines(ctx, &text)?;
    Ok(run.finish())
  }

  /// Run recipe text held in memory.
  pub fn run_text(ctx: &mut ExecutionContext, text: &str, vars: &Variables) -> Result<RunSummary, Stop> {
    let mut run = Self::new(INLINE_SOURCE.to_string(), None, vars);
    run.run_lines(ctx, text)?;
    Ok(run.finish())
  }

  fn finish(self) -> RunSummary {
    RunSummary {
      vars: self.vars,
      files_changed: self.files_changed,
      last_changed: self.last_changed,
    }
  }

  fn run_lines(&mut self, ctx: &mut ExecutionContext, text: &str) -> Result<(), Stop> {
    for line in text.lines() {
      self.line += 1;
      self.process_line(ctx, line, true)?;
    }
    Ok(())
  }

  /// Dispatch one line. Conditional commands run their instruction only when
  /// the predicate equals `sought`.
  fn process_line(&mut self, ctx: &mut ExecutionContext, line: &str, sought: bool) -> Result<(), Stop> {
    let line = strip_comment(line).trim_start();
    if line.is_empty() {
      return Ok(());
    }

    let Some(command) = Command::parse(line) else {
      self.report(ctx, &RecipeError::UnrecognizedCommand(line.to_string()));
      return Ok(());
    };

    match self.execute(ctx, command, sought) {
      Ok(()) => Ok(()),
      Err(Interrupt::Stop(stop)) => Err(stop),
      Err(Interrupt::Error(err)) => {
        self.report(ctx, &err);
        Ok(())
      }
    }
  }

  fn execute(&mut self, ctx: &mut ExecutionContext, command: Command<'_>, sought: bool) -> Result<(), Interrupt> {
    match command {
      Command::SetVar { name, value } => {
        if name.is_empty() {
          return Err(RecipeError::MissingVariableName.into());
        }
        self.vars.set(name, value);
      }
      Command::DefaultVar { name, value } => {
        if name.is_empty() {
          return Err(RecipeError::MissingVariableName.into());
        }
        self.vars.set_default(name, value);
      }
      Command::Include(path) => self.include(ctx, path)?,
      Command::Sinclude(text) => {
        RecipeRun::run_text(ctx, &text.replace('\t', "\n"), &self.vars)?;
      }
      Command::Hosting(host) => {
        let template = host_template(host).ok_or_else(|| RecipeError::UnknownProvider(host.to_string()))?;
        self.uri_template = template.to_string();
      }
      Command::UriTemplate(template) => self.uri_template = template.to_string(),
      Command::Versions(file) => self.load_versions(ctx, file.unwrap_or(VERSIONS_FILE))?,
      Command::Authority(src) => self.check_authority(ctx, src)?,
      Command::Uses(name) => {
        let base = basename(name);
        if !ctx.knows_recipe(base) {
          return Err(RecipeError::UnknownRecipe(base.to_string()).into());
        }
      }
      Command::ShowVars => self.show_vars(ctx),
      Command::LcVars => self.apply_defaults(macros::lcvars()),
      Command::AutoVars => self.autovars(ctx)?,
      Command::Dest(dest) => self.default_dest = dest.map(str::to_string),
      Command::Get { src, dst, mode } => self.retrieve(ctx, src, dst, mode)?,
      Command::Transfer { op, src, dst } => self.transfer(ctx, op, src, dst)?,
      Command::Path { op, path } => self.path_op(ctx, op, path)?,
      Command::Exec(cmd) => self.exec(ctx, cmd)?,
      Command::Subst { src, dst } => self.subst(ctx, src, dst)?,
      Command::Conditional { predicate, instruction } => {
        if self.evaluate(ctx, predicate)? == sought {
          self.process_line(ctx, instruction, true)?;
        }
      }
      Command::Not(instruction) => self.process_line(ctx, instruction, !sought)?,
      Command::Echo(message) => {
        let text = match message {
          Some(message) => self.expand(message)?,
          None => String::new(),
        };
        ctx.console().message(&text);
      }
      Command::Pause(message) => {
        let text = message.map(|m| self.expand(m)).transpose()?;
        ctx.console().pause(text.as_deref());
      }
      Command::Alert(message) => {
        let text = format!("ALERT: {} ({}):\n{}{}", self.source, self.line, CONTINUATION, self.expand(message)?);
        ctx.console().alert(&text);
        ctx.alerts_mut().record(text);
      }
      Command::ShowAlerts => {
        let pending = ctx.alerts_mut().take_pending();
        if !pending.is_empty() {
          ctx.console().message("RECORDED ALERTS:");
          ctx.console().message(&pending.join("\n"));
        }
      }
      Command::AlertsToFile(path) => self.alerts_to_file(ctx, path)?,
      Command::Stop(message) => return Err(self.stop(ctx, message).into()),
    }
    Ok(())
  }

  fn report(&self, ctx: &mut ExecutionContext, err: &RecipeError) {
    warn!(source = %self.source, line = self.line, error = %err, "recipe line failed");
    ctx.console().error(&self.source, self.line, &err.to_string());
  }

  fn expand(&self, text: &str) -> Result<String, PlaceholderError> {
    placeholder::expand(text, Syntax::Recipe, self)
  }

  /// Full URI for `file`: remote sources are only expanded, anything else is
  /// slotted into `template` first.
  fn make_uri(&self, file: &str, template: &str) -> Result<String, PlaceholderError> {
    if is_remote(file) {
      return self.expand(file);
    }
    self.expand(&template.replace("${file}", file))
  }

  /// The URI template pinned to the default strand with no subdirectory, used
  /// to locate version manifests.
  fn master_strand_template(&self) -> String {
    self.uri_template.replace("${strand}", DEFAULT_STRAND).replace("${path}", "")
  }

  /// Expand `dst` and, when it names a directory, append the basename of `src`.
  fn destination(&self, ctx: &ExecutionContext, src: &str, dst: &str) -> Result<String, PlaceholderError> {
    let mut dest = self.expand(dst)?;
    if dest.ends_with('/') || ctx.resolve(&dest).is_dir() {
      if !dest.ends_with('/') {
        dest.push('/');
      }
      dest.push_str(basename(src));
    }
    Ok(dest)
  }

  /// Directory relative to which this recipe's own paths resolve.
  fn recipe_dir(&self) -> PathBuf {
    self
      .file
      .as_deref()
      .and_then(Path::parent)
      .map(Path::to_path_buf)
      .unwrap_or_default()
  }

  fn record_outcome(&mut self, ctx: &mut ExecutionContext, outcome: SyncOutcome, dest: &str) {
    ctx.console().progress(outcome.progress(), dest);
    if outcome.is_change() {
      self.last_changed = true;
      self.files_changed = true;
      ctx.record_change();
    }
  }

  fn include(&mut self, ctx: &mut ExecutionContext, path: &str) -> Result<(), Interrupt> {
    let path = normalize(&self.recipe_dir().join(self.expand(path)?));
    if !ctx.resolve(&path).is_file() {
      return Err(RecipeError::IncludeNotFound(path).into());
    }
    RecipeRun::run_file(ctx, &path, &self.vars)?;
    Ok(())
  }

  fn load_versions(&mut self, ctx: &ExecutionContext, file: &str) -> Result<(), RecipeError> {
    let uri = self.make_uri(file, &self.master_strand_template())?;
    let content = transport::retrieve_bytes(ctx.transport(), ctx.root(), &uri, FetchMode::Text)
      .map_err(|source| RecipeError::Transport { uri: uri.clone(), source })?;
    self.versions.merge_manifest(&String::from_utf8_lossy(&content));
    debug!(uri = %uri, entries = self.versions.entries().len(), "versions loaded");
    Ok(())
  }

  fn check_authority(&mut self, ctx: &ExecutionContext, src: &str) -> Result<(), RecipeError> {
    let uri = self.make_uri(src, &self.uri_template)?;
    self.vars.set(AUTHORITY_VAR, &uri);

    let Some(file) = &self.file else {
      return Ok(());
    };

    let remote = transport::retrieve_bytes(ctx.transport(), ctx.root(), &uri, FetchMode::Text)
      .map_err(|source| RecipeError::Transport { uri: uri.clone(), source })?;
    let local = transport::retrieve_bytes(ctx.transport(), ctx.root(), &file.to_string_lossy(), FetchMode::Text)
      .map_err(|source| RecipeError::Transport {
        uri: file.display().to_string(),
        source,
      })?;

    if !text_matches(&String::from_utf8_lossy(&remote), &String::from_utf8_lossy(&local)) {
      return Err(RecipeError::AuthorityMismatch(self.source.clone()));
    }
    Ok(())
  }

  fn show_vars(&self, ctx: &mut ExecutionContext) {
    let lines: Vec<String> = self
      .vars
      .iter()
      .map(|(name, raw)| match self.expand(raw) {
        Ok(expanded) if expanded != raw => format!("{}: {} -> {}", name, raw, expanded),
        _ => format!("{}: {}", name, raw),
      })
      .collect();
    for line in lines {
      ctx.console().message(&line);
    }
  }

  fn apply_defaults(&mut self, defaults: Vec<(String, String)>) {
    for (name, value) in defaults {
      self.vars.set_default(&name, &value);
    }
  }

  fn autovars(&mut self, ctx: &mut ExecutionContext) -> Result<(), RecipeError> {
    let project = self.vars.get("project").ok_or(RecipeError::MissingProject)?.to_string();

    if self.vars.get("strand").is_some_and(|strand| strand != DEFAULT_STRAND) {
      if let Err(err) = self.load_versions(ctx, VERSIONS_FILE) {
        self.report(ctx, &err);
      }
    }

    self.apply_defaults(macros::autovars(&project));
    Ok(())
  }

  fn retrieve(&mut self, ctx: &mut ExecutionContext, src: &str, dst: Option<&str>, mode: FetchMode) -> Result<(), RecipeError> {
    self.last_changed = false;

    let dst = match (dst, &self.default_dest) {
      (Some(dst), _) => dst.to_string(),
      (None, Some(default)) => default.clone(),
      (None, None) if is_remote(src) => return Err(RecipeError::ExplicitUriWithoutDest(src.to_string())),
      (None, None) if self.uri_template.contains("${path}") => {
        format!("{}{}", self.vars.get("path").unwrap_or_default(), src)
      }
      (None, None) => src.to_string(),
    };

    let uri = self.make_uri(src, &self.uri_template)?;
    let dest = self.destination(ctx, src, &dst)?;
    let dest_path = ctx.resolve(&dest);

    if ctx.is_repeat_fetch(&uri, &dest_path) {
      ctx.console().progress(Progress::Repeat, &dest);
      return Ok(());
    }

    let temp = transport::retrieve_to_temp(ctx.transport(), ctx.root(), &uri, mode)
      .map_err(|source| RecipeError::Transport { uri: uri.clone(), source })?;
    let outcome = sync_file(temp, &dest_path)?;
    self.record_outcome(ctx, outcome, &dest);
    Ok(())
  }

  fn transfer(&mut self, ctx: &mut ExecutionContext, op: TransferOp, src: &str, dst: &str) -> Result<(), RecipeError> {
    let src = self.expand(src)?;
    let dest = self.destination(ctx, &src, dst)?;
    let (src_path, dest_path) = (ctx.resolve(&src), ctx.resolve(&dest));
    let target = format!("'{}' to '{}'", src, dest);

    match op {
      TransferOp::Cp => {
        let copied = fileops::copy_if_changed(&src_path, &dest_path).map_err(|source| RecipeError::FileOp {
          op: "cp",
          target: target.clone(),
          source,
        })?;
        if copied {
          ctx.console().progress(Progress::Copied, &target);
        }
      }
      TransferOp::Mv => {
        fileops::move_path(&src_path, &dest_path).map_err(|source| RecipeError::FileOp {
          op: "mv",
          target: target.clone(),
          source,
        })?;
        ctx.console().progress(Progress::Moved, &target);
      }
    }
    Ok(())
  }

  fn path_op(&mut self, ctx: &mut ExecutionContext, op: PathOp, path: &str) -> Result<(), RecipeError> {
    let path = self.expand(path)?;
    let full = ctx.resolve(&path);

    let (name, result, progress) = match op {
      PathOp::Mkdir => ("mkdir", fileops::make_dir(&full), Some(Progress::MadeDir)),
      PathOp::Rmdir => ("rmdir", fileops::remove_dir(&full), Some(Progress::RemovedDir)),
      PathOp::Rm => ("rm", fileops::remove_file(&full), Some(Progress::Removed)),
      PathOp::Touch => ("touch", fileops::touch(&full), None),
    };

    result.map_err(|source| RecipeError::FileOp {
      op: name,
      target: format!("'{}'", path),
      source,
    })?;

    if let Some(progress) = progress {
      ctx.console().progress(progress, &path);
    }
    Ok(())
  }

  fn exec(&mut self, ctx: &mut ExecutionContext, cmd: &str) -> Result<(), RecipeError> {
    let cmd = self.expand(cmd)?;
    let working_dir = ctx.resolve(self.recipe_dir());

    if let Err(err) = run_shell(&cmd, &working_dir) {
      warn!(cmd = %cmd, error = %err, "unable to spawn command");
    }
    Ok(())
  }

  fn subst(&mut self, ctx: &mut ExecutionContext, src: &str, dst: Option<&str>) -> Result<(), RecipeError> {
    let src = self.expand(src)?;
    let dest = match dst {
      Some(dst) => self.expand(dst)?,
      None => src.clone(),
    };

    let src_path = ctx.resolve(&src);
    let text = fs::read_to_string(&src_path).map_err(|source| RecipeError::SubstSource { path: src_path, source })?;

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
      out.push_str(&placeholder::expand(line, Syntax::Subst, &*self)?);
    }

    let temp = transport::stage(out.as_bytes()).map_err(|source| RecipeError::Transport {
      uri: src.clone(),
      source,
    })?;
    let outcome = sync_file(temp, &ctx.resolve(&dest))?;
    self.record_outcome(ctx, outcome, &dest);
    Ok(())
  }

  fn evaluate(&self, ctx: &ExecutionContext, predicate: Predicate<'_>) -> Result<bool, RecipeError> {
    Ok(match predicate {
      Predicate::VarSet(name) => self.vars.is_truthy(name),
      Predicate::DirExists(path) => ctx.resolve(self.expand(path)?).is_dir(),
      Predicate::FileExists(path) => ctx.resolve(self.expand(path)?).is_file(),
      Predicate::LastChanged => self.last_changed,
      Predicate::RunChanged => self.files_changed,
      Predicate::AnyChanged => ctx.any_changed(),
      Predicate::Alerts => ctx.alerts().any(),
      Predicate::Os(os) => os.is_current(),
    })
  }

  fn alerts_to_file(&self, ctx: &mut ExecutionContext, path: &str) -> Result<(), RecipeError> {
    let path = ctx.resolve(self.expand(path)?);
    let write_err = |source| RecipeError::AlertsFile {
      path: path.clone(),
      source,
    };

    if path.is_file() {
      let mut old = path.clone().into_os_string();
      old.push(".old");
      fs::rename(&path, old).map_err(write_err)?;
    }

    if ctx.alerts().any() {
      let content: String = ctx.alerts().all().map(|alert| format!("{}\n", alert)).collect();
      fs::write(&path, content).map_err(write_err)?;
    }
    Ok(())
  }

  /// Print the stop banner, run the on-stop hook and build the [`Stop`].
  fn stop(&mut self, ctx: &mut ExecutionContext, message: Option<&str>) -> Stop {
    ctx.console().message(&format!("STOPPED: {} ({}):", self.source, self.line));

    if let Some(message) = message {
      match self.expand(message) {
        Ok(text) => ctx.console().message(&format!("{}{}", CONTINUATION, text)),
        Err(err) => self.report(ctx, &RecipeError::from(err)),
      }
    }

    let stop = Stop {
      origin: self.source.clone(),
      line: self.line,
    };

    let hook = ctx.options().onstop_recipe();
    let is_hook = self.file.as_ref().is_some_and(|file| ctx.canonical(file) == ctx.canonical(&hook));
    if !is_hook && ctx.resolve(&hook).is_file() {
      info!(hook = %hook.display(), "running on-stop recipe");
      if let Err(nested) = RecipeRun::run_file(ctx, &hook, &self.vars) {
        debug!(origin = %nested.origin, line = nested.line, "on-stop recipe stopped");
      }
    }

    stop
  }
}

impl Resolver for RecipeRun {
  fn resolve_var(&self, name: &str) -> Option<&str> {
    self.vars.get(name)
  }

  fn resolve_strand(&self) -> Result<String, PlaceholderError> {
    Ok(versions::resolve_strand(self.vars.get("strand"), &self.versions)?)
  }
}

/// Last path segment of `path`, accepting either separator.
fn basename(path: &str) -> &str {
  path.rsplit(['/', '\\']).next().unwrap_or(path)
}
