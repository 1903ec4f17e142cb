//! Names and defaults shared across the engine.

/// Name used for the binary and environment-variable prefixes.
pub const APP_NAME: &str = "exodep";

/// File extension of recipe files discovered by the bootstrap walker.
pub const RECIPE_EXTENSION: &str = "exodep";

/// Strand used when no other is selected, and when fetching version manifests.
pub const DEFAULT_STRAND: &str = "master";

/// Manifest file fetched by a bare `versions` command.
pub const VERSIONS_FILE: &str = "versions.exodep";

/// Conventional imports directory walked when no recipe is named.
pub const IMPORTS_DIR: &str = "exodep-imports";

/// Recipe run when no explicit recipe is given, looked up in the working
/// directory first and then in the imports directory.
pub const DEFAULT_RECIPE: &str = "mydeps.exodep";

pub const INIT_RECIPE: &str = "__init.exodep";
pub const END_RECIPE: &str = "__end.exodep";
pub const PAUSE_RECIPE: &str = "__pause.exodep";
pub const ONSTOP_RECIPE: &str = "__onstop.exodep";

/// Variable holding the resolved authority location. Never exported to child runs.
pub const AUTHORITY_VAR: &str = "__authority";

/// Environment variable overriding [`IMPORTS_DIR`].
pub const IMPORTS_DIR_ENV: &str = "EXODEP_IMPORTS_DIR";

/// Environment variable overriding the HTTP timeout, in seconds.
pub const HTTP_TIMEOUT_ENV: &str = "EXODEP_HTTP_TIMEOUT";

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Built-in URI templates selectable with `hosting <key>`.
pub const HOST_TEMPLATES: &[(&str, &str)] = &[
  (
    "github",
    "https://raw.githubusercontent.com/${owner}/${project}/${strand}/${path}${file}",
  ),
  (
    "gitlab",
    "https://gitlab.com/${owner}/${project}/raw/${strand}/${path}${file}",
  ),
  (
    "bitbucket",
    "https://bitbucket.org/${owner}/${project}/raw/${strand}/${path}${file}",
  ),
];

/// Template active at the start of every run.
pub const DEFAULT_HOSTING: &str = "github";

/// Look up a built-in URI template by provider key.
pub fn host_template(name: &str) -> Option<&'static str> {
  HOST_TEMPLATES
    .iter()
    .find(|(key, _)| *key == name)
    .map(|(_, template)| *template)
}

/// Imports directory name, honouring [`IMPORTS_DIR_ENV`].
pub fn imports_dir() -> String {
  std::env::var(IMPORTS_DIR_ENV)
    .ok()
    .filter(|dir| !dir.trim().is_empty())
    .unwrap_or_else(|| IMPORTS_DIR.to_string())
}

/// HTTP timeout in seconds, honouring [`HTTP_TIMEOUT_ENV`].
pub fn http_timeout_secs() -> u64 {
  std::env::var(HTTP_TIMEOUT_ENV)
    .ok()
    .and_then(|value| value.trim().parse().ok())
    .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
}
