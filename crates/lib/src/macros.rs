//! The variable bundles installed by `lcvars` and `autovars`.
//!
//! Each bundle is an ordered list of `(name, raw value)` pairs applied as
//! defaults, so anything the recipe already bound wins. Values stay
//! unexpanded and resolve when used.

/// Directory kinds that get a destination variable.
const DIR_KINDS: &[&str] = &[
  "inc",
  "src",
  "code",
  "test_inc",
  "test_src",
  "test_code",
  "build",
  "lib",
  "bin",
  "scripts",
];

/// Roots of each directory kind.
const ROOTS: &[(&str, &str)] = &[
  ("inc_dst", "${ext_home}include/"),
  ("src_dst", "${ext_home}src/"),
  ("code_dst", "${ext_home}"),
  ("test_inc_dst", "${ext_test_home}include/"),
  ("test_src_dst", "${ext_test_home}src/"),
  ("test_code_dst", "${ext_test_home}"),
  ("build_dst", "${ext_home}build/"),
  ("lib_dst", "${ext_home}lib/"),
  ("bin_dst", "${ext_home}bin/"),
  ("scripts_dst", "${ext_home}scripts/"),
];

/// `proj_<kind>_dst` under the lowercase project name.
pub fn lcvars() -> Vec<(String, String)> {
  DIR_KINDS
    .iter()
    .map(|kind| (format!("proj_{kind}_dst"), format!("${{{kind}_dst}}${{lcproject}}/")))
    .collect()
}

/// The full destination layout for `project`.
pub fn autovars(project: &str) -> Vec<(String, String)> {
  let mut defaults = vec![
    ("ext_home".to_string(), String::new()),
    ("ext_test_home".to_string(), "test/".to_string()),
  ];

  defaults.extend(ROOTS.iter().map(|(name, value)| (name.to_string(), value.to_string())));

  defaults.extend(
    DIR_KINDS
      .iter()
      .map(|kind| (format!("proj_{kind}_dst"), format!("${{{kind}_dst}}${{project}}/"))),
  );

  let safe_project = project.replace('-', "_");
  defaults.extend(
    DIR_KINDS
      .iter()
      .map(|kind| (format!("{safe_project}_{kind}_dst"), format!("${{proj_{kind}_dst}}"))),
  );

  let lc_safe_project = safe_project.to_lowercase();
  if lc_safe_project != safe_project {
    defaults.extend(
      DIR_KINDS
        .iter()
        .map(|kind| (format!("{lc_safe_project}_{kind}_dst"), format!("${{{kind}_dst}}${{lcproject}}/"))),
    );
  }

  defaults
}
