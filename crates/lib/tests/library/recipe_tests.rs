//! Recipe scenarios run against an in-memory host.

use exodep_lib::recipe::RecipeRun;
use exodep_lib::vars::Variables;

use super::common::{GITHUB, TestEnv};

const ZING_RECIPE: &str = r#"
# Pull the zing library into the project
$owner codalogic
$project zing
$strand angst
versions

default $ext_home external/
autovars

get include/zing.h   ${zing_inc_dst}
get src/zing.cpp     ${zing_src_dst}
onlastchanged alert zing.cpp changed, rebuild required
bget logo.png        ${ext_home}assets/
"#;

fn serve_zing(env: &TestEnv) {
  env.serve_github("codalogic/zing/master/versions.exodep", "1.0 angst\n# unreleased\n2.0 beta gamma\n");
  env.serve_github("codalogic/zing/1.0/include/zing.h", "#pragma once\r\nint zing();\r\n");
  env.serve_github("codalogic/zing/1.0/src/zing.cpp", "int zing() { return 1; }\n");
  env
    .transport
    .insert(&format!("{}/codalogic/zing/1.0/logo.png", GITHUB), vec![0x89u8, b'P', b'N', b'G', b'\r', b'\n']);
}

#[test]
fn fetches_project_layout_on_aliased_strand() {
  let env = TestEnv::new();
  serve_zing(&env);
  let mut ctx = env.context();

  let summary = RecipeRun::run_text(&mut ctx, ZING_RECIPE, &Variables::with_defaults()).unwrap();

  assert!(env.console.errors().is_empty(), "{:?}", env.console.errors());
  assert_eq!(env.read_file("external/include/zing/zing.h"), "#pragma once\nint zing();\n");
  assert_eq!(env.read_file("external/src/zing/zing.cpp"), "int zing() { return 1; }\n");
  assert_eq!(
    std::fs::read(env.path("external/assets/logo.png")).unwrap(),
    vec![0x89u8, b'P', b'N', b'G', b'\r', b'\n']
  );
  assert!(summary.files_changed);
  assert!(ctx.any_changed());
  assert!(ctx.alerts().any());
  assert!(env.console.contains("Created... external/include/zing/zing.h"));
}

#[test]
fn second_invocation_changes_nothing() {
  let env = TestEnv::new();
  serve_zing(&env);

  let mut first = env.context();
  RecipeRun::run_text(&mut first, ZING_RECIPE, &Variables::with_defaults()).unwrap();

  let mut second = env.context();
  let summary = RecipeRun::run_text(&mut second, ZING_RECIPE, &Variables::with_defaults()).unwrap();

  assert!(!summary.files_changed);
  assert!(!second.any_changed());
  assert!(!second.alerts().any());
  assert!(env.console.contains("Same...... external/src/zing/zing.cpp"));
}

#[test]
fn upstream_change_updates_and_alerts() {
  let env = TestEnv::new();
  serve_zing(&env);

  let mut first = env.context();
  RecipeRun::run_text(&mut first, ZING_RECIPE, &Variables::with_defaults()).unwrap();

  env.serve_github("codalogic/zing/1.0/src/zing.cpp", "int zing() { return 2; }\n");
  let mut second = env.context();
  RecipeRun::run_text(&mut second, ZING_RECIPE, &Variables::with_defaults()).unwrap();

  assert!(env.console.contains("Updated... external/src/zing/zing.cpp"));
  assert!(second.alerts().pending()[0].ends_with("zing.cpp changed, rebuild required"));
}

#[test]
fn included_recipes_share_dedup_and_change_state() {
  let env = TestEnv::new();
  env.serve_github("o/common/master/common.h", "common\n");
  env.write_file(
    "deps/a.exodep",
    "$owner o\n$project common\nget common.h inc/\n",
  );
  env.write_file(
    "deps/b.exodep",
    "$owner o\n$project common\nget common.h inc/\nonlastchanged echo b-changed\nonanychanged echo any-changed\n",
  );
  env.write_file("deps/all.exodep", "include a.exodep\ninclude b.exodep\n");

  let mut ctx = env.context();
  RecipeRun::run_file(&mut ctx, "deps/all.exodep", &Variables::with_defaults()).unwrap();

  assert!(env.console.contains("Repeat.... inc/common.h"));
  assert!(!env.console.contains("b-changed"));
  assert!(env.console.contains("any-changed"));
  assert_eq!(env.transport.requests().len(), 1);
}

#[test]
fn child_variables_do_not_leak() {
  let env = TestEnv::new();
  env.write_file("child.exodep", "echo child sees ${colour}\n$colour blue\n");
  env.write_file("main.exodep", "$colour red\ninclude child.exodep\necho parent keeps ${colour}\n");

  let mut ctx = env.context();
  let summary = RecipeRun::run_file(&mut ctx, "main.exodep", &Variables::with_defaults()).unwrap();

  assert_eq!(env.console.lines(), vec!["child sees red", "parent keeps red"]);
  assert_eq!(summary.vars.get("colour"), Some("red"));
}

#[test]
fn stop_inside_include_halts_everything() {
  let env = TestEnv::new();
  env.write_file("inner.exodep", "echo inner\nstop giving up on ${project}\necho unreachable\n");
  env.write_file("outer.exodep", "$project zing\ninclude inner.exodep\necho outer-after\n");

  let mut ctx = env.context();
  let stop = RecipeRun::run_file(&mut ctx, "outer.exodep", &Variables::with_defaults()).unwrap_err();

  assert_eq!(stop.origin, "inner.exodep");
  assert_eq!(stop.line, 2);
  assert!(env.console.contains("STOPPED: inner.exodep (2):"));
  assert!(env.console.contains("giving up on zing"));
  assert!(!env.console.contains("unreachable"));
  assert!(!env.console.contains("outer-after"));
}

#[test]
fn errors_are_reported_and_the_run_continues() {
  let env = TestEnv::new();
  env.write_file(
    "broken.exodep",
    "get nothing-here.txt out.txt\ncp missing.txt other.txt\nfrob\necho ${unset}\necho still running\n",
  );

  let mut ctx = env.context();
  RecipeRun::run_file(&mut ctx, "broken.exodep", &Variables::with_defaults()).unwrap();

  assert_eq!(env.console.errors().len(), 4);
  for line in 1..=4 {
    assert!(env.console.contains(&format!("Error: broken.exodep, line {}:", line)));
  }
  assert!(env.console.contains("still running"));
}

#[test]
fn local_sources_and_subst() {
  let env = TestEnv::new();
  env.write_file("templates/config.h.in", "#define NAME \"${exodep:project}\"\n#define RAW \"${project}\"\n");
  env.write_file("vendor/readme.txt", "local\r\n");

  let mut ctx = env.context();
  RecipeRun::run_text(
    &mut ctx,
    "$project zing\nsubst templates/config.h.in include/config.h\nuritemplate vendor/${file}\nget readme.txt docs/\n",
    &Variables::with_defaults(),
  )
  .unwrap();

  assert_eq!(
    env.read_file("include/config.h"),
    "#define NAME \"zing\"\n#define RAW \"${project}\"\n"
  );
  assert_eq!(env.read_file("docs/readme.txt"), "local\r\n");
}

#[test]
fn alerts_written_to_file() {
  let env = TestEnv::new();
  env.write_file(
    "alerts.exodep",
    "alert first\nshowalerts\nalert second\nonalerts alertstofile alerts.txt\n",
  );

  let mut ctx = env.context();
  RecipeRun::run_file(&mut ctx, "alerts.exodep", &Variables::with_defaults()).unwrap();

  assert_eq!(
    env.read_file("alerts.txt"),
    "ALERT: alerts.exodep (1):\n       first\nALERT: alerts.exodep (3):\n       second\n"
  );
}
