//! Top-level driver scenarios.

use std::path::Path;

use exodep_lib::bootstrap;

use super::common::TestEnv;

#[test]
fn walks_imports_with_shared_init() {
  let env = TestEnv::new();
  env.serve_github("codalogic/zing/master/zing.h", "zing\n");
  env.serve_github("codalogic/dsl-pa/master/dsl-pa.h", "dsl\n");
  env.write_file("exodep-imports/__init.exodep", "$owner codalogic\n$ext_home ext/\n");
  env.write_file("exodep-imports/zing.exodep", "$project zing\nget zing.h ${ext_home}\n");
  env.write_file("exodep-imports/more/dsl-pa.exodep", "$project dsl-pa\nget dsl-pa.h ${ext_home}\n");
  env.write_file("exodep-imports/^old/legacy.exodep", "echo legacy\n");

  let mut ctx = env.context();
  bootstrap::run(&mut ctx, None).unwrap();

  assert!(env.console.errors().is_empty(), "{:?}", env.console.errors());
  assert_eq!(env.read_file("ext/zing.h"), "zing\n");
  assert_eq!(env.read_file("ext/dsl-pa.h"), "dsl\n");
  assert!(!env.console.contains("legacy"));
}

#[test]
fn mydeps_takes_precedence_over_walk() {
  let env = TestEnv::new();
  env.write_file("mydeps.exodep", "echo mydeps\n");
  env.write_file("exodep-imports/other.exodep", "echo other\n");

  let mut ctx = env.context();
  bootstrap::run(&mut ctx, None).unwrap();

  assert_eq!(env.console.lines(), vec!["mydeps"]);
}

#[test]
fn explicit_recipe_and_uses() {
  let env = TestEnv::new();
  env.write_file("exodep-imports/libs/zing.exodep", "echo never run\n");
  env.write_file("mydeps.exodep", "echo wrong recipe\n");
  env.write_file("setup/project.exodep", "uses exodep-imports/libs/zing.exodep\necho chosen\n");

  let mut ctx = env.context();
  bootstrap::run(&mut ctx, Some(Path::new("setup/project.exodep"))).unwrap();

  assert_eq!(env.console.lines(), vec!["chosen"]);
}

#[test]
fn missing_recipe_is_reported_not_fatal() {
  let env = TestEnv::new();

  let mut ctx = env.context();
  bootstrap::run(&mut ctx, Some(Path::new("absent.exodep"))).unwrap();

  assert_eq!(env.console.errors().len(), 1);
  assert!(env.console.errors()[0].contains("absent.exodep"));
}

#[test]
fn onstop_hook_runs_once() {
  let env = TestEnv::new();
  env.write_file("exodep-imports/__onstop.exodep", "echo cleaning up\nstop again\n");
  env.write_file("mydeps.exodep", "stop first\n");

  let mut ctx = env.context();
  let stop = bootstrap::run(&mut ctx, None).unwrap_err();

  assert_eq!(stop.origin, "mydeps.exodep");
  let cleanups = env.console.lines().iter().filter(|line| *line == "cleaning up").count();
  assert_eq!(cleanups, 1);
}
