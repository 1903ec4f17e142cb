//! `exodep run` integration tests.
//!
//! Recipes use a local URI template so no network access is needed.

use predicates::prelude::*;

use super::common::TestEnv;

const LOCAL_RECIPE: &str = "uritemplate upstream/${file}\n$project zing\nget zing.h include/${project}/\necho fetched ${project}\n";

#[test]
fn runs_mydeps_by_default() {
  let env = TestEnv::new();
  env.write_file("upstream/zing.h", "int zing;\n");
  env.write_file("mydeps.exodep", LOCAL_RECIPE);

  env
    .exodep_cmd()
    .arg("run")
    .assert()
    .success()
    .stdout(predicate::str::contains("Created... include/zing/zing.h"))
    .stdout(predicate::str::contains("fetched zing"));

  assert_eq!(env.read_file("include/zing/zing.h"), "int zing;\n");
}

#[test]
fn second_run_reports_same() {
  let env = TestEnv::new();
  env.write_file("upstream/zing.h", "int zing;\n");
  env.write_file("mydeps.exodep", LOCAL_RECIPE);

  env.exodep_cmd().arg("run").assert().success();
  env
    .exodep_cmd()
    .arg("run")
    .assert()
    .success()
    .stdout(predicate::str::contains("Same...... include/zing/zing.h"));
}

#[test]
fn explicit_recipe_and_dir() {
  let env = TestEnv::new();
  env.write_file("project/upstream/zing.h", "int zing;\n");
  env.write_file("project/deps.exodep", LOCAL_RECIPE);

  env
    .exodep_cmd()
    .args(["run", "deps.exodep", "--dir"])
    .arg(env.path("project"))
    .assert()
    .success();

  assert!(env.path("project/include/zing/zing.h").is_file());
}

#[test]
fn recipe_errors_are_printed_with_location() {
  let env = TestEnv::new();
  env.write_file("mydeps.exodep", "echo start\nfrobnicate\necho ${missing}\necho end\n");

  env
    .exodep_cmd()
    .arg("run")
    .assert()
    .success()
    .stdout(predicate::str::contains(
      "Error: mydeps.exodep, line 2:\n       unrecognised command: frobnicate\n",
    ))
    .stdout(predicate::str::contains("Error: mydeps.exodep, line 3:"))
    .stdout(predicate::str::contains("end"));
}

#[test]
fn stop_halts_but_exits_cleanly() {
  let env = TestEnv::new();
  env.write_file("mydeps.exodep", "echo before\nstop not ready\necho after\n");

  env
    .exodep_cmd()
    .arg("run")
    .assert()
    .success()
    .stdout(predicate::str::contains("STOPPED: mydeps.exodep (2):"))
    .stdout(predicate::str::contains("not ready"))
    .stdout(predicate::str::contains("after").not());
}

#[test]
fn walks_imports_directory() {
  let env = TestEnv::new();
  env.write_file("upstream/zing.h", "int zing;\n");
  env.write_file("exodep-imports/__init.exodep", "$upstream upstream/\n");
  env.write_file("exodep-imports/zing.exodep", "uritemplate ${upstream}${file}\nget zing.h vendor/\n");

  env.exodep_cmd().arg("run").assert().success();

  assert_eq!(env.read_file("vendor/zing.h"), "int zing;\n");
}

#[test]
fn pause_flag_waits_for_return() {
  let env = TestEnv::new();
  env.write_file("mydeps.exodep", "echo done\n");

  env
    .exodep_cmd()
    .args(["run", "--pause"])
    .write_stdin("\n")
    .assert()
    .success()
    .stdout(predicate::str::contains(">>> Press <Return> to continue <<<"));
}
