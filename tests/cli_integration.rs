//! CLI integration tests for cmake-pilot.
//!
//! These tests run the binary against small CMake trees written to a
//! temporary directory. None of them needs CMake installed.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the cmake-pilot binary command.
fn pilot() -> Command {
    let mut cmd = Command::cargo_bin("cmake-pilot").unwrap();
    cmd.env_remove("CMAKE_PILOT_ROOT");
    cmd
}

/// Write an app + library project and return its directory.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "CMakeLists.txt",
        "cmake_minimum_required(VERSION 3.16)\n\
         project(demo C)\n\
         enable_testing()\n\
         add_subdirectory(core)\n\
         add_executable(app main.c)\n\
         set_target_properties(app PROPERTIES OUTPUT_NAME demo RUNTIME_OUTPUT_DIRECTORY_DEBUG bin)\n",
    );
    write(tmp.path(), "core/CMakeLists.txt", "add_library(core STATIC core.c)\n");
    tmp
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

// ============================================================================
// cmake-pilot targets
// ============================================================================

#[test]
fn test_targets_lists_declared_targets_in_order() {
    let tmp = project();

    let output = pilot()
        .arg("targets")
        .current_dir(tmp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "all (build)",
            "clean (build)",
            "test (build)",
            "core (build)",
            "app (build)",
            "app (run)",
        ]
    );
}

#[test]
fn test_targets_from_subdirectory_uses_outermost_root() {
    let tmp = project();

    pilot()
        .args(["targets", "--run"])
        .current_dir(tmp.path().join("core"))
        .assert()
        .success()
        .stdout("app (run)\n");
}

#[test]
fn test_targets_json() {
    let tmp = project();

    pilot()
        .args(["targets", "--run", "--json"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name":"app""#))
        .stdout(predicate::str::contains(r#""kind":"run""#));
}

#[test]
fn test_targets_without_project_fails() {
    let tmp = TempDir::new().unwrap();

    pilot()
        .arg("targets")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find CMakeLists.txt"));
}

#[test]
fn test_json_mode_reports_errors_as_events() {
    let tmp = TempDir::new().unwrap();

    pilot()
        .args(["targets", "--json"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""reason":"error""#))
        .stdout(predicate::str::contains("could not find CMakeLists.txt"))
        .stderr(predicate::str::contains("error:").not());
}

#[test]
fn test_self_referencing_project_still_lists_targets() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "CMakeLists.txt", "add_library(core)\nadd_subdirectory(.)\n");

    pilot()
        .arg("targets")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("all (build)\nclean (build)\ncore (build)\n");
}

#[test]
fn test_explicit_root() {
    let tmp = project();
    let elsewhere = TempDir::new().unwrap();

    pilot()
        .arg("targets")
        .arg("--root")
        .arg(tmp.path())
        .current_dir(elsewhere.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("core (build)"));
}

// ============================================================================
// cmake-pilot run / build
// ============================================================================

#[test]
fn test_debug_run_prints_launch_descriptor() {
    let tmp = project();

    pilot()
        .args(["run", "--target", "app", "--debugger", "lldb"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""program""#))
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains(r#""workingDirectory""#))
        .stdout(predicate::str::contains(r#""debuggerKind": "lldb""#));
}

#[test]
fn test_run_library_target_fails() {
    let tmp = project();

    pilot()
        .args(["run", "--target", "core"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown target `core (run)`"));
}

#[test]
fn test_build_unknown_target_fails() {
    let tmp = project();

    pilot()
        .args(["build", "--target", "missing"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown target `missing (build)`"));
}

#[test]
fn test_project_config_sets_debugger() {
    let tmp = project();
    write(tmp.path(), ".cmake-pilot/config.toml", "[run]\ndebugger = \"gdb\"\n");

    pilot()
        .args(["run", "--target", "app"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""debuggerKind": "gdb""#));
}

// ============================================================================
// cmake-pilot completions
// ============================================================================

#[test]
fn test_completions_bash() {
    pilot()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cmake-pilot"));
}
