//! Integration tests for the `splat` argument surface.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn splat() -> Command {
    Command::cargo_bin("splat").unwrap()
}

#[test]
fn test_help_lists_pipeline_and_remote_flags() {
    splat()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--video"))
        .stdout(predicate::str::contains("--fps"))
        .stdout(predicate::str::contains("--skip-training"))
        .stdout(predicate::str::contains("--remote-host"))
        .stdout(predicate::str::contains("--save-remote-config"));
}

#[test]
fn test_version_flag() {
    splat().arg("--version").assert().success().stdout(predicate::str::contains("splat"));
}

#[test]
fn test_video_and_output_are_required() {
    splat().assert().failure().stderr(predicate::str::contains("--video"));

    splat()
        .args(["--video", "capture.mov"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_matcher_rejects_unknown_values() {
    splat()
        .args(["--video", "capture.mov", "--output", "out", "--matcher", "fancy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sequential"))
        .stderr(predicate::str::contains("exhaustive"));
}

#[test]
fn test_zero_fps_is_rejected_before_any_work() {
    let dir = TempDir::new().unwrap();
    splat()
        .args(["--video", "missing.mov"])
        .arg("--output")
        .arg(dir.path().join("out"))
        .args(["--fps", "0", "--skip-training"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fps must be > 0"));
}

#[test]
fn test_sh_degree_above_three_is_rejected() {
    let dir = TempDir::new().unwrap();
    splat()
        .args(["--video", "missing.mov"])
        .arg("--output")
        .arg(dir.path().join("out"))
        .args(["--sh-degree", "9", "--skip-training"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sh_degree must be between 0 and 3"));
}

#[test]
fn test_completions_are_generated_from_env() {
    splat()
        .env("SPLAT_GENERATE_COMPLETIONS", "bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_splat"));
}

#[test]
fn test_completions_reject_unknown_shell() {
    splat()
        .env("SPLAT_GENERATE_COMPLETIONS", "tcsh")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown shell"));
}
