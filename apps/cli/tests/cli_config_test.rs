//! Integration tests for remote config persistence and resolution.
//!
//! Every test points `SPLAT_CONFIG_DIR` at its own scratch directory so a
//! developer's real `~/.splat` is never read or written.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn splat() -> Command {
    Command::cargo_bin("splat").unwrap()
}

/// Seeds `<root>/out/images` with fake frames so a run with every stage
/// skipped completes without any external tools installed.
fn seeded_output(root: &TempDir) -> PathBuf {
    let out = root.path().join("out");
    let images = out.join("images");
    fs::create_dir_all(&images).unwrap();
    for i in 1..=3 {
        fs::write(images.join(format!("frame_{i:04}.jpg")), b"jpg").unwrap();
    }
    out
}

fn skip_all(cmd: &mut Command, out: &Path) {
    cmd.args(["--video", "capture.mov"])
        .arg("--output")
        .arg(out)
        .args(["--skip-extract", "--skip-colmap", "--skip-training"]);
}

#[test]
fn test_save_remote_config_persists_without_training() {
    let config_dir = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let out = seeded_output(&work);

    let mut cmd = splat();
    skip_all(&mut cmd, &out);
    cmd.env("SPLAT_CONFIG_DIR", config_dir.path())
        .args([
            "--remote",
            "--remote-host",
            "10.0.0.5",
            "--remote-user",
            "alice",
            "--save-remote-config",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved remote config to"));

    let saved = fs::read_to_string(config_dir.path().join("remote.toml")).unwrap();
    assert!(saved.contains("host = \"10.0.0.5\""), "saved config should carry the host");
    assert!(saved.contains("user = \"alice\""), "saved config should carry the user");
}

#[test]
fn test_saved_config_supplies_host_and_user_on_later_runs() {
    let config_dir = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let out = seeded_output(&work);

    let mut save = splat();
    skip_all(&mut save, &out);
    save.env("SPLAT_CONFIG_DIR", config_dir.path())
        .args([
            "--remote",
            "--remote-host",
            "10.0.0.5",
            "--remote-user",
            "alice",
            "--save-remote-config",
        ])
        .assert()
        .success();

    let mut reuse = splat();
    skip_all(&mut reuse, &out);
    reuse
        .env("SPLAT_CONFIG_DIR", config_dir.path())
        .arg("--remote")
        .assert()
        .success()
        .stdout(predicate::str::contains("Using saved remote config: alice@10.0.0.5"))
        .stdout(predicate::str::contains("REMOTE (alice@10.0.0.5)"));
}

#[test]
fn test_flags_override_saved_config_for_one_invocation() {
    let config_dir = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let out = seeded_output(&work);

    let mut save = splat();
    skip_all(&mut save, &out);
    save.env("SPLAT_CONFIG_DIR", config_dir.path())
        .args([
            "--remote",
            "--remote-host",
            "10.0.0.5",
            "--remote-user",
            "alice",
            "--save-remote-config",
        ])
        .assert()
        .success();

    let mut override_run = splat();
    skip_all(&mut override_run, &out);
    override_run
        .env("SPLAT_CONFIG_DIR", config_dir.path())
        .args(["--remote", "--remote-host", "10.9.9.9", "--remote-user", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("REMOTE (bob@10.9.9.9)"))
        .stdout(predicate::str::contains("Using saved remote config").not());

    // The stored file is untouched without --save-remote-config.
    let saved = fs::read_to_string(config_dir.path().join("remote.toml")).unwrap();
    assert!(saved.contains("alice"), "stored config should keep the saved user");
}

#[test]
fn test_resave_overwrites_instead_of_merging() {
    let config_dir = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let out = seeded_output(&work);
    let key = work.path().join("id_ed25519");
    fs::write(&key, b"key").unwrap();

    let mut first = splat();
    skip_all(&mut first, &out);
    first
        .env("SPLAT_CONFIG_DIR", config_dir.path())
        .args(["--remote", "--remote-host", "10.0.0.5", "--remote-user", "alice"])
        .arg("--ssh-key")
        .arg(&key)
        .arg("--save-remote-config")
        .assert()
        .success();

    let mut second = splat();
    skip_all(&mut second, &out);
    second
        .env("SPLAT_CONFIG_DIR", config_dir.path())
        .args([
            "--remote",
            "--remote-host",
            "10.9.9.9",
            "--remote-user",
            "bob",
            "--save-remote-config",
        ])
        .assert()
        .success();

    let saved = fs::read_to_string(config_dir.path().join("remote.toml")).unwrap();
    assert!(saved.contains("10.9.9.9"));
    assert!(!saved.contains("alice"), "old user should not survive a re-save");
    assert!(!saved.contains("key_path"), "old key should not survive a re-save");
}

#[test]
fn test_remote_without_host_or_config_is_a_usage_error() {
    let config_dir = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let out = seeded_output(&work);

    let mut cmd = splat();
    skip_all(&mut cmd, &out);
    cmd.env("SPLAT_CONFIG_DIR", config_dir.path())
        .arg("--remote")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--remote-host and --remote-user"));
}

#[test]
fn test_corrupt_config_file_is_reported() {
    let config_dir = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let out = seeded_output(&work);
    fs::write(config_dir.path().join("remote.toml"), "host = [not toml").unwrap();

    let mut cmd = splat();
    skip_all(&mut cmd, &out);
    cmd.env("SPLAT_CONFIG_DIR", config_dir.path())
        .arg("--remote")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse remote config"));
}
