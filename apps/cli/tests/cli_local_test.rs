//! End-to-end local pipeline tests.
//!
//! The external tools (ffmpeg, ImageMagick, COLMAP, Brush) are stand-in
//! shell scripts on a controlled `PATH`, so these run hermetically on any
//! unix dev machine.

#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn splat() -> Command {
    Command::cargo_bin("splat").unwrap()
}

fn fake_bin(dir: &Path, name: &str, script: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn tool_path(bin: &Path) -> String {
    format!("{}:{}", bin.display(), std::env::var("PATH").unwrap_or_default())
}

#[test]
fn test_missing_video_is_a_clear_error() {
    let work = TempDir::new().unwrap();
    splat()
        .arg("--video")
        .arg(work.path().join("nope.mov"))
        .arg("--output")
        .arg(work.path().join("out"))
        .arg("--skip-training")
        .assert()
        .failure()
        .stderr(predicate::str::contains("video file not found"));
}

#[test]
fn test_missing_tools_are_reported_together() {
    let work = TempDir::new().unwrap();
    let empty_bin = work.path().join("bin");
    fs::create_dir_all(&empty_bin).unwrap();
    let video = work.path().join("capture.mov");
    fs::write(&video, b"video").unwrap();

    splat()
        .env("PATH", empty_bin.display().to_string())
        .arg("--video")
        .arg(&video)
        .arg("--output")
        .arg(work.path().join("out"))
        .arg("--skip-training")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing dependencies"))
        .stderr(predicate::str::contains("brew install ffmpeg"));
}

#[test]
fn test_full_local_run_with_fake_tools() {
    let work = TempDir::new().unwrap();
    let bin = work.path().join("bin");
    fs::create_dir_all(&bin).unwrap();

    // ffmpeg's last argument is the frame output pattern.
    fake_bin(
        &bin,
        "ffmpeg",
        r#"for last in "$@"; do :; done
case "$last" in
  *frame_%04d.jpg)
    dir=$(dirname "$last")
    printf jpg > "$dir/frame_0001.jpg"
    printf jpg > "$dir/frame_0002.jpg"
    printf jpg > "$dir/frame_0003.jpg"
    ;;
esac
exit 0"#,
    );
    fake_bin(&bin, "magick", "exit 0");
    fake_bin(&bin, "colmap", "exit 0");
    // Brush's first argument is the workspace; drop an export there.
    let brush = fake_bin(&bin, "brush_app", r#"printf ply > "$1/export_30000.ply""#);

    let video = work.path().join("capture.mov");
    fs::write(&video, b"video").unwrap();
    let out = work.path().join("out");

    splat()
        .env("PATH", tool_path(&bin))
        .env("BRUSH_PATH", &brush)
        .arg("--video")
        .arg(&video)
        .arg("--output")
        .arg(&out)
        .arg("--no-viewer")
        .assert()
        .success()
        .stdout(predicate::str::contains("Video to Gaussian Splat Pipeline"))
        .stdout(predicate::str::contains("Pipeline complete!"))
        .stdout(predicate::str::contains("export_30000.ply"));

    assert!(out.join("export_30000.ply").exists(), "splat export should land in the workspace");
    assert!(out.join("splat_manifest.json").exists(), "manifest should be written");
    assert!(out.join("images").join("frame_0001.jpg").exists());
    assert!(
        out.join("images_original").join("frame_0001.jpg").exists(),
        "originals should be stashed before resizing"
    );
}

#[test]
fn test_skip_flags_reuse_existing_frames() {
    let work = TempDir::new().unwrap();
    let bin = work.path().join("bin");
    fs::create_dir_all(&bin).unwrap();
    let brush = fake_bin(&bin, "brush_app", r#"printf ply > "$1/export_20000.ply""#);

    let out = work.path().join("out");
    let images = out.join("images");
    fs::create_dir_all(&images).unwrap();
    for i in 1..=4 {
        fs::write(images.join(format!("frame_{i:04}.jpg")), b"jpg").unwrap();
    }

    // No ffmpeg/magick/colmap anywhere on PATH: the skipped stages must not
    // probe for them.
    splat()
        .env("PATH", bin.display().to_string())
        .env("BRUSH_PATH", &brush)
        .args(["--video", "capture.mov"])
        .arg("--output")
        .arg(&out)
        .args(["--skip-extract", "--skip-colmap", "--no-viewer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping: Extracting frames"))
        .stdout(predicate::str::contains("Frames processed: 4"))
        .stdout(predicate::str::contains("export_20000.ply"));
}

#[test]
fn test_skip_extract_without_frames_fails() {
    let work = TempDir::new().unwrap();
    splat()
        .args(["--video", "capture.mov"])
        .arg("--output")
        .arg(work.path().join("out"))
        .args(["--skip-extract", "--skip-colmap", "--skip-training"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no usable frames"));
}
