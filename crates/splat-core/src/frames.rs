//! Frame extraction and downscaling.

use crate::error::{PipelineError, PipelineResult};
use crate::layout::WorkspaceLayout;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Extracts frames from `video` into the workspace `images/` directory at
/// the given sample rate. Returns the number of frames written.
///
/// # Errors
/// Returns `ToolFailed` when ffmpeg exits non-zero
pub async fn extract(video: &Path, layout: &WorkspaceLayout, fps: f64) -> PipelineResult<usize> {
    let images_dir = layout.images_dir();
    std::fs::create_dir_all(&images_dir)?;

    tracing::info!("extracting frames at {fps} fps");
    let args = extract_args(video, &images_dir, fps);
    tracing::debug!("ffmpeg {}", args.join(" "));

    let output = Command::new("ffmpeg").args(&args).output().await?;
    if !output.status.success() {
        return Err(PipelineError::ToolFailed {
            tool: "ffmpeg".to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let count = count_frames(&images_dir)?;
    tracing::info!("extracted {count} frames");
    Ok(count)
}

/// Counts the `.jpg` frames in a directory.
pub fn count_frames(images_dir: &Path) -> PipelineResult<usize> {
    Ok(list_frames(images_dir)?.len())
}

/// Downscales every frame in place so the longest edge is at most
/// `resolution`, keeping full-resolution copies in `images_original/`.
///
/// Per-image resize failures are logged and skipped; an oversized frame is
/// still usable, just slower to train on.
pub async fn resize(layout: &WorkspaceLayout, resolution: u32) -> PipelineResult<()> {
    let stashed = stash_originals(layout)?;
    tracing::info!(
        "resizing {stashed} frames to {resolution}px (originals in {})",
        layout.originals_dir().display()
    );

    for image in list_frames(&layout.images_dir())? {
        let args = resize_args(&image, resolution);
        let output = Command::new("magick").args(&args).output().await?;
        if !output.status.success() {
            tracing::warn!(
                "resize failed for {}: {}",
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
    }
    Ok(())
}

/// Copies every frame into `images_original/` before the in-place resize.
/// Returns how many were copied.
pub fn stash_originals(layout: &WorkspaceLayout) -> PipelineResult<usize> {
    let originals_dir = layout.originals_dir();
    std::fs::create_dir_all(&originals_dir)?;

    let frames = list_frames(&layout.images_dir())?;
    for frame in &frames {
        if let Some(name) = frame.file_name() {
            std::fs::copy(frame, originals_dir.join(name))?;
        }
    }
    Ok(frames.len())
}

fn extract_args(video: &Path, images_dir: &Path, fps: f64) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        video.to_string_lossy().to_string(),
        "-vf".to_string(),
        format!("fps={fps}"),
        // High quality JPEG
        "-q:v".to_string(),
        "2".to_string(),
        images_dir.join("frame_%04d.jpg").to_string_lossy().to_string(),
    ]
}

fn resize_args(image: &Path, resolution: u32) -> Vec<String> {
    let image = image.to_string_lossy().to_string();
    vec![
        image.clone(),
        "-resize".to_string(),
        // The trailing > only shrinks; smaller frames pass through.
        format!("{resolution}x{resolution}>"),
        image,
    ]
}

fn list_frames(images_dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(images_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "jpg") {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_args_sample_and_quality() {
        let args = extract_args(Path::new("clip.mp4"), Path::new("/out/images"), 2.0);
        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "clip.mp4",
                "-vf",
                "fps=2",
                "-q:v",
                "2",
                "/out/images/frame_%04d.jpg",
            ]
        );
    }

    #[test]
    fn test_resize_args_only_shrink() {
        let args = resize_args(Path::new("/out/images/frame_0001.jpg"), 1600);
        assert_eq!(
            args,
            vec![
                "/out/images/frame_0001.jpg",
                "-resize",
                "1600x1600>",
                "/out/images/frame_0001.jpg",
            ]
        );
    }

    #[test]
    fn test_count_frames_ignores_other_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("frame_0001.jpg"), b"x").unwrap();
        std::fs::write(temp.path().join("frame_0002.jpg"), b"x").unwrap();
        std::fs::write(temp.path().join("notes.txt"), b"x").unwrap();

        assert_eq!(count_frames(temp.path()).unwrap(), 2);
    }

    #[test]
    fn test_stash_originals_copies_frames() {
        let temp = TempDir::new().unwrap();
        let layout = WorkspaceLayout::new(temp.path());
        std::fs::create_dir_all(layout.images_dir()).unwrap();
        std::fs::write(layout.images_dir().join("frame_0001.jpg"), b"full-res").unwrap();

        let copied = stash_originals(&layout).unwrap();
        assert_eq!(copied, 1);
        let stashed = layout.originals_dir().join("frame_0001.jpg");
        assert_eq!(std::fs::read(stashed).unwrap(), b"full-res");
    }

    #[test]
    fn test_count_frames_missing_dir_is_io_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("images");
        assert!(count_frames(&missing).is_err());
    }
}
