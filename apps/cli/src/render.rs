//! Banner and summary rendering for the `splat` binary.

use colored::Colorize;
use splat_core::{JobSpec, PipelineReport};
use splat_remote::RemoteTarget;
use std::path::{Path, PathBuf};

const RULE: &str = "==================================================";

// Lexical, so it works before the directory exists.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Echoes the effective job parameters before any stage runs.
pub fn banner(job: &JobSpec, remote: Option<&RemoteTarget>, brush: Option<&Path>) {
    println!("{RULE}");
    println!("{}", "Video to Gaussian Splat Pipeline".bold().cyan());
    println!("{RULE}");
    println!("Video:      {}", job.video_path.display());
    println!("Output:     {}", absolute(&job.output_dir).display());
    println!("FPS:        {}", job.extraction.fps);
    println!("Resolution: {}", job.extraction.resolution);
    println!("Matcher:    {}", job.matcher);
    if let Some(target) = remote {
        println!("Training:   REMOTE ({})", target.endpoint());
    } else if let Some(brush) = brush {
        println!("Training:   LOCAL (Brush: {})", brush.display());
    }
    println!("{RULE}");
}

/// Prints what the run produced and how to look at it.
pub fn summary(report: &PipelineReport, output: &Path) {
    let workspace = absolute(output);

    println!();
    println!("{}", "Pipeline complete!".bold().green());
    println!();
    println!("Output directory: {}", workspace.display());
    println!("Frames processed: {}", report.frame_count);
    println!();

    if report.artifacts.is_empty() {
        if report.trained {
            println!(
                "{}",
                "No .ply exports found yet (training may have been interrupted)".yellow()
            );
        } else {
            println!("Training skipped; run again without --skip-training to produce splats.");
        }
    } else {
        println!("Exported splats:");
        for artifact in &report.artifacts {
            let name = artifact
                .path
                .file_name()
                .map_or_else(|| artifact.path.display().to_string(), |n| {
                    n.to_string_lossy().into_owned()
                });
            let size_mb = artifact.size_bytes as f64 / (1024.0 * 1024.0);
            println!("  - {name} ({size_mb:.1} MB)");
        }
    }

    if let Some(job_dir) = &report.remote_job_dir {
        println!();
        println!("Remote job directory: {job_dir}");
    }

    println!();
    println!("To view your splat:");
    println!("  - Open in Brush: brush_app {}", workspace.display());
    println!("  - Upload to: https://supersplat.io/");
    println!("  - Or use any PLY viewer");
}
