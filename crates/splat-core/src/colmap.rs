//! COLMAP camera pose estimation.
//!
//! Four sub-steps against the workspace: feature extraction, feature
//! matching, sparse mapping, then conversion of each sparse model to text
//! format for the trainer. The first three abort the pipeline on failure;
//! conversion failures are logged per model and skipped.

use crate::error::{PipelineError, PipelineResult};
use crate::job::MatcherKind;
use crate::layout::WorkspaceLayout;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Runs the reconstruction and returns the sparse model directory.
///
/// # Errors
/// Returns `ToolFailed` when feature extraction, matching, or mapping
/// exits non-zero
pub async fn reconstruct(
    layout: &WorkspaceLayout,
    matcher: MatcherKind,
) -> PipelineResult<PathBuf> {
    let sparse_dir = layout.sparse_dir();
    std::fs::create_dir_all(&sparse_dir)?;

    tracing::info!("estimating camera poses ({matcher} matching)");
    run_step(&feature_extractor_args(layout)).await?;
    run_step(&matcher_args(layout, matcher)).await?;
    run_step(&mapper_args(layout)).await?;

    for model_dir in sparse_models(&sparse_dir)? {
        let args = model_converter_args(&model_dir);
        let output = Command::new("colmap").args(&args).output().await?;
        if !output.status.success() {
            tracing::warn!(
                "text conversion failed for {}: {}",
                model_dir.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
    }

    tracing::info!("reconstruction complete");
    Ok(sparse_dir)
}

async fn run_step(args: &[String]) -> PipelineResult<()> {
    tracing::debug!("colmap {}", args.join(" "));
    let output = Command::new("colmap").args(args).output().await?;
    if output.status.success() {
        return Ok(());
    }
    Err(PipelineError::ToolFailed {
        tool: format!("colmap {}", args.first().map_or("", String::as_str)),
        exit_code: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

fn feature_extractor_args(layout: &WorkspaceLayout) -> Vec<String> {
    vec![
        "feature_extractor".to_string(),
        "--database_path".to_string(),
        layout.database_path().to_string_lossy().to_string(),
        "--image_path".to_string(),
        layout.images_dir().to_string_lossy().to_string(),
        // Every frame came from the same lens.
        "--ImageReader.single_camera".to_string(),
        "1".to_string(),
    ]
}

fn matcher_args(layout: &WorkspaceLayout, matcher: MatcherKind) -> Vec<String> {
    vec![
        matcher.colmap_subcommand().to_string(),
        "--database_path".to_string(),
        layout.database_path().to_string_lossy().to_string(),
    ]
}

fn mapper_args(layout: &WorkspaceLayout) -> Vec<String> {
    vec![
        "mapper".to_string(),
        "--database_path".to_string(),
        layout.database_path().to_string_lossy().to_string(),
        "--image_path".to_string(),
        layout.images_dir().to_string_lossy().to_string(),
        "--output_path".to_string(),
        layout.sparse_dir().to_string_lossy().to_string(),
    ]
}

fn model_converter_args(model_dir: &Path) -> Vec<String> {
    let model_dir = model_dir.to_string_lossy().to_string();
    vec![
        "model_converter".to_string(),
        "--input_path".to_string(),
        model_dir.clone(),
        "--output_path".to_string(),
        model_dir,
        "--output_type".to_string(),
        "TXT".to_string(),
    ]
}

fn sparse_models(sparse_dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let mut models = Vec::new();
    for entry in std::fs::read_dir(sparse_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            models.push(path);
        }
    }
    models.sort();
    Ok(models)
}
