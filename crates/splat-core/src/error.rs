use splat_remote::RemoteError;
use std::path::PathBuf;
use thiserror::Error;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid job: {0}")]
    InvalidJob(String),

    #[error("video file not found: {}", .0.display())]
    VideoNotFound(PathBuf),

    #[error("no usable frames in {} (run without --skip-extract first?)", .0.display())]
    MissingFrames(PathBuf),

    #[error("could not create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("missing dependencies: {0}")]
    MissingDependencies(String),

    #[error("could not find the Brush trainer: {0}")]
    BrushNotFound(String),

    #[error("{tool} failed with status {exit_code}: {stderr}")]
    ToolFailed {
        tool: String,
        exit_code: i32,
        stderr: String,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
