//! Splat Core
//!
//! The video-to-splat pipeline:
//! - Defining capture jobs (`JobSpec`) and their workspace layout
//! - Extracting and downscaling frames with ffmpeg and ImageMagick
//! - Estimating camera poses with COLMAP
//! - Training backends (`Trainer`): local Brush or a remote GPU host
//! - Collecting exported splats into a manifest

pub mod artifacts;
pub mod brush;
pub mod colmap;
pub mod defaults;
pub mod driver;
pub mod error;
pub mod frames;
pub mod job;
pub mod layout;
pub mod progress;
pub mod tools;
pub mod trainer;

pub use artifacts::{
    make_artifact, read_manifest, scan_splats, sha256_file, write_manifest, ArtifactKind,
    PipelineArtifact, PipelineManifest,
};
pub use brush::{launch_viewer, BrushTrainer};
pub use colmap::reconstruct;
pub use defaults::{training_defaults, TrainingDefaults};
pub use driver::{PipelineDriver, PipelineReport};
pub use error::{PipelineError, PipelineResult};
pub use frames::{count_frames, extract, resize};
pub use job::{ExtractionSettings, JobId, JobSpec, MatcherKind, SkipStages, TrainingSettings};
pub use layout::WorkspaceLayout;
pub use progress::{
    NullProgressSink, PipelineStage, ProgressEvent, ProgressSink, StdoutProgressSink,
};
pub use tools::{check_tools, find_brush, required_for, ExternalTool, BRUSH_PATH_ENV};
pub use trainer::{RemoteTrainer, Trainer, TrainingOutcome, TrainingPlan};
