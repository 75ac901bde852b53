use crate::error::{PipelineError, PipelineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identifier for a pipeline job. Doubles as the directory name for the
/// job on a remote host, so it stays shell-safe: `job_<unix_timestamp>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    #[must_use]
    pub fn new() -> Self {
        Self(format!("job_{}", Utc::now().timestamp()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// How frames are pulled out of the source video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSettings {
    /// Frames per second sampled from the video.
    pub fps: f64,
    /// Longest-edge cap applied when downscaling frames.
    pub resolution: u32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self { fps: 2.0, resolution: 1600 }
    }
}

/// COLMAP feature matching strategy.
///
/// Sequential matching suits video (neighbors overlap); exhaustive
/// matching compares every pair and suits unordered photo sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    #[default]
    Sequential,
    Exhaustive,
}

impl MatcherKind {
    /// The COLMAP subcommand implementing this strategy.
    #[must_use]
    pub const fn colmap_subcommand(self) -> &'static str {
        match self {
            Self::Sequential => "sequential_matcher",
            Self::Exhaustive => "exhaustive_matcher",
        }
    }
}

impl std::fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::Exhaustive => f.write_str("exhaustive"),
        }
    }
}

/// Training knobs. `steps: None` means pick from the frame count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSettings {
    pub steps: Option<u32>,
    /// Spherical harmonics degree (0-3).
    pub sh_degree: u8,
    /// Export a `.ply` checkpoint every this many steps.
    pub export_every: u32,
    /// Show the trainer's viewer window during local training.
    pub with_viewer: bool,
    /// Explicit Brush binary, bypassing discovery.
    pub brush_path: Option<PathBuf>,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            steps: None,
            sh_degree: 3,
            export_every: 5000,
            with_viewer: true,
            brush_path: None,
        }
    }
}

/// Stages the caller asked to skip, reusing whatever is already in the
/// workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipStages {
    pub extract: bool,
    pub colmap: bool,
    pub training: bool,
}

/// Everything one pipeline run needs. Built fresh per invocation and never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    pub id: JobId,
    pub created_at: DateTime<Utc>,
    pub video_path: PathBuf,
    pub output_dir: PathBuf,
    pub extraction: ExtractionSettings,
    pub matcher: MatcherKind,
    pub training: TrainingSettings,
    pub skip: SkipStages,
}

impl JobSpec {
    #[must_use]
    pub fn new(video_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            id: JobId::new(),
            created_at: Utc::now(),
            video_path,
            output_dir,
            extraction: ExtractionSettings::default(),
            matcher: MatcherKind::default(),
            training: TrainingSettings::default(),
            skip: SkipStages::default(),
        }
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !self.extraction.fps.is_finite() || self.extraction.fps <= 0.0 {
            return Err(PipelineError::InvalidJob("fps must be > 0".to_string()));
        }
        if self.extraction.resolution < 64 {
            return Err(PipelineError::InvalidJob(
                "resolution must be >= 64".to_string(),
            ));
        }
        if self.training.sh_degree > 3 {
            return Err(PipelineError::InvalidJob(
                "sh_degree must be between 0 and 3".to_string(),
            ));
        }
        if self.training.export_every == 0 {
            return Err(PipelineError::InvalidJob(
                "export_every must be >= 1".to_string(),
            ));
        }
        if self.training.steps == Some(0) {
            return Err(PipelineError::InvalidJob("steps must be >= 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> JobSpec {
        JobSpec::new(PathBuf::from("clip.mp4"), PathBuf::from("out"))
    }

    #[test]
    fn test_job_id_shape() {
        let id = JobId::new();
        assert!(id.as_str().starts_with("job_"));
        assert!(id.as_str()[4..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_defaults_validate() {
        assert!(spec().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fps() {
        let mut bad = spec();
        bad.extraction.fps = 0.0;
        assert!(bad.validate().is_err());

        bad.extraction.fps = f64::NAN;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_steps() {
        let mut bad = spec();
        bad.training.steps = Some(0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_high_sh_degree() {
        let mut bad = spec();
        bad.training.sh_degree = 4;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_matcher_subcommands() {
        assert_eq!(MatcherKind::Sequential.colmap_subcommand(), "sequential_matcher");
        assert_eq!(MatcherKind::Exhaustive.colmap_subcommand(), "exhaustive_matcher");
    }
}
