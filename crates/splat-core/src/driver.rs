use crate::artifacts::{
    make_artifact, scan_splats, write_manifest, ArtifactKind, PipelineArtifact, PipelineManifest,
};
use crate::colmap;
use crate::defaults::training_defaults;
use crate::error::{PipelineError, PipelineResult};
use crate::frames;
use crate::job::{JobId, JobSpec};
use crate::layout::WorkspaceLayout;
use crate::progress::{PipelineStage, ProgressEvent, ProgressSink};
use crate::tools::{check_tools, required_for};
use crate::trainer::{Trainer, TrainingPlan};
use chrono::Utc;
use std::path::PathBuf;

/// What a finished pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub job_id: JobId,
    pub frame_count: usize,
    pub steps: u32,
    /// `false` when training was skipped.
    pub trained: bool,
    /// Set when a remote worker ran the training.
    pub remote_job_dir: Option<String>,
    pub artifacts: Vec<PipelineArtifact>,
    pub manifest_path: PathBuf,
}

/// Runs a capture job end to end: frame extraction, camera pose
/// estimation, splat training, and artifact collection.
///
/// The driver owns the stage ordering and skip logic; the actual
/// training backend is pluggable through [`Trainer`].
pub struct PipelineDriver {
    job: JobSpec,
    trainer: Option<Box<dyn Trainer>>,
}

impl PipelineDriver {
    #[must_use]
    pub fn new(job: JobSpec) -> Self {
        Self { job, trainer: None }
    }

    #[must_use]
    pub fn with_trainer(mut self, trainer: Box<dyn Trainer>) -> Self {
        self.trainer = Some(trainer);
        self
    }

    #[must_use]
    pub fn job(&self) -> &JobSpec {
        &self.job
    }

    /// Runs every stage the job has not marked as skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the job is invalid, the input video or extracted
    /// frames are missing, a required tool is unavailable, or any stage's
    /// external process fails. The manifest is only written when every
    /// preceding stage succeeded.
    pub async fn run(&self, sink: &dyn ProgressSink) -> PipelineResult<PipelineReport> {
        let job = &self.job;
        job.validate()?;

        // Input problems are reported before tool probes so a missing video
        // does not surface as a missing dependency.
        if !job.skip.extract && !job.video_path.exists() {
            return Err(PipelineError::VideoNotFound(job.video_path.clone()));
        }

        let layout = WorkspaceLayout::new(&job.output_dir);
        std::fs::create_dir_all(layout.root()).map_err(|source| PipelineError::OutputDir {
            path: job.output_dir.clone(),
            source,
        })?;

        check_tools(&required_for(job)).await?;

        let frame_count = self.extract_stage(&layout, sink).await?;
        if frame_count == 0 {
            return Err(PipelineError::MissingFrames(layout.images_dir()));
        }

        self.poses_stage(&layout, sink).await?;

        let defaults = training_defaults(frame_count);
        let steps = job.training.steps.unwrap_or(defaults.steps);
        let plan = TrainingPlan {
            steps,
            refine_every: defaults.refine_every,
            max_resolution: job.extraction.resolution,
        };

        let (trained, remote_job_dir) = self.train_stage(&layout, &plan, sink).await?;

        let artifacts =
            self.collect_stage(&layout, frame_count, steps, remote_job_dir.as_deref(), sink)?;
        if trained && artifacts.is_empty() {
            sink.on_event(ProgressEvent::Note {
                message: "no .ply exports found in the workspace; training may not have finished"
                    .to_string(),
            });
        }

        Ok(PipelineReport {
            job_id: job.id.clone(),
            frame_count,
            steps,
            trained,
            remote_job_dir,
            artifacts,
            manifest_path: layout.manifest_path(),
        })
    }

    async fn extract_stage(
        &self,
        layout: &WorkspaceLayout,
        sink: &dyn ProgressSink,
    ) -> PipelineResult<usize> {
        let job = &self.job;

        if job.skip.extract {
            sink.on_event(ProgressEvent::StageSkipped {
                stage: PipelineStage::Extract,
                reason: "using existing frames".to_string(),
            });
            sink.on_event(ProgressEvent::StageSkipped {
                stage: PipelineStage::Resize,
                reason: "using existing frames".to_string(),
            });
            let images = layout.images_dir();
            if !images.is_dir() {
                return Err(PipelineError::MissingFrames(images));
            }
            return frames::count_frames(&images);
        }

        sink.on_event(ProgressEvent::StageStarted {
            stage: PipelineStage::Extract,
            detail: format!("{} at {} fps", job.video_path.display(), job.extraction.fps),
        });
        let count = frames::extract(&job.video_path, layout, job.extraction.fps).await?;
        sink.on_event(ProgressEvent::StageFinished {
            stage: PipelineStage::Extract,
            detail: format!("{count} frames"),
        });

        sink.on_event(ProgressEvent::StageStarted {
            stage: PipelineStage::Resize,
            detail: format!("max dimension {} px", job.extraction.resolution),
        });
        frames::resize(layout, job.extraction.resolution).await?;
        sink.on_event(ProgressEvent::StageFinished {
            stage: PipelineStage::Resize,
            detail: format!("originals kept in {}", layout.originals_dir().display()),
        });

        Ok(count)
    }

    async fn poses_stage(
        &self,
        layout: &WorkspaceLayout,
        sink: &dyn ProgressSink,
    ) -> PipelineResult<()> {
        if self.job.skip.colmap {
            sink.on_event(ProgressEvent::StageSkipped {
                stage: PipelineStage::Poses,
                reason: "using existing reconstruction".to_string(),
            });
            return Ok(());
        }

        sink.on_event(ProgressEvent::StageStarted {
            stage: PipelineStage::Poses,
            detail: format!("{} matching", self.job.matcher),
        });
        colmap::reconstruct(layout, self.job.matcher).await?;
        sink.on_event(ProgressEvent::StageFinished {
            stage: PipelineStage::Poses,
            detail: format!("sparse models in {}", layout.sparse_dir().display()),
        });
        Ok(())
    }

    async fn train_stage(
        &self,
        layout: &WorkspaceLayout,
        plan: &TrainingPlan,
        sink: &dyn ProgressSink,
    ) -> PipelineResult<(bool, Option<String>)> {
        if self.job.skip.training {
            sink.on_event(ProgressEvent::StageSkipped {
                stage: PipelineStage::Train,
                reason: "data prepared for a later run".to_string(),
            });
            return Ok((false, None));
        }

        let trainer = self.trainer.as_ref().ok_or_else(|| {
            PipelineError::InvalidJob("training requested but no backend configured".to_string())
        })?;

        sink.on_event(ProgressEvent::StageStarted {
            stage: PipelineStage::Train,
            detail: format!("{} backend, {} steps", trainer.id(), plan.steps),
        });
        let outcome = trainer.train(&self.job, layout, plan).await?;
        sink.on_event(ProgressEvent::StageFinished {
            stage: PipelineStage::Train,
            detail: format!("{} steps", plan.steps),
        });
        Ok((true, outcome.remote_job_dir))
    }

    fn collect_stage(
        &self,
        layout: &WorkspaceLayout,
        frame_count: usize,
        steps: u32,
        remote_job_dir: Option<&str>,
        sink: &dyn ProgressSink,
    ) -> PipelineResult<Vec<PipelineArtifact>> {
        sink.on_event(ProgressEvent::StageStarted {
            stage: PipelineStage::Collect,
            detail: layout.root().display().to_string(),
        });

        let mut artifacts = Vec::new();
        for splat in scan_splats(layout.root())? {
            artifacts.push(make_artifact(ArtifactKind::Splat, splat)?);
        }

        let manifest = PipelineManifest {
            job_id: self.job.id.clone(),
            created_at: Utc::now(),
            video: self.job.video_path.clone(),
            frame_count,
            steps,
            remote: remote_job_dir.is_some(),
            artifacts: artifacts.clone(),
        };
        write_manifest(&layout.manifest_path(), &manifest)?;

        sink.on_event(ProgressEvent::StageFinished {
            stage: PipelineStage::Collect,
            detail: format!("{} splat file(s)", artifacts.len()),
        });
        Ok(artifacts)
    }
}
