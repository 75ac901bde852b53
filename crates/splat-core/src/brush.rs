//! Local training with the Brush trainer.

use crate::error::{PipelineError, PipelineResult};
use crate::job::JobSpec;
use crate::layout::WorkspaceLayout;
use crate::trainer::{Trainer, TrainingOutcome, TrainingPlan};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Backend that runs the Brush binary against the local workspace.
pub struct BrushTrainer {
    binary: PathBuf,
}

impl BrushTrainer {
    #[must_use]
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn build_args(workspace: &Path, job: &JobSpec, plan: &TrainingPlan) -> Vec<String> {
        let workspace = workspace.to_string_lossy().to_string();
        let mut args = vec![
            workspace.clone(),
            "--total-steps".to_string(),
            plan.steps.to_string(),
            "--refine-every".to_string(),
            plan.refine_every.to_string(),
            "--sh-degree".to_string(),
            job.training.sh_degree.to_string(),
            "--export-every".to_string(),
            job.training.export_every.to_string(),
            "--export-path".to_string(),
            workspace,
            "--max-resolution".to_string(),
            plan.max_resolution.to_string(),
        ];
        if job.training.with_viewer {
            args.push("--with-viewer".to_string());
        }
        args
    }
}

#[async_trait]
impl Trainer for BrushTrainer {
    fn id(&self) -> &'static str {
        "brush"
    }

    async fn train(
        &self,
        job: &JobSpec,
        layout: &WorkspaceLayout,
        plan: &TrainingPlan,
    ) -> PipelineResult<TrainingOutcome> {
        let args = Self::build_args(layout.root(), job, plan);
        tracing::info!(
            "training with {} ({} steps, refine every {})",
            self.binary.display(),
            plan.steps,
            plan.refine_every
        );
        tracing::debug!("{} {}", self.binary.display(), args.join(" "));

        // Streams training output; with the viewer enabled this blocks
        // until the window is closed.
        let status = Command::new(&self.binary).args(&args).status().await?;
        if !status.success() {
            return Err(PipelineError::ToolFailed {
                tool: "brush".to_string(),
                exit_code: status.code().unwrap_or(-1),
                stderr: String::new(),
            });
        }
        Ok(TrainingOutcome::default())
    }
}

/// Opens the viewer on a finished workspace. Fire-and-forget: the viewer
/// outlives the pipeline and its exit is not our business.
///
/// # Errors
/// Returns the spawn error when the binary cannot be started
pub fn launch_viewer(binary: &Path, workspace: &Path) -> PipelineResult<()> {
    tracing::info!("opening viewer on {}", workspace.display());
    std::process::Command::new(binary).arg(workspace).spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> TrainingPlan {
        TrainingPlan {
            steps: 30000,
            refine_every: 200,
            max_resolution: 1600,
        }
    }

    #[test]
    fn test_build_args_full_set() {
        let job = JobSpec::new(PathBuf::from("clip.mp4"), PathBuf::from("/work"));
        let args = BrushTrainer::build_args(Path::new("/work"), &job, &plan());

        assert_eq!(args[0], "/work");
        let joined = args.join(" ");
        assert!(joined.contains("--total-steps 30000"));
        assert!(joined.contains("--refine-every 200"));
        assert!(joined.contains("--sh-degree 3"));
        assert!(joined.contains("--export-every 5000"));
        assert!(joined.contains("--export-path /work"));
        assert!(joined.contains("--max-resolution 1600"));
        assert!(joined.ends_with("--with-viewer"));
    }

    #[test]
    fn test_build_args_headless() {
        let mut job = JobSpec::new(PathBuf::from("clip.mp4"), PathBuf::from("/work"));
        job.training.with_viewer = false;
        let args = BrushTrainer::build_args(Path::new("/work"), &job, &plan());
        assert!(!args.contains(&"--with-viewer".to_string()));
    }
}
