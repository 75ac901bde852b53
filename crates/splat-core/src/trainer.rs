use crate::error::PipelineResult;
use crate::job::JobSpec;
use crate::layout::WorkspaceLayout;
use async_trait::async_trait;
use splat_remote::{dispatch_training, DispatchRequest, RemoteSession, RemoteTarget};

/// Resolved parameters for one training run, after smart defaults and
/// explicit flags have been merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingPlan {
    pub steps: u32,
    pub refine_every: u32,
    /// Longest-edge cap the trainer may assume for input frames.
    pub max_resolution: u32,
}

/// What a training backend left behind.
#[derive(Debug, Clone, Default)]
pub struct TrainingOutcome {
    /// Job directory on the remote host, when training ran there.
    pub remote_job_dir: Option<String>,
}

/// A training backend: local Brush or dispatch to a remote GPU host.
#[async_trait]
pub trait Trainer: Send + Sync {
    fn id(&self) -> &'static str;

    /// Trains on the prepared workspace, blocking until done.
    ///
    /// # Errors
    /// Returns an error when training fails; exports already written stay
    /// in the workspace
    async fn train(
        &self,
        job: &JobSpec,
        layout: &WorkspaceLayout,
        plan: &TrainingPlan,
    ) -> PipelineResult<TrainingOutcome>;
}

// Lets callers hand the driver a boxed trainer while keeping their own
// handle, which the driver tests use to inspect recorded plans.
#[async_trait]
impl<T: Trainer + ?Sized> Trainer for std::sync::Arc<T> {
    fn id(&self) -> &'static str {
        (**self).id()
    }

    async fn train(
        &self,
        job: &JobSpec,
        layout: &WorkspaceLayout,
        plan: &TrainingPlan,
    ) -> PipelineResult<TrainingOutcome> {
        (**self).train(job, layout, plan).await
    }
}

/// Backend that ships the job to a remote GPU host over SSH.
///
/// The remote worker runs its own COLMAP pass and the trainer, then
/// exports land back in the local workspace. One session per job; it is
/// dropped as soon as training ends.
pub struct RemoteTrainer {
    target: RemoteTarget,
}

impl RemoteTrainer {
    #[must_use]
    pub fn new(target: RemoteTarget) -> Self {
        Self { target }
    }

    #[must_use]
    pub fn target(&self) -> &RemoteTarget {
        &self.target
    }
}

#[async_trait]
impl Trainer for RemoteTrainer {
    fn id(&self) -> &'static str {
        "remote"
    }

    async fn train(
        &self,
        job: &JobSpec,
        layout: &WorkspaceLayout,
        plan: &TrainingPlan,
    ) -> PipelineResult<TrainingOutcome> {
        let session = RemoteSession::connect(&self.target).await?;
        let request = DispatchRequest {
            job_id: job.id.to_string(),
            images_dir: layout.images_dir(),
            workspace: layout.root().to_path_buf(),
            steps: plan.steps,
        };
        let report = dispatch_training(&session, &self.target, &request).await?;
        Ok(TrainingOutcome {
            remote_job_dir: Some(report.remote_job_dir),
        })
    }
}
