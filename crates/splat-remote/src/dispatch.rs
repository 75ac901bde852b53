//! Single-job remote training dispatch.
//!
//! The protocol is deliberately small and strictly ordered: create the
//! remote job directory, upload the prepared frames, run the worker wrapper
//! to completion, then retrieve `.ply` artifacts. A failed wrapper means no
//! download happens; whatever the worker produced stays on the remote host
//! for inspection. There are no retries and no resume.

use crate::config::RemoteTarget;
use crate::error::{RemoteError, RemoteResult};
use crate::session::RemoteSession;
use crate::worker;
use std::path::{Path, PathBuf};

/// Artifact locations tried in order after a clean training exit. Workers
/// differ in where they export, so misses are expected and skipped.
const ARTIFACT_PATTERNS: &[&str] = &["output/*.ply", "*.ply", "output/**/*.ply"];

/// Inputs for one dispatch.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// Job identifier; also names the directory under the remote jobs root.
    pub job_id: String,
    /// Local directory of prepared frames to upload.
    pub images_dir: PathBuf,
    /// Local workspace that artifacts are downloaded into.
    pub workspace: PathBuf,
    /// Training iterations forwarded to the worker.
    pub steps: u32,
}

/// What a completed dispatch produced.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub job_id: String,
    pub remote_job_dir: String,
    /// Retrieved `.ply` files, sorted by name. May be empty when the worker
    /// exported nothing matching the known patterns.
    pub artifacts: Vec<PathBuf>,
}

/// Runs the full dispatch protocol for one job over an established session.
///
/// # Errors
/// Returns the first connection, command, or transfer error; a non-zero
/// worker exit surfaces as a command error before any download is attempted
pub async fn dispatch_training(
    session: &RemoteSession,
    target: &RemoteTarget,
    request: &DispatchRequest,
) -> RemoteResult<DispatchReport> {
    let remote_job_dir = format!("{}/{}", target.remote_path, request.job_id);
    tracing::info!(
        "dispatching {} to {} ({} steps)",
        request.job_id,
        session.endpoint(),
        request.steps
    );

    session
        .run_checked(&worker::create_job_dir_command(&remote_job_dir))
        .await?;

    tracing::info!("uploading frames from {}", request.images_dir.display());
    session
        .upload(&request.images_dir, &format!("{remote_job_dir}/images/"))
        .await?;

    let command = worker::wrapper_command(&remote_job_dir, &target.train_script, request.steps);
    tracing::info!("running remote training: {command}");
    session.run_checked(&command).await?;

    let artifacts = retrieve_artifacts(session, &remote_job_dir, &request.workspace).await?;
    if artifacts.is_empty() {
        tracing::warn!("remote training finished but no .ply artifacts were retrieved");
    } else {
        tracing::info!("retrieved {} artifact(s)", artifacts.len());
    }

    Ok(DispatchReport {
        job_id: request.job_id.clone(),
        remote_job_dir,
        artifacts,
    })
}

/// Downloads artifacts after a clean exit, then lists what landed locally.
///
/// A pattern matching nothing is a transfer error from rsync's point of
/// view and is skipped; a broken connection aborts the job.
async fn retrieve_artifacts(
    session: &RemoteSession,
    remote_job_dir: &str,
    workspace: &Path,
) -> RemoteResult<Vec<PathBuf>> {
    for pattern in ARTIFACT_PATTERNS {
        let remote = format!("{remote_job_dir}/{pattern}");
        match session.download(&remote, workspace).await {
            Ok(()) => {}
            Err(RemoteError::Transfer { .. }) => {
                tracing::debug!("no artifacts under {remote}");
            }
            Err(e) => return Err(e),
        }
    }
    local_splats(workspace)
}

fn local_splats(workspace: &Path) -> RemoteResult<Vec<PathBuf>> {
    let mut splats = Vec::new();
    for entry in std::fs::read_dir(workspace)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "ply") {
            splats.push(path);
        }
    }
    splats.sort();
    Ok(splats)
}
