//! Per-job session over a [`Transport`].

use crate::config::RemoteTarget;
use crate::error::{RemoteError, RemoteResult};
use crate::transport::{OpenSshTransport, Transport};
use std::path::Path;

/// A verified channel to the remote host, held for one job's dispatch
/// phase and dropped when that phase ends.
///
/// Construction performs a connectivity preflight; a session that exists
/// has already reached and authenticated against the host, so a
/// connection-class failure at preflight means no remote command is ever
/// issued for this job.
pub struct RemoteSession {
    transport: Box<dyn Transport>,
    endpoint: String,
}

impl RemoteSession {
    /// Opens a session to `target` over OpenSSH.
    ///
    /// # Errors
    /// Returns a connection error if the preflight check fails
    pub async fn connect(target: &RemoteTarget) -> RemoteResult<Self> {
        Self::with_transport(Box::new(OpenSshTransport::new(target)), target.endpoint()).await
    }

    /// Opens a session over an explicit transport (used by tests).
    ///
    /// # Errors
    /// Returns a connection error if the preflight check fails
    pub async fn with_transport(
        transport: Box<dyn Transport>,
        endpoint: String,
    ) -> RemoteResult<Self> {
        transport.check().await?;
        tracing::debug!("remote session established with {endpoint}");
        Ok(Self { transport, endpoint })
    }

    /// `user@host` this session is connected to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Runs a remote command, turning a non-zero exit into an error.
    ///
    /// # Errors
    /// Returns a command error for non-zero remote exits, or a connection
    /// error if the channel breaks
    pub async fn run_checked(&self, command: &str) -> RemoteResult<()> {
        let output = self.transport.run(command).await?;
        if output.success() {
            return Ok(());
        }
        Err(RemoteError::Command {
            command: command.to_string(),
            exit_code: output.exit_code,
            stderr: output.stderr,
        })
    }

    /// Uploads a local file or directory's contents to a remote path.
    ///
    /// # Errors
    /// Returns a connection or transfer error if the copy fails
    pub async fn upload(&self, local: &Path, remote: &str) -> RemoteResult<()> {
        self.transport.upload(local, remote).await
    }

    /// Downloads remote files matching `remote` into a local directory.
    ///
    /// # Errors
    /// Returns a connection or transfer error if the copy fails
    pub async fn download(&self, remote: &str, local: &Path) -> RemoteResult<()> {
        self.transport.download(remote, local).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, TransportCall};

    #[tokio::test]
    async fn test_connect_runs_preflight_first() {
        let transport = std::sync::Arc::new(MockTransport::new());
        let session = RemoteSession::with_transport(
            Box::new(transport.clone()),
            "alice@10.0.0.5".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(session.endpoint(), "alice@10.0.0.5");
        assert_eq!(transport.calls(), vec![TransportCall::Check]);
    }

    #[tokio::test]
    async fn test_failed_preflight_never_yields_a_session() {
        let transport = MockTransport::new().with_check_error(RemoteError::Connection {
            target: "alice@10.0.0.5".to_string(),
            message: "Connection timed out".to_string(),
        });
        let result =
            RemoteSession::with_transport(Box::new(transport), "alice@10.0.0.5".to_string()).await;
        assert!(matches!(result, Err(RemoteError::Connection { .. })));
    }

    #[tokio::test]
    async fn test_run_checked_maps_nonzero_exit_to_command_error() {
        let transport = MockTransport::new().with_run_exit(9);
        let session =
            RemoteSession::with_transport(Box::new(transport), "alice@10.0.0.5".to_string())
                .await
                .unwrap();

        match session.run_checked("python train.py").await {
            Err(RemoteError::Command {
                command, exit_code, ..
            }) => {
                assert_eq!(command, "python train.py");
                assert_eq!(exit_code, 9);
            }
            other => panic!("expected Command error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_checked_passes_zero_exit() {
        let transport = MockTransport::new();
        let session =
            RemoteSession::with_transport(Box::new(transport), "alice@10.0.0.5".to_string())
                .await
                .unwrap();
        session.run_checked("mkdir -p /c/splat/jobs/job_1").await.unwrap();
    }
}
