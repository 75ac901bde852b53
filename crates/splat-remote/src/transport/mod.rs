//! Transport abstraction over the remote host.
//!
//! Every interaction with the GPU machine goes through the [`Transport`]
//! trait: a connectivity preflight, remote command execution, and file
//! transfers in both directions. The production implementation shells out
//! to the OpenSSH client tools; [`MockTransport`] records calls and replays
//! scripted results for tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use splat_remote::config::{RemoteTarget, resolve_target, RemoteTargetFlags};
//! use splat_remote::transport::{OpenSshTransport, Transport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let flags = RemoteTargetFlags {
//!     host: Some("192.168.1.100".to_string()),
//!     user: Some("kris".to_string()),
//!     ..RemoteTargetFlags::default()
//! };
//! let target = resolve_target(&flags, None)?;
//! let transport = OpenSshTransport::new(&target);
//! transport.check().await?;
//! let output = transport.run("echo ok").await?;
//! println!("remote said: {}", output.stdout);
//! # Ok(())
//! # }
//! ```

mod mock;
mod openssh;

pub use mock::{MockTransport, TransportCall};
pub use openssh::OpenSshTransport;

use crate::error::RemoteResult;
use async_trait::async_trait;
use std::path::Path;

/// Captured result of one remote command.
#[derive(Debug, Clone, Default)]
pub struct RemoteOutput {
    /// Exit code of the remote command (not of ssh itself).
    pub exit_code: i32,
    /// Captured stdout, empty when the command streamed to the terminal.
    pub stdout: String,
    /// Captured stderr, empty when the command streamed to the terminal.
    pub stderr: String,
}

impl RemoteOutput {
    /// True when the remote command exited zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Channel to the remote host.
///
/// Implementations must distinguish connection-class failures (host
/// unreachable, authentication rejected) from the remote command's own
/// non-zero exits: the former surface as `RemoteError::Connection`, the
/// latter are returned in [`RemoteOutput`] for the caller to judge.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Verifies the host is reachable and authentication works.
    ///
    /// # Errors
    /// Returns a connection error if the host cannot be reached
    async fn check(&self) -> RemoteResult<()>;

    /// Runs a shell command on the remote host, streaming its output to the
    /// local terminal, and waits for it to finish.
    ///
    /// # Errors
    /// Returns a connection error if the channel breaks; a non-zero remote
    /// exit is reported through the returned output, not as an error
    async fn run(&self, command: &str) -> RemoteResult<RemoteOutput>;

    /// Copies a local file or directory to a path on the remote host.
    ///
    /// # Errors
    /// Returns a connection or transfer error if the copy fails
    async fn upload(&self, local: &Path, remote: &str) -> RemoteResult<()>;

    /// Copies remote files matching `remote` into a local directory.
    ///
    /// # Errors
    /// Returns a connection or transfer error if the copy fails
    async fn download(&self, remote: &str, local: &Path) -> RemoteResult<()>;
}

// Lets callers share one transport between a session and their own handle,
// which the tests use to inspect recorded calls.
#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn check(&self) -> RemoteResult<()> {
        (**self).check().await
    }

    async fn run(&self, command: &str) -> RemoteResult<RemoteOutput> {
        (**self).run(command).await
    }

    async fn upload(&self, local: &Path, remote: &str) -> RemoteResult<()> {
        (**self).upload(local, remote).await
    }

    async fn download(&self, remote: &str, local: &Path) -> RemoteResult<()> {
        (**self).download(remote, local).await
    }
}
