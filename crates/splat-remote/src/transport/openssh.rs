//! OpenSSH client based transport.

use super::{RemoteOutput, Transport};
use crate::config::RemoteTarget;
use crate::error::{RemoteError, RemoteResult, TransferDirection};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Exit status the OpenSSH client reserves for its own failures
/// (unreachable host, rejected key). Remote commands report any other code.
const SSH_CONNECTION_EXIT: i32 = 255;

/// No-op command used to verify connectivity before a job starts.
const PREFLIGHT_COMMAND: &str = "echo splat-ok";

/// Transport that shells out to `ssh` and `rsync`.
///
/// Authentication is identity-based only: `BatchMode=yes` is always passed
/// so a missing or rejected key fails fast instead of prompting for a
/// password mid-pipeline.
pub struct OpenSshTransport {
    endpoint: String,
    key_path: Option<PathBuf>,
    ssh_program: PathBuf,
    rsync_program: PathBuf,
}

impl OpenSshTransport {
    /// Creates a transport for the resolved target using the `ssh` and
    /// `rsync` binaries on `PATH`.
    #[must_use]
    pub fn new(target: &RemoteTarget) -> Self {
        Self::with_programs(target, "ssh", "rsync")
    }

    /// Creates a transport with explicit client binaries (used by tests to
    /// substitute fakes).
    #[must_use]
    pub fn with_programs(
        target: &RemoteTarget,
        ssh: impl Into<PathBuf>,
        rsync: impl Into<PathBuf>,
    ) -> Self {
        Self {
            endpoint: target.endpoint(),
            key_path: target.key_path.clone(),
            ssh_program: ssh.into(),
            rsync_program: rsync.into(),
        }
    }

    /// Options shared by every ssh invocation, including the one rsync makes.
    fn ssh_options(&self) -> Vec<String> {
        let mut options = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "ConnectTimeout=10".to_string(),
        ];
        if let Some(key) = &self.key_path {
            options.push("-i".to_string());
            options.push(key.to_string_lossy().to_string());
        }
        options
    }

    /// Builds the full argument list for `ssh <options> <endpoint> <command>`.
    fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = self.ssh_options();
        args.push(self.endpoint.clone());
        args.push(command.to_string());
        args
    }

    /// The `-e` value handed to rsync so transfers use the same ssh options.
    fn remote_shell(&self) -> String {
        let mut shell = "ssh".to_string();
        for option in self.ssh_options() {
            shell.push(' ');
            shell.push_str(&option);
        }
        shell
    }

    /// Builds the argument list for `rsync -az -e <shell> <from> <to>`.
    fn transfer_args(&self, from: &str, to: &str) -> Vec<String> {
        vec![
            "-az".to_string(),
            "-e".to_string(),
            self.remote_shell(),
            from.to_string(),
            to.to_string(),
        ]
    }

    fn connection_error(&self, message: impl Into<String>) -> RemoteError {
        RemoteError::Connection {
            target: self.endpoint.clone(),
            message: message.into(),
        }
    }

    async fn transfer(
        &self,
        direction: TransferDirection,
        from: &str,
        to: &str,
    ) -> RemoteResult<()> {
        tracing::debug!("rsync {from} -> {to}");
        let output = Command::new(&self.rsync_program)
            .args(self.transfer_args(from, to))
            .output()
            .await
            .map_err(|e| {
                self.connection_error(format!(
                    "failed to start {}: {e}",
                    self.rsync_program.display()
                ))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let exit_code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if exit_code == SSH_CONNECTION_EXIT {
            return Err(self.connection_error(if stderr.is_empty() {
                "connection closed during transfer".to_string()
            } else {
                stderr
            }));
        }
        Err(RemoteError::Transfer {
            direction,
            detail: format!("rsync exited with status {exit_code}: {stderr}"),
        })
    }
}

#[async_trait]
impl Transport for OpenSshTransport {
    async fn check(&self) -> RemoteResult<()> {
        tracing::debug!("preflight ssh check against {}", self.endpoint);
        let output = Command::new(&self.ssh_program)
            .args(self.ssh_args(PREFLIGHT_COMMAND))
            .output()
            .await
            .map_err(|e| {
                self.connection_error(format!(
                    "failed to start {}: {e}",
                    self.ssh_program.display()
                ))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let exit_code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(self.connection_error(if stderr.is_empty() {
            format!("preflight check exited with status {exit_code}")
        } else {
            stderr
        }))
    }

    async fn run(&self, command: &str) -> RemoteResult<RemoteOutput> {
        tracing::debug!("ssh {}: {command}", self.endpoint);
        // Stdio is inherited so long-running remote commands stay visible.
        let status = Command::new(&self.ssh_program)
            .args(self.ssh_args(command))
            .status()
            .await
            .map_err(|e| {
                self.connection_error(format!(
                    "failed to start {}: {e}",
                    self.ssh_program.display()
                ))
            })?;

        let exit_code = status.code().unwrap_or(-1);
        if exit_code == SSH_CONNECTION_EXIT {
            return Err(self.connection_error(
                "ssh exited with status 255 (unreachable host or rejected key)",
            ));
        }

        Ok(RemoteOutput {
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    async fn upload(&self, local: &Path, remote: &str) -> RemoteResult<()> {
        // Trailing slash makes rsync copy a directory's contents rather
        // than the directory itself.
        let mut from = local.to_string_lossy().to_string();
        if local.is_dir() && !from.ends_with('/') {
            from.push('/');
        }
        let to = format!("{}:{remote}", self.endpoint);
        self.transfer(TransferDirection::Upload, &from, &to).await
    }

    async fn download(&self, remote: &str, local: &Path) -> RemoteResult<()> {
        let from = format!("{}:{remote}", self.endpoint);
        let to = local.to_string_lossy().to_string();
        self.transfer(TransferDirection::Download, &from, &to).await
    }
}
