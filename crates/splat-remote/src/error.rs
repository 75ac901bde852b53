use std::path::PathBuf;
use thiserror::Error;

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Direction of a file transfer, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Upload,
    Download,
}

impl std::fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload => f.write_str("upload"),
            Self::Download => f.write_str("download"),
        }
    }
}

/// Errors raised by the remote dispatch layer.
///
/// `Connection` and `Command` are deliberately separate kinds: the first
/// means the host was never usable (unreachable, auth rejected), the second
/// means the host ran our command and it exited non-zero.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Missing or unusable remote configuration.
    #[error("remote configuration error: {0}")]
    Config(String),

    /// The transport could not reach or authenticate against the host.
    #[error("connection to {target} failed: {message}")]
    Connection { target: String, message: String },

    /// The remote host ran the command and it exited non-zero.
    #[error("remote command `{command}` exited with status {exit_code}{}", fmt_stderr(.stderr))]
    Command {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// A file transfer failed for a reason other than connectivity.
    #[error("{direction} transfer failed: {detail}")]
    Transfer {
        direction: TransferDirection,
        detail: String,
    },

    /// The persisted config file exists but could not be decoded.
    #[error("failed to parse remote config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Remote stderr is empty when the command streamed to the terminal.
fn fmt_stderr(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", stderr.trim())
    }
}
