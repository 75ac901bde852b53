//! Recording transport double for tests.

use super::{RemoteOutput, Transport};
use crate::error::{RemoteError, RemoteResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One recorded [`Transport`] call, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Check,
    Run(String),
    Upload { local: PathBuf, remote: String },
    Download { remote: String, local: PathBuf },
}

/// Transport that records every call and replays scripted results.
///
/// Unscripted calls succeed: `run` reports exit 0, transfers complete. Use
/// the `with_*` builders to queue failures or specific remote exits.
#[derive(Default)]
pub struct MockTransport {
    calls: Mutex<Vec<TransportCall>>,
    check_errors: Mutex<VecDeque<RemoteError>>,
    run_results: Mutex<VecDeque<RemoteResult<RemoteOutput>>>,
    upload_errors: Mutex<VecDeque<RemoteError>>,
    download_errors: Mutex<VecDeque<RemoteError>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an error for the next `check` call.
    #[must_use]
    pub fn with_check_error(self, error: RemoteError) -> Self {
        self.check_errors.lock().expect("mock poisoned").push_back(error);
        self
    }

    /// Queues a result for the next `run` call.
    #[must_use]
    pub fn with_run_result(self, result: RemoteResult<RemoteOutput>) -> Self {
        self.run_results.lock().expect("mock poisoned").push_back(result);
        self
    }

    /// Queues a successful `run` that exits with `code`.
    #[must_use]
    pub fn with_run_exit(self, code: i32) -> Self {
        self.with_run_result(Ok(RemoteOutput {
            exit_code: code,
            ..RemoteOutput::default()
        }))
    }

    /// Queues an error for the next `upload` call.
    #[must_use]
    pub fn with_upload_error(self, error: RemoteError) -> Self {
        self.upload_errors.lock().expect("mock poisoned").push_back(error);
        self
    }

    /// Queues an error for the next `download` call.
    #[must_use]
    pub fn with_download_error(self, error: RemoteError) -> Self {
        self.download_errors.lock().expect("mock poisoned").push_back(error);
        self
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().expect("mock poisoned").clone()
    }

    /// Just the commands passed to `run`, in order.
    #[must_use]
    pub fn run_commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::Run(command) => Some(command),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().expect("mock poisoned").push(call);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn check(&self) -> RemoteResult<()> {
        self.record(TransportCall::Check);
        match self.check_errors.lock().expect("mock poisoned").pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn run(&self, command: &str) -> RemoteResult<RemoteOutput> {
        self.record(TransportCall::Run(command.to_string()));
        self.run_results
            .lock()
            .expect("mock poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(RemoteOutput::default()))
    }

    async fn upload(&self, local: &Path, remote: &str) -> RemoteResult<()> {
        self.record(TransportCall::Upload {
            local: local.to_path_buf(),
            remote: remote.to_string(),
        });
        match self.upload_errors.lock().expect("mock poisoned").pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn download(&self, remote: &str, local: &Path) -> RemoteResult<()> {
        self.record(TransportCall::Download {
            remote: remote.to_string(),
            local: local.to_path_buf(),
        });
        match self.download_errors.lock().expect("mock poisoned").pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
