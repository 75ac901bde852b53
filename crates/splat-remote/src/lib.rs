//! Splat Remote
//!
//! Remote GPU training dispatch for the splat pipeline:
//! - Persisting the remote host configuration (`RemoteConfig`)
//! - SSH command execution and file transfer (`Transport`)
//! - The single-job dispatch protocol (`dispatch_training`)
//! - The worker wrapper command contract (`wrapper_command`)

pub mod config;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod transport;
pub mod worker;

pub use config::{
    resolve_target, RemoteConfig, RemoteConfigStore, RemoteTarget, RemoteTargetFlags,
};
pub use dispatch::{dispatch_training, DispatchReport, DispatchRequest};
pub use error::{RemoteError, RemoteResult, TransferDirection};
pub use session::RemoteSession;
pub use transport::{MockTransport, OpenSshTransport, RemoteOutput, Transport, TransportCall};
pub use worker::wrapper_command;
