//! Error handling for the host probe crate.
//!
//! Two layers exist. [`CollectError`] is the failure a single collector can
//! report; it never escapes the aggregation layer, which degrades the affected
//! field instead. [`SystemError`] covers everything outside the snapshot path
//! (configuration, the web server, I/O during startup).

use std::io;
use std::time::Duration;

/// A specialized `Result` type for host probe operations.
pub type Result<T> = std::result::Result<T, SystemError>;

/// The main error type for host probe operations.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SystemError {
    /// Create a new web server error
    pub fn web_server_error(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Failure reported by one collector or one of its collaborators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectError {
    /// An optional collaborator is absent (accelerator library, container runtime).
    #[error("{subsystem} unavailable: {reason}")]
    SubsystemUnavailable {
        subsystem: &'static str,
        reason: String,
    },

    /// The OS refused to expose the resource.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A process exited or turned into a zombie while it was being read.
    #[error("process {pid} vanished: {reason}")]
    ProcessTransient { pid: u32, reason: String },

    /// A container stopped or was removed between listing and inspection.
    #[error("container {id} vanished: {reason}")]
    ContainerTransient { id: String, reason: String },

    /// A collaborator that should be reachable did not answer.
    #[error("cannot reach {target}: {reason}")]
    ConnectivityFailure { target: String, reason: String },

    /// The collector did not finish within its bound.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The platform has no such data source.
    #[error("not supported on this platform: {0}")]
    Unsupported(&'static str),

    /// Raw collaborator output could not be understood.
    #[error("parse error: {0}")]
    Parse(String),

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// The worker running the collector panicked or was cancelled.
    #[error("collector task failed: {0}")]
    Task(String),
}

impl CollectError {
    pub fn unavailable(subsystem: &'static str, reason: impl Into<String>) -> Self {
        Self::SubsystemUnavailable {
            subsystem,
            reason: reason.into(),
        }
    }

    pub fn connectivity(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectivityFailure {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn transient(pid: u32, reason: impl Into<String>) -> Self {
        Self::ProcessTransient {
            pid,
            reason: reason.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Classify an I/O error raised while reading `what`.
    pub fn from_io(err: io::Error, what: impl AsRef<str>) -> Self {
        let what = what.as_ref();
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(format!("{what}: {err}")),
            _ => Self::Io(format!("{what}: {err}")),
        }
    }

    /// Classify an I/O error raised while reading a file that belongs to `pid`.
    ///
    /// A missing file means the process is gone.
    pub fn from_process_io(err: io::Error, pid: u32) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::transient(pid, err.to_string()),
            io::ErrorKind::PermissionDenied => {
                Self::PermissionDenied(format!("process {pid}: {err}"))
            }
            _ => Self::Io(format!("process {pid}: {err}")),
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}
