//! Error types used by the procvisor runtime and workers.
//!
//! Three enums, split by producer:
//!
//! - [`ManagerError`] — fatal errors of the supervisor itself (startup or loop).
//! - [`RegistrationError`] — device identity could not be resolved.
//! - [`WorkerError`] — a single worker failed to spawn or stop.
//!
//! Only [`ManagerError`] reaches the process exit status. [`WorkerError`]s are
//! absorbed inside the reconciler and retried on the next tick.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors of the supervisor runtime.
///
/// Startup aborts on any of these before the control loop begins; an error
/// escaping the loop body still routes through cleanup before the process exits.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ManagerError {
    /// Param store could not be opened or written.
    #[error("param store unavailable at {path}: {source}")]
    Store {
        /// Store root directory.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Device registration hard-failed (distinct from the unregistered sentinel).
    #[error("device registration failed: {0}")]
    Registration(#[from] RegistrationError),

    /// Termination-signal handlers could not be installed. Fatal at startup:
    /// a loop that cannot be stopped must never start.
    #[error("signal handler install failed: {0}")]
    SignalInstall(#[source] io::Error),
}

impl ManagerError {
    /// Short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ManagerError::Store { .. } => "store_unavailable",
            ManagerError::Registration(_) => "registration_failed",
            ManagerError::SignalInstall(_) => "signal_install_failed",
        }
    }
}

/// Device identity could not be resolved at startup.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// No identity available and none could be issued.
    #[error("no device identity for serial {serial:?}")]
    Unavailable {
        /// Hardware serial, for diagnostics.
        serial: String,
    },
}

/// Errors produced by a single worker's lifecycle operations.
///
/// These never escalate: the reconciler logs them and retries on the next tick.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker process failed to spawn.
    #[error("failed to spawn {name}: {source}")]
    Spawn {
        /// Worker name.
        name: String,
        #[source]
        source: io::Error,
    },

    /// Worker process failed to stop cleanly.
    #[error("failed to stop {name}: {source}")]
    Stop {
        /// Worker name.
        name: String,
        #[source]
        source: io::Error,
    },
}

impl WorkerError {
    /// Short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Spawn { .. } => "worker_spawn_failed",
            WorkerError::Stop { .. } => "worker_stop_failed",
        }
    }

    /// Name of the worker this error belongs to.
    pub fn worker(&self) -> &str {
        match self {
            WorkerError::Spawn { name, .. } | WorkerError::Stop { name, .. } => name,
        }
    }
}
