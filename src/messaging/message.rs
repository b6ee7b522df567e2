//! Bus message types and the published heartbeat snapshot.

use serde::{Deserialize, Serialize};

/// A message on the shared bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    /// Externally observed vehicle state; `started` is the onroad flag.
    DeviceState { started: bool },
    /// Car parameter blob, passed through read-only into reconciliation context.
    CarParams { raw: String },
    /// Supervisor heartbeat, published once per control-loop tick.
    ManagerState(ManagerStateSnapshot),
}

/// Health of one worker as observed by the supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerState {
    /// Worker name (unique).
    pub name: String,
    /// OS pid of the underlying process, if any.
    pub pid: Option<u32>,
    /// Exit code of the last terminated process, if any.
    pub exit_code: Option<i32>,
    /// Whether the reconciler currently wants this worker running.
    pub should_run: bool,
    /// Last observed liveness.
    pub running: bool,
}

/// Heartbeat snapshot: every worker in registry order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerStateSnapshot {
    pub workers: Vec<WorkerState>,
}

impl ManagerStateSnapshot {
    /// Looks up a worker entry by name.
    pub fn worker(&self, name: &str) -> Option<&WorkerState> {
        self.workers.iter().find(|w| w.name == name)
    }
}
