//! Insertion-ordered table of worker runtimes.
//!
//! One [`WorkerRuntime`] per spec, created at startup regardless of current
//! enablement and destroyed only at supervisor shutdown. Order matters only
//! for display/snapshots, never for correctness.

use tracing::warn;

use crate::messaging::{ManagerStateSnapshot, WorkerState};
use crate::workers::{EnablePolicy, WorkerSpec};

/// Mutable per-worker state, owned exclusively by the reconciler.
pub struct WorkerRuntime {
    pub(crate) worker: Box<dyn crate::workers::Worker>,
    pub(crate) policy: EnablePolicy,
    /// Current run intent, as of the last reconcile pass.
    pub(crate) should_run: bool,
    /// Last observed liveness, as of the last reconcile pass.
    pub(crate) last_alive: bool,
}

impl WorkerRuntime {
    pub fn name(&self) -> &str {
        self.worker.name()
    }

    pub fn should_run(&self) -> bool {
        self.should_run
    }

    pub fn last_alive(&self) -> bool {
        self.last_alive
    }
}

/// The full worker fleet, in catalog order.
pub struct WorkerRegistry {
    entries: Vec<WorkerRuntime>,
}

impl WorkerRegistry {
    /// Instantiates one runtime per spec, all initially stopped.
    pub fn new(specs: Vec<WorkerSpec>) -> Self {
        let entries = specs
            .into_iter()
            .map(|spec| WorkerRuntime {
                worker: spec.worker,
                policy: spec.policy,
                should_run: false,
                last_alive: false,
            })
            .collect();
        Self { entries }
    }

    /// Runs every worker's `prepare` step once. Failures are logged and do not
    /// block the other workers or the loop.
    pub async fn prepare_all(&mut self) {
        for rt in &mut self.entries {
            if let Err(e) = rt.worker.prepare().await {
                warn!(worker = rt.worker.name(), error = %e, "prepare failed");
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkerRuntime> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut WorkerRuntime> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the heartbeat snapshot from the state recorded by the most
    /// recent reconcile pass.
    pub fn snapshot(&self) -> ManagerStateSnapshot {
        ManagerStateSnapshot {
            workers: self
                .entries
                .iter()
                .map(|rt| WorkerState {
                    name: rt.worker.name().to_string(),
                    pid: rt.worker.pid(),
                    exit_code: rt.worker.exit_code(),
                    should_run: rt.should_run,
                    running: rt.last_alive,
                })
                .collect(),
        }
    }
}
