//! Drives the fleet toward the desired run-set, one pass per tick.
//!
//! ## Rules
//! - Desired vs. observed only: the reconciler does not distinguish "never
//!   started" from "crashed". A dead worker that should run is started again.
//! - Start is fire-and-forget; stop from the loop is non-blocking. The loop
//!   never waits on a single worker's transition.
//! - A start/stop failure on one worker never blocks the others: it is logged
//!   and retried on the next tick.
//! - Shutdown is the one place stops block: signal everyone first, then wait
//!   for each in turn (kill escalation lives inside the worker).

use tracing::{debug, info, warn};

use crate::messaging::ManagerStateSnapshot;
use crate::reconcile::DesiredState;
use crate::workers::{WorkerRegistry, WorkerSpec};

/// Owns the worker registry and converges it toward the desired run-set.
pub struct Reconciler {
    registry: WorkerRegistry,
}

impl Reconciler {
    pub fn new(specs: Vec<WorkerSpec>) -> Self {
        Self {
            registry: WorkerRegistry::new(specs),
        }
    }

    /// Access to the underlying registry (snapshots, prepare).
    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WorkerRegistry {
        &mut self.registry
    }

    /// One reconcile pass: evaluate every predicate, compare desired to
    /// observed liveness, and issue the minimal start/stop actions.
    pub async fn ensure_running(&mut self, state: &DesiredState) {
        for rt in self.registry.iter_mut() {
            let should_run = rt.policy.allows(rt.worker.name(), state);
            let alive = rt.worker.is_alive();
            rt.should_run = should_run;
            rt.last_alive = alive;

            if should_run && !alive {
                match rt.worker.start().await {
                    Ok(()) => {
                        debug!(worker = rt.worker.name(), "starting");
                        rt.last_alive = rt.worker.is_alive();
                    }
                    Err(e) => {
                        warn!(worker = e.worker(), label = e.as_label(), error = %e, "start failed, retrying next tick");
                    }
                }
            } else if !should_run && alive {
                debug!(worker = rt.worker.name(), "stopping");
                if let Err(e) = rt.worker.stop(false).await {
                    warn!(worker = e.worker(), label = e.as_label(), error = %e, "stop failed, retrying next tick");
                }
            }
        }
    }

    /// Shutdown sequence: non-blocking stop fan-out, then a blocking pass that
    /// confirms every worker actually stopped.
    pub async fn stop_all(&mut self) {
        for rt in self.registry.iter_mut() {
            if let Err(e) = rt.worker.stop(false).await {
                warn!(worker = e.worker(), error = %e, "stop signal failed");
            }
        }
        for rt in self.registry.iter_mut() {
            if let Err(e) = rt.worker.stop(true).await {
                warn!(worker = e.worker(), error = %e, "blocking stop failed");
            }
            rt.should_run = false;
            rt.last_alive = false;
        }
        info!("everything is dead");
    }

    /// Heartbeat snapshot in registry order, from the last pass's observations.
    pub fn snapshot(&self) -> ManagerStateSnapshot {
        self.registry.snapshot()
    }
}
