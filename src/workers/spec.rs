//! Worker specification and data-driven enablement policy.
//!
//! Enablement is data, not per-worker code branches: every policy is a small
//! set of requirements evaluated against the per-tick
//! [`DesiredState`](crate::reconcile::DesiredState).

use crate::reconcile::DesiredState;
use crate::workers::Worker;

/// Immutable definition of one supervised worker.
pub struct WorkerSpec {
    /// The worker itself (capability interface, never a concrete type).
    pub worker: Box<dyn Worker>,
    /// When this worker should run.
    pub policy: EnablePolicy,
}

impl WorkerSpec {
    pub fn new(worker: Box<dyn Worker>, policy: EnablePolicy) -> Self {
        Self { worker, policy }
    }
}

/// Data-driven enablement predicate.
///
/// `offroad`/`onroad` select the vehicle states the worker runs in; the
/// `needs_*` requirements veto it when the corresponding gate is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnablePolicy {
    /// Run while the vehicle is offroad.
    pub offroad: bool,
    /// Run while the vehicle is onroad.
    pub onroad: bool,
    /// Disabled when identity is unregistered or the device is a clone.
    pub needs_registration: bool,
    /// Disabled when driver-monitoring hardware is flagged unavailable.
    pub needs_dm: bool,
    /// Disabled when the board subsystem is skipped.
    pub needs_board: bool,
}

impl EnablePolicy {
    /// Runs in both vehicle states.
    pub const fn always() -> Self {
        Self {
            offroad: true,
            onroad: true,
            needs_registration: false,
            needs_dm: false,
            needs_board: false,
        }
    }

    /// Runs only while onroad.
    pub const fn onroad_only() -> Self {
        let mut p = Self::always();
        p.offroad = false;
        p
    }

    /// Runs only while offroad.
    pub const fn offroad_only() -> Self {
        let mut p = Self::always();
        p.onroad = false;
        p
    }

    /// Requires a registered, non-clone identity.
    pub const fn needs_registration(mut self) -> Self {
        self.needs_registration = true;
        self
    }

    /// Requires driver-monitoring hardware.
    pub const fn needs_dm(mut self) -> Self {
        self.needs_dm = true;
        self
    }

    /// Requires the board subsystem.
    pub const fn needs_board(mut self) -> Self {
        self.needs_board = true;
        self
    }

    /// Evaluates the predicate for worker `name` against the tick's context.
    ///
    /// The explicit block-list wins over everything else.
    pub fn allows(&self, name: &str, state: &DesiredState) -> bool {
        if state.block.contains(name) {
            return false;
        }
        if self.needs_registration && (!state.registered || state.is_clone) {
            return false;
        }
        if self.needs_dm && state.dm_unavailable {
            return false;
        }
        if self.needs_board && state.no_board {
            return false;
        }
        if state.onroad {
            self.onroad
        } else {
            self.offroad
        }
    }
}
