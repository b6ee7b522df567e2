//! Per-tick desired-state context.

use std::collections::HashSet;

/// Everything an enablement predicate may read, computed once per tick and
/// passed by reference. Never persisted, never re-derived inside predicates.
#[derive(Debug, Clone, Default)]
pub struct DesiredState {
    /// Externally observed "vehicle is being driven" flag.
    pub onroad: bool,
    /// Device identity is registered (not the unregistered sentinel).
    pub registered: bool,
    /// Device is flagged as a clone.
    pub is_clone: bool,
    /// Driver-monitoring hardware is flagged unavailable.
    pub dm_unavailable: bool,
    /// Board subsystem is skipped for this run.
    pub no_board: bool,
    /// Explicit block-list: these workers never run, regardless of policy.
    pub block: HashSet<String>,
    /// Latest car-parameters blob, passed through read-only.
    pub car_params: Option<String>,
}
