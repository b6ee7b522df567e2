//! Global runtime configuration for the supervisor.

use std::collections::HashSet;
use std::time::Duration;

/// Settings for one supervisor run.
///
/// ## Field semantics
/// - `tick_timeout`: bounded wait for the device-state feed each tick; the
///   loop stays live at this cadence even if the feed stalls.
/// - `bus_capacity`: broadcast ring-buffer size (clamped to ≥ 1 by the bus).
/// - `block`: worker names force-disabled regardless of policy.
/// - `no_board`: skip the board subsystem; removes board workers from the
///   enabled set.
/// - `release_channel`: clear development-only params at startup.
///
/// Prepare-only mode (init and exit) is a binary concern, decided by the CLI
/// before [`Manager::run`](crate::Manager::run) is ever called, so it does
/// not live here.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub tick_timeout: Duration,
    pub bus_capacity: usize,
    pub block: HashSet<String>,
    pub no_board: bool,
    pub release_channel: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            tick_timeout: Duration::from_secs(1),
            bus_capacity: 64,
            block: HashSet::new(),
            no_board: false,
            release_channel: false,
        }
    }
}
