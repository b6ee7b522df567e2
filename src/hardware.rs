//! Final hardware-action decision after the fleet is fully stopped.
//!
//! Executing the action (reboot/power-off/uninstall) is an external,
//! irreversible, non-retried step; this module only decides which one the
//! operator asked for.

use crate::params::ParamStore;

/// Irreversible action taken after the supervisor reports fully stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareAction {
    Uninstall,
    Reboot,
    Shutdown,
}

/// Scans the operator flags in fixed priority order.
pub fn pending_action(params: &ParamStore) -> Option<HardwareAction> {
    if params.get_bool("DoUninstall") {
        Some(HardwareAction::Uninstall)
    } else if params.get_bool("DoReboot") {
        Some(HardwareAction::Reboot)
    } else if params.get_bool("DoShutdown") {
        Some(HardwareAction::Shutdown)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninstall_outranks_reboot_and_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let params = ParamStore::open(dir.path()).unwrap();

        assert_eq!(pending_action(&params), None);

        params.put_bool("DoShutdown", true).unwrap();
        assert_eq!(pending_action(&params), Some(HardwareAction::Shutdown));

        params.put_bool("DoReboot", true).unwrap();
        assert_eq!(pending_action(&params), Some(HardwareAction::Reboot));

        params.put_bool("DoUninstall", true).unwrap();
        assert_eq!(pending_action(&params), Some(HardwareAction::Uninstall));
    }
}
