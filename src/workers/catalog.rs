//! The fixed worker table for this device.
//!
//! Enablement lives here as policy data; nothing below hand-writes a per-worker
//! branch. Upload/telemetry workers require a registered, non-clone identity;
//! driver-monitoring workers require DM hardware; `pandad` is removed when the
//! board subsystem is skipped.

use crate::workers::{EnablePolicy, ProcessWorker, WorkerSpec};

const TABLE: &[(&str, &str, EnablePolicy)] = &[
    ("pandad", "system/pandad/pandad", EnablePolicy::always().needs_board()),
    ("loggerd", "system/loggerd/loggerd", EnablePolicy::onroad_only()),
    ("modeld", "selfdrive/modeld/modeld", EnablePolicy::onroad_only()),
    ("sensord", "system/sensord/sensord", EnablePolicy::onroad_only()),
    (
        "dmonitoringd",
        "selfdrive/monitoring/dmonitoringd",
        EnablePolicy::onroad_only().needs_dm(),
    ),
    (
        "dmonitoringmodeld",
        "selfdrive/modeld/dmonitoringmodeld",
        EnablePolicy::onroad_only().needs_dm(),
    ),
    (
        "uploader",
        "system/loggerd/uploader",
        EnablePolicy::always().needs_registration(),
    ),
    (
        "athenad",
        "system/athena/athenad",
        EnablePolicy::always().needs_registration(),
    ),
    ("ui", "selfdrive/ui/ui", EnablePolicy::always()),
];

/// Builds the default process-backed worker specs, in display order.
pub fn default_specs() -> Vec<WorkerSpec> {
    TABLE
        .iter()
        .map(|(name, bin, policy)| {
            WorkerSpec::new(
                Box::new(ProcessWorker::new(*name, vec![(*bin).to_string()])),
                *policy,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<_> = TABLE.iter().map(|(n, _, _)| *n).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn identity_workers_are_gated() {
        for (name, _, policy) in TABLE {
            if *name == "uploader" || *name == "athenad" {
                assert!(policy.needs_registration, "{name} must be identity-gated");
            }
        }
    }
}
