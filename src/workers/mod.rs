//! Worker model: capability trait, process-backed implementation, specs,
//! registry, and the static catalog.
//!
//! ## Contents
//! - [`Worker`]: polymorphic lifecycle interface `{prepare, start, stop, is_alive}`
//! - [`ProcessWorker`]: OS-process-backed worker over `tokio::process`
//! - [`WorkerSpec`] / [`EnablePolicy`]: immutable definition + data-driven
//!   enablement predicate
//! - [`WorkerRegistry`]: insertion-ordered runtime table, one entry per spec
//! - [`catalog`]: the fixed worker table for this device

mod process;
mod registry;
mod spec;
mod worker;

pub mod catalog;

pub use process::ProcessWorker;
pub use registry::{WorkerRegistry, WorkerRuntime};
pub use spec::{EnablePolicy, WorkerSpec};
pub use worker::Worker;

#[cfg(test)]
pub(crate) mod testing;
