//! # procvisor
//!
//! **procvisor** supervises a fixed fleet of long-running worker processes on
//! a single embedded device (an autonomous-driving computer). It owns the
//! categorized persistent param store, decides which workers should run from
//! the vehicle's onroad/offroad state and the device-identity gate, reconciles
//! that decision against observed liveness, publishes a health heartbeat, and
//! sequences a confirmed stop of the whole fleet on shutdown.
//!
//! ## Architecture
//! ```text
//!   device-state feed ──► Bus ──► Manager (control loop, 1 tick ≈ 1 s)
//!   car-params feed   ──►  │         │
//!                          │         ├─► ParamStore  (lifecycle-scoped clears)
//!                          │         ├─► Reconciler ──► WorkerRegistry
//!                          │         │        │   start/stop│
//!                          │         │        ▼             ▼
//!                          │         │   DesiredState   Worker (trait)
//!                          │         │   (per tick)     └─ ProcessWorker
//!                          │         │
//!   manager-state feed ◄───┴─────────┴─► heartbeat snapshot per tick
//!
//! Shutdown path:
//!   SIGINT/SIGTERM ──► CancellationToken ─┐
//!   DoUninstall/DoReboot/DoShutdown/      ├──► Manager::cleanup()
//!   DoFactoryReset param flags ───────────┘      ├─ stop fan-out (non-blocking)
//!                                                └─ blocking confirmation pass
//!                                                     └─► hardware-action decision
//! ```
//!
//! ## Rules
//! - One logical thread drives the loop; it is the sole param-store writer and
//!   sole owner of worker runtimes. No locks in the core.
//! - Worker start/stop from the loop is fire-and-forget; a failing worker is
//!   logged and retried next tick, never fatal.
//! - Only startup failures (registration, store) and errors escaping the loop
//!   reach the process exit status, and both still route through cleanup.
//!
//! ## Example
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use procvisor::{
//!     catalog, Bus, Manager, ManagerConfig, ParamRegistrar, ParamStore,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let params = ParamStore::open("/data/params")?;
//!     let bus = Bus::default();
//!     let cfg = ManagerConfig::default();
//!
//!     let mut mgr = Manager::new(cfg, params.clone(), catalog::default_specs(), bus);
//!     mgr.init(&ParamRegistrar::new(params)).await?;
//!
//!     let cancel = CancellationToken::new();
//!     procvisor::signals::watch(cancel.clone())?;
//!
//!     let res = mgr.run(cancel).await;
//!     mgr.cleanup().await;
//!     res?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod manager;
mod messaging;
mod params;
mod reconcile;
mod registration;
mod workers;

pub mod hardware;
pub mod signals;

pub use config::ManagerConfig;
pub use error::{ManagerError, RegistrationError, WorkerError};
pub use hardware::HardwareAction;
pub use manager::Manager;
pub use messaging::{Bus, ManagerStateSnapshot, Message, WorkerState};
pub use params::{Category, ParamStore};
pub use reconcile::{DesiredState, Reconciler};
pub use registration::{DongleId, ParamRegistrar, Registrar};
pub use workers::{catalog, EnablePolicy, ProcessWorker, Worker, WorkerRegistry, WorkerSpec};
