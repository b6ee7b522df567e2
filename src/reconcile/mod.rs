//! Desired-state computation and start/stop reconciliation.

mod reconciler;
mod state;

pub use reconciler::Reconciler;
pub use state::DesiredState;
