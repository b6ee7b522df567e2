//! The worker capability interface.

use async_trait::async_trait;

use crate::error::WorkerError;

/// One supervised long-running unit with a `{prepare, start, stop, is_alive}`
/// lifecycle.
///
/// ### Rules
/// - `start` on an already-running worker is a no-op.
/// - `stop` on an already-stopped worker is a no-op.
/// - `stop(block=false)` must not block the caller beyond sending the stop
///   signal; `stop(block=true)` may wait, bounded by the implementation's
///   kill-escalation timeout.
/// - `prepare` is idempotent and side-effect-free beyond caching/compilation;
///   it runs once for every worker before the control loop starts, regardless
///   of enablement.
#[async_trait]
pub trait Worker: Send {
    /// Stable, unique worker name.
    fn name(&self) -> &str;

    /// One-time warmup before the control loop begins.
    async fn prepare(&mut self) -> Result<(), WorkerError> {
        Ok(())
    }

    /// Launches the worker. Fire-and-forget: liveness is polled, not awaited.
    async fn start(&mut self) -> Result<(), WorkerError>;

    /// Stops the worker; see the trait-level rules for blocking semantics.
    async fn stop(&mut self, block: bool) -> Result<(), WorkerError>;

    /// Polls current liveness (may reap an exited process as a side effect).
    fn is_alive(&mut self) -> bool;

    /// OS pid of the underlying process, if one is running.
    fn pid(&self) -> Option<u32>;

    /// Exit code of the most recently terminated process, if any.
    fn exit_code(&self) -> Option<i32>;
}
