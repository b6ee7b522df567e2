//! Broadcast bus for device/manager feeds.
//!
//! Thin wrapper around [`tokio::sync::broadcast`] with non-blocking publish
//! from any number of sources.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or fails; with no
//!   receivers the message is dropped.
//! - **Bounded capacity**: one ring buffer shared by all receivers; slow
//!   receivers observe `RecvError::Lagged(n)` and skip the `n` oldest items.
//! - **No persistence**: a receiver only sees messages sent after it
//!   subscribed.

use tokio::sync::broadcast;

use super::message::Message;

/// Broadcast channel for bus messages.
///
/// Cheap to clone (the sender is `Arc`-backed internally).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Message>,
}

impl Bus {
    /// Creates a bus with the given ring-buffer capacity (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes a message to all active subscribers; returns immediately.
    pub fn publish(&self, msg: Message) {
        let _ = self.tx.send(msg);
    }

    /// Creates an independent receiver observing subsequent messages.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.tx.subscribe()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(64)
    }
}
