//! In-process message bus and the feeds the supervisor consumes/produces.
//!
//! Two logical inputs ([`Message::DeviceState`], [`Message::CarParams`]) and
//! one output ([`Message::ManagerState`]), all carried on one broadcast
//! [`Bus`]. Wire format and transport beyond this process are out of scope.

mod bus;
mod message;

pub use bus::Bus;
pub use message::{ManagerStateSnapshot, Message, WorkerState};
