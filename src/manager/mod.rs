//! Supervisor core: startup, the control loop, and the shutdown sequencer.

mod core;

pub use core::Manager;
