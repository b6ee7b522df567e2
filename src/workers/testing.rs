//! Scripted in-memory worker for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::WorkerError;
use crate::workers::Worker;

/// Shared observable state of a [`FakeWorker`].
#[derive(Debug, Default)]
pub struct FakeState {
    pub alive: bool,
    pub prepares: u32,
    pub starts: u32,
    pub stops: u32,
    pub blocking_stops: u32,
    pub fail_next_start: bool,
}

/// Worker whose liveness is scripted by the test through a shared handle.
pub struct FakeWorker {
    name: &'static str,
    state: Arc<Mutex<FakeState>>,
}

impl FakeWorker {
    pub fn new(name: &'static str) -> (Self, Arc<Mutex<FakeState>>) {
        let state = Arc::new(Mutex::new(FakeState::default()));
        (
            Self {
                name,
                state: state.clone(),
            },
            state,
        )
    }
}

#[async_trait]
impl Worker for FakeWorker {
    fn name(&self) -> &str {
        self.name
    }

    async fn prepare(&mut self) -> Result<(), WorkerError> {
        self.state.lock().unwrap().prepares += 1;
        Ok(())
    }

    async fn start(&mut self) -> Result<(), WorkerError> {
        let mut s = self.state.lock().unwrap();
        if s.fail_next_start {
            s.fail_next_start = false;
            return Err(WorkerError::Spawn {
                name: self.name.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "scripted failure"),
            });
        }
        if !s.alive {
            s.alive = true;
            s.starts += 1;
        }
        Ok(())
    }

    async fn stop(&mut self, block: bool) -> Result<(), WorkerError> {
        let mut s = self.state.lock().unwrap();
        if block {
            s.blocking_stops += 1;
        }
        if s.alive {
            s.alive = false;
            s.stops += 1;
        }
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        self.state.lock().unwrap().alive
    }

    fn pid(&self) -> Option<u32> {
        if self.state.lock().unwrap().alive {
            Some(4242)
        } else {
            None
        }
    }

    fn exit_code(&self) -> Option<i32> {
        None
    }
}
