//! OS-process-backed worker.
//!
//! Spawns the configured command via [`tokio::process::Command`]. A
//! non-blocking stop sends SIGINT; a blocking stop waits up to the configured
//! grace and then escalates to SIGKILL.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::time;
use tracing::{debug, warn};

use crate::error::WorkerError;
use crate::workers::Worker;

/// Default wait before SIGINT escalates to SIGKILL on a blocking stop.
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(5);

/// Worker backed by a real OS process.
pub struct ProcessWorker {
    name: String,
    command: Vec<String>,
    grace: Duration,
    child: Option<Child>,
    exit_code: Option<i32>,
}

impl ProcessWorker {
    /// Creates a process worker launching `command` (program followed by args).
    pub fn new(name: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command,
            grace: DEFAULT_STOP_GRACE,
            child: None,
            exit_code: None,
        }
    }

    /// Overrides the blocking-stop kill-escalation grace.
    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    fn signal(&self, sig: i32) {
        if let Some(pid) = self.pid() {
            // Child is our direct descendant; pid is valid until reaped.
            unsafe {
                libc::kill(pid as i32, sig);
            }
        }
    }

    fn reap(&mut self, status: std::process::ExitStatus) {
        self.exit_code = status.code();
        self.child = None;
    }
}

#[async_trait]
impl Worker for ProcessWorker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&mut self) -> Result<(), WorkerError> {
        if self.is_alive() {
            return Ok(());
        }
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| WorkerError::Spawn {
                name: self.name.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            })?;
        let child = Command::new(program)
            .args(args)
            .spawn()
            .map_err(|source| WorkerError::Spawn {
                name: self.name.clone(),
                source,
            })?;
        debug!(worker = %self.name, pid = child.id(), "spawned");
        self.exit_code = None;
        self.child = Some(child);
        Ok(())
    }

    async fn stop(&mut self, block: bool) -> Result<(), WorkerError> {
        if self.child.is_none() {
            return Ok(());
        }
        self.signal(libc::SIGINT);
        if !block {
            return Ok(());
        }

        let name = self.name.clone();
        let grace = self.grace;
        let Some(child) = self.child.as_mut() else {
            return Ok(());
        };
        match time::timeout(grace, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(worker = %name, code = status.code(), "stopped");
                self.reap(status);
                Ok(())
            }
            Ok(Err(source)) => Err(WorkerError::Stop { name, source }),
            Err(_elapsed) => {
                warn!(worker = %name, ?grace, "stop grace exceeded, killing");
                child.start_kill().map_err(|source| WorkerError::Stop {
                    name: name.clone(),
                    source,
                })?;
                let status = child
                    .wait()
                    .await
                    .map_err(|source| WorkerError::Stop { name, source })?;
                self.reap(status);
                Ok(())
            }
        }
    }

    fn is_alive(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(Some(status)) => {
                    self.reap(status);
                    false
                }
                Ok(None) => true,
                Err(_) => false,
            },
            None => false,
        }
    }

    fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_is_noop_when_running_and_stop_is_noop_when_stopped() {
        let mut w = ProcessWorker::new("sleeper", vec!["sleep".into(), "30".into()]);
        // stop before any start: no-op
        w.stop(true).await.unwrap();
        assert!(!w.is_alive());

        w.start().await.unwrap();
        assert!(w.is_alive());
        let pid = w.pid().unwrap();

        // second start keeps the same process
        w.start().await.unwrap();
        assert_eq!(w.pid(), Some(pid));

        w.stop(true).await.unwrap();
        assert!(!w.is_alive());
        assert!(w.pid().is_none());
    }

    #[tokio::test]
    async fn spawn_failure_is_a_worker_error() {
        let mut w = ProcessWorker::new("ghost", vec!["/nonexistent/binary".into()]);
        let err = w.start().await.unwrap_err();
        assert_eq!(err.as_label(), "worker_spawn_failed");
        assert_eq!(err.worker(), "ghost");
    }

    #[tokio::test]
    async fn dead_process_reports_exit_code() {
        let mut w = ProcessWorker::new("true", vec!["true".into()]);
        w.start().await.unwrap();
        // wait for it to exit, then poll
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!w.is_alive());
        assert_eq!(w.exit_code(), Some(0));
    }
}
