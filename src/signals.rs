//! OS termination signals → level-triggered cancellation.
//!
//! A termination signal must abort the control loop's current wait and route
//! straight to the shutdown sequencer, so the signal is surfaced as a
//! [`CancellationToken`] rather than a stream the loop has to poll.
//!
//! Handler installation is eager and fallible: it happens here, before the
//! watcher task is spawned, so a failed install reaches the caller as an error
//! instead of a loop that can never be stopped.

use tokio_util::sync::CancellationToken;

/// Installs SIGINT/SIGTERM listeners, then spawns a watcher that cancels
/// `token` on the first signal received.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
/// Propagates the install failure; callers treat it as fatal startup
/// ([`crate::ManagerError::SignalInstall`]) rather than entering the loop.
#[cfg(unix)]
pub fn watch(token: CancellationToken) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
        token.cancel();
    });
    Ok(())
}

/// Spawns a watcher that cancels `token` on Ctrl-C.
#[cfg(not(unix))]
pub fn watch(token: CancellationToken) -> std::io::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn successful_install_leaves_the_token_live() {
        let token = CancellationToken::new();
        watch(token.clone()).unwrap();

        // No signal delivered: the watcher must not cancel on its own.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!token.is_cancelled());
    }
}
