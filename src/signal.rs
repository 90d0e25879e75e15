//! Cooperative cancellation for long resolution batches.
//!
//! A [`ShutdownToken`] is shared by the resolver's workers. Ctrl-C (or
//! SIGTERM on Unix) cancels it through [`cancel_on_signal`]; workers check the
//! token between network calls and drop unfinished domains.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// A token that can be shared across tasks to check for shutdown.
#[derive(Clone, Debug, Default)]
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

/// Spawn a task that cancels `token` on the first interrupt or terminate signal.
pub fn cancel_on_signal(token: ShutdownToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown requested, letting in-flight lookups finish...");
        token.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            warn!("Failed to register SIGTERM handler: {}", e);
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_token() {
        let token = ShutdownToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_shutdown_token_clone_shares_state() {
        let token1 = ShutdownToken::new();
        let token2 = token1.clone();

        token1.cancel();
        assert!(token2.is_cancelled());
    }

    #[test]
    fn test_multiple_cancels() {
        let token = ShutdownToken::default();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }
}
