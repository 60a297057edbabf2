use std::sync::Arc;
use tokio::sync::watch;

/// Ctrl+C latch shared by the auditor, its link sweeps and the console.
/// Once triggered it stays triggered, so a waiter that subscribes after the
/// signal still sees it.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once the signal has been triggered, immediately if it
    /// already was.
    pub async fn triggered(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Duration, timeout};

    #[tokio::test]
    async fn trigger_is_seen_by_later_waiters() {
        let shutdown = ShutdownSignal::new();
        assert!(!shutdown.is_triggered());

        shutdown.trigger();

        assert!(shutdown.is_triggered());
        assert!(timeout(Duration::from_millis(100), shutdown.triggered()).await.is_ok());
        assert!(timeout(Duration::from_millis(100), shutdown.clone().triggered()).await.is_ok());
    }

    #[tokio::test]
    async fn waiters_block_until_triggered() {
        let shutdown = ShutdownSignal::new();
        assert!(timeout(Duration::from_millis(20), shutdown.triggered()).await.is_err());

        let waiter = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { shutdown.triggered().await })
        };
        shutdown.trigger();
        assert!(timeout(Duration::from_millis(100), waiter).await.is_ok());
    }
}
