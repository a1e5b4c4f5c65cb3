//! Shutdown coordination for the edge node.
//!
//! One [`Shutdown`] is created per process and cloned into whatever may stop
//! it (the signal listener, tests). The HTTP server holds a
//! [`ShutdownSignal`]. The trigger is latched: a signal taken after
//! [`Shutdown::trigger`] still resolves, so a server started late never
//! misses the stop.

use std::sync::Arc;

use tokio::sync::watch;

/// Handle that stops the edge node.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A handle for one long-running task to wait on.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Latch the shutdown. Repeated calls are no-ops.
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            tracing::debug!(listeners = self.tx.receiver_count(), "Shutdown triggered");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of [`Shutdown`].
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered, or once every [`Shutdown`] handle
    /// has been dropped.
    pub async fn recv(&mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_every_signal() {
        let shutdown = Shutdown::new();
        let mut server = shutdown.signal();
        let mut reloader = shutdown.clone().signal();

        shutdown.trigger();
        server.recv().await;
        reloader.recv().await;
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_signal_taken_after_trigger_resolves() {
        let shutdown = Shutdown::default();
        shutdown.trigger();
        shutdown.trigger();

        let mut late = shutdown.signal();
        tokio::time::timeout(Duration::from_secs(1), late.recv())
            .await
            .expect("late signal missed the shutdown");
    }

    #[tokio::test]
    async fn test_dropping_every_handle_releases_signal() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.signal();
        drop(shutdown);

        tokio::time::timeout(Duration::from_secs(1), signal.recv())
            .await
            .expect("signal outlived its coordinator");
    }

    #[tokio::test]
    async fn test_untriggered_signal_stays_pending() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.signal();

        let waited = tokio::time::timeout(Duration::from_millis(50), signal.recv()).await;
        assert!(waited.is_err());
        assert!(!shutdown.is_triggered());
    }
}
