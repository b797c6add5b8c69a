//! Cooperative cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Cloneable stop flag shared between threads and tasks.
///
/// Blocking code polls [`StopSignal::is_stopped`]; async code can await
/// [`StopSignal::stopped`]. Once set, the flag stays set.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    stopped: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    /// New, unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop and wake every waiter.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Resolves once a stop has been requested.
    pub async fn stopped(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register before checking so a concurrent stop() is not missed.
        notified.as_mut().enable();
        if self.is_stopped() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_clones_share_flag() {
        let a = StopSignal::new();
        let b = a.clone();
        assert!(!b.is_stopped());
        a.stop();
        assert!(b.is_stopped());
    }

    #[tokio::test]
    async fn test_stopped_resolves_after_stop() -> Result<(), Box<dyn std::error::Error>> {
        let signal = StopSignal::new();
        let waiter = signal.clone();
        let handle = tokio::spawn(async move { waiter.stopped().await });
        tokio::task::yield_now().await;
        signal.stop();
        tokio::time::timeout(Duration::from_secs(1), handle).await??;
        Ok(())
    }

    #[tokio::test]
    async fn test_stopped_returns_immediately_when_already_set() {
        let signal = StopSignal::new();
        signal.stop();
        signal.stopped().await;
        signal.stopped().await;
    }

    #[test]
    fn test_stop_from_plain_thread() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        let joined = std::thread::spawn(move || remote.stop()).join();
        assert!(joined.is_ok());
        assert!(signal.is_stopped());
    }
}
