//! Cooperative cancellation for bulk sends.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use herald_common::{Signal, internal};
use tokio::sync::{Notify, broadcast};

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shared flag checked before each segment is started.
///
/// Segments already in flight finish; nothing new starts once it is set.
/// Backoff and pacing waits end early when it is set.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    inner: Arc<Inner>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that is cancelled as soon as `signals` yields
    /// [`Signal::Shutdown`] or [`Signal::Finalised`]. Dropping every sender
    /// leaves it uncancelled.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_signal(mut signals: broadcast::Receiver<Signal>) -> Self {
        let cancellation = Self::new();
        let token = cancellation.clone();

        tokio::spawn(async move {
            loop {
                match signals.recv().await {
                    Ok(signal @ (Signal::Shutdown | Signal::Finalised)) => {
                        internal!(level = INFO, ?signal, "Cancelling delivery");
                        token.cancel();
                        break;
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        cancellation
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`Self::cancel`] has been called, immediately if it
    /// already was.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Registered before the flag check so a concurrent cancel is not missed
        notified.as_mut().enable();

        if self.is_cancelled() {
            return;
        }

        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn clones_share_state() {
        let cancellation = Cancellation::new();
        let clone = cancellation.clone();
        assert!(!clone.is_cancelled());

        cancellation.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn shutdown_signal_cancels() {
        let (tx, rx) = broadcast::channel(4);
        let cancellation = Cancellation::from_signal(rx);
        assert!(!cancellation.is_cancelled());

        tx.send(Signal::Shutdown).expect("receiver alive");

        tokio::time::timeout(Duration::from_secs(1), async {
            while !cancellation.is_cancelled() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("cancelled after shutdown");
    }

    #[tokio::test]
    async fn cancelled_resolves_for_waiters_and_late_callers() {
        let cancellation = Cancellation::new();
        let waiter = tokio::spawn({
            let cancellation = cancellation.clone();
            async move { cancellation.cancelled().await }
        });

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        cancellation.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter woken")
            .expect("waiter task");

        tokio::time::timeout(Duration::from_secs(1), cancellation.cancelled())
            .await
            .expect("already cancelled resolves immediately");
    }

    #[tokio::test]
    async fn closed_channel_does_not_cancel() {
        let (tx, rx) = broadcast::channel::<Signal>(1);
        let cancellation = Cancellation::from_signal(rx);
        drop(tx);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!cancellation.is_cancelled());
    }
}
