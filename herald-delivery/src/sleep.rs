//! Injectable waiting, so backoff and pacing can be observed in tests.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;

/// Something that can wait for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync + fmt::Debug {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock waiting on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records every requested wait and returns immediately
///
/// Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// Create a new recording sleeper
    pub fn new() -> Self {
        Self::default()
    }

    /// Every wait requested so far, in order
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().clone()
    }

    /// Sum of all requested waits
    pub fn total(&self) -> Duration {
        self.waits.lock().iter().sum()
    }

    /// Forget all recorded waits
    pub fn clear(&self) {
        self.waits.lock().clear();
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().push(duration);
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn recording_sleeper_keeps_order() {
        let sleeper = RecordingSleeper::new();
        let shared = sleeper.clone();

        sleeper.sleep(Duration::from_secs(1)).await;
        shared.sleep(Duration::from_secs(2)).await;

        assert_eq!(
            sleeper.waits(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        assert_eq!(sleeper.total(), Duration::from_secs(3));

        sleeper.clear();
        assert!(shared.waits().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_waits_on_the_timer() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(30)).await;
        assert!(start.elapsed() >= Duration::from_secs(30));
    }
}
