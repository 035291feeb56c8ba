//! Shared fixtures for delivery integration tests
#![allow(dead_code)] // Test utility module - not all helpers used in every test

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use herald_delivery::{
    Cancellation, DeliveryConfig, DeliveryProcessor, RecordingSleeper, Sleeper, TestTransport,
    Transport, TransportError,
};

/// A processor wired to a scripted transport and a recording sleeper.
pub struct Harness {
    pub processor: DeliveryProcessor,
    pub transport: TestTransport,
    pub sleeper: RecordingSleeper,
}

impl Harness {
    pub fn new(config: DeliveryConfig, transport: TestTransport) -> Self {
        let sleeper = RecordingSleeper::new();
        let processor = DeliveryProcessor::with_sleeper(
            config,
            Arc::new(transport.clone()),
            Arc::new(sleeper.clone()),
        )
        .expect("valid test config");

        Self {
            processor,
            transport,
            sleeper,
        }
    }

    pub fn with_transport(transport: TestTransport) -> Self {
        Self::new(DeliveryConfig::default(), transport)
    }
}

/// A message long enough to need several segments in `segment` mode.
pub fn long_message() -> String {
    (1..=60)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn recipients(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("+1555000{i:04}")).collect()
}

/// Transport that takes longer for earlier recipients, so completion order
/// is the reverse of input order, and tracks peak concurrency.
#[derive(Debug, Default)]
pub struct StaggeredTransport {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl StaggeredTransport {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for StaggeredTransport {
    async fn send(&self, destination: &str, _text: &str) -> Result<String, TransportError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        let ordinal: u64 = destination
            .trim_start_matches('+')
            .parse::<u64>()
            .map_or(0, |n| n % 100);
        tokio::time::sleep(Duration::from_millis(100u64.saturating_sub(ordinal * 10))).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(format!("SM-{destination}"))
    }
}

/// Transport that requests cancellation once it has accepted `after` calls.
#[derive(Debug)]
pub struct CancellingTransport {
    pub inner: TestTransport,
    pub cancellation: Cancellation,
    pub after: usize,
}

#[async_trait]
impl Transport for CancellingTransport {
    async fn send(&self, destination: &str, text: &str) -> Result<String, TransportError> {
        let result = self.inner.send(destination, text).await;
        if self.inner.call_count() >= self.after {
            self.cancellation.cancel();
        }
        result
    }
}

/// Sleeper whose waits never finish on their own.
#[derive(Debug)]
pub struct StalledSleeper;

#[async_trait]
impl Sleeper for StalledSleeper {
    async fn sleep(&self, _duration: Duration) {
        std::future::pending::<()>().await;
    }
}
