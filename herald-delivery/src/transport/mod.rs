//! The outbound side of the engine.
//!
//! A [`Transport`] sends one piece of text to one destination and either
//! returns the carrier's identifier for it or a [`TransportError`].


use std::fmt;

use async_trait::async_trait;

use crate::error::TransportError;

pub use test::{SentSegment, TestTransport};

/// Provider identifier reported for every segment in dry-run mode.
pub const DRY_RUN_TOKEN: &str = "DRY_RUN_SID";

/// Carrier abstraction used by the executor.
///
/// Implementations must be safe to share between recipient workers.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send `text` to `destination`, returning the provider's identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] describing the failed call; the engine
    /// classifies it to decide whether to retry.
    async fn send(&self, destination: &str, text: &str) -> Result<String, TransportError>;
}
