//! Bulk delivery orchestration
//!
//! A [`DeliveryProcessor`] segments a message once and delivers it to every
//! recipient, one recipient at a time or through a bounded worker pool.

mod bulk;
mod recipient;

use std::sync::Arc;

use herald_common::internal;

use crate::{
    config::DeliveryConfig,
    error::DeliveryError,
    executor::DeliveryExecutor,
    segment::{Segment, segment},
    sleep::{Sleeper, TokioSleeper},
    transport::Transport,
};

/// Delivers one message to many recipients.
///
/// Cloning is cheap; clones share the transport and sleeper.
#[derive(Debug, Clone)]
pub struct DeliveryProcessor {
    config: Arc<DeliveryConfig>,
    executor: DeliveryExecutor,
}

impl DeliveryProcessor {
    /// Create a processor that waits on the real clock.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: DeliveryConfig, transport: Arc<dyn Transport>) -> Result<Self, DeliveryError> {
        Self::with_sleeper(config, transport, Arc::new(TokioSleeper))
    }

    /// Create a processor with an injected [`Sleeper`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn with_sleeper(
        config: DeliveryConfig,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, DeliveryError> {
        config.validate()?;

        internal!(
            level = DEBUG,
            mode = %config.mode,
            dry_run = config.dry_run,
            max_retries = config.max_retries,
            workers = config.max_concurrent_recipients,
            "Delivery processor configured"
        );

        let executor = DeliveryExecutor::new(
            transport,
            sleeper,
            config.retry_policy(),
            config.dry_run,
        );

        Ok(Self {
            config: Arc::new(config),
            executor,
        })
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    pub const fn executor(&self) -> &DeliveryExecutor {
        &self.executor
    }

    /// Split `message` the way it will be sent.
    pub fn segment(&self, message: &str) -> Vec<Segment> {
        segment(message, self.config.max_length())
    }
}
