//! Per-segment send with classification-driven retry.
//!
//! Each segment runs through a small state machine:
//!
//! ```text
//! Attempting(n) ──ok──────────────────────────────▶ Success
//!      │
//!      └─err─▶ classify ─terminal───────────────────▶ TerminalFailure
//!                   │
//!                   └─retryable ─ n < max ─▶ RetryWait ─▶ Attempting(n + 1)
//!                                 n = max ─▶ TerminalFailure (retries exhausted)
//! ```
//!
//! [`RetryPolicy::transition`] is the pure step function; [`DeliveryExecutor::send_segment`]
//! drives it, doing the I/O and the waiting.

use std::{sync::Arc, time::Duration};

use herald_common::{internal, outgoing, tracing::warn};

use crate::{
    cancel::Cancellation,
    error::{DeliveryError, SystemError, TemporaryError, TransportError, classify},
    policy::RetryPolicy,
    segment::Segment,
    sleep::Sleeper,
    transport::{DRY_RUN_TOKEN, Transport},
};

/// A segment the carrier accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentDelivery {
    pub provider_id: String,
    /// Attempts it took, including the successful one.
    pub attempts: u32,
}

/// A segment that will not be delivered by this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentFailure {
    pub error: DeliveryError,
    /// Carrier code of the last transport error, if it had one.
    pub error_code: Option<u32>,
    pub attempts: u32,
}

impl SegmentFailure {
    #[must_use]
    pub const fn retryable(&self) -> bool {
        self.error.is_retryable()
    }
}

/// States of a single segment send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    Attempting(u32),
    RetryWait {
        next_attempt: u32,
        delay: Duration,
        last_error: TransportError,
    },
    Success(SegmentDelivery),
    TerminalFailure(SegmentFailure),
}

impl AttemptState {
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Success(_) | Self::TerminalFailure(_))
    }
}

impl RetryPolicy {
    /// Decide what follows attempt `attempt` given its result.
    pub fn transition(&self, attempt: u32, result: Result<String, TransportError>) -> AttemptState {
        let error = match result {
            Ok(provider_id) => {
                return AttemptState::Success(SegmentDelivery {
                    provider_id,
                    attempts: attempt,
                });
            }
            Err(error) => error,
        };

        let classified = classify(&error);
        let error_code = error.code;

        if !classified.is_retryable() {
            return AttemptState::TerminalFailure(SegmentFailure {
                error: classified,
                error_code,
                attempts: attempt,
            });
        }

        if self.should_retry(attempt) {
            AttemptState::RetryWait {
                next_attempt: attempt + 1,
                delay: self.backoff_delay(attempt),
                last_error: error,
            }
        } else {
            AttemptState::TerminalFailure(SegmentFailure {
                error: TemporaryError::RetriesExhausted {
                    attempts: attempt,
                    last: error.to_string(),
                }
                .into(),
                error_code,
                attempts: attempt,
            })
        }
    }
}

/// Sends individual segments through a [`Transport`].
#[derive(Debug, Clone)]
pub struct DeliveryExecutor {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    dry_run: bool,
}

impl DeliveryExecutor {
    pub fn new(
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
        dry_run: bool,
    ) -> Self {
        Self {
            transport,
            sleeper,
            policy,
            dry_run,
        }
    }

    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    /// Deliver one segment, retrying retryable failures with backoff.
    ///
    /// # Errors
    ///
    /// Returns the [`SegmentFailure`] once the failure is terminal or the
    /// attempt budget is spent.
    pub async fn send_segment(
        &self,
        recipient: &str,
        segment: &Segment,
    ) -> Result<SegmentDelivery, SegmentFailure> {
        self.send_segment_until(recipient, segment, &Cancellation::new())
            .await
    }

    /// As [`Self::send_segment`], but no retry is started once `cancellation`
    /// is set. A call already handed to the transport always completes.
    ///
    /// # Errors
    ///
    /// Returns the [`SegmentFailure`] once the failure is terminal, the
    /// attempt budget is spent or the send was cancelled between attempts.
    pub async fn send_segment_until(
        &self,
        recipient: &str,
        segment: &Segment,
        cancellation: &Cancellation,
    ) -> Result<SegmentDelivery, SegmentFailure> {
        if self.dry_run {
            outgoing!(
                level = INFO,
                recipient,
                segment = segment.sequence_index,
                total = segment.total_segments,
                length = segment.len(),
                "Dry run, not sending"
            );
            return Ok(SegmentDelivery {
                provider_id: DRY_RUN_TOKEN.to_string(),
                attempts: 1,
            });
        }

        let text = segment.text();
        let mut state = AttemptState::Attempting(1);

        loop {
            state = match state {
                AttemptState::Attempting(attempt) => {
                    outgoing!(
                        recipient,
                        segment = segment.sequence_index,
                        total = segment.total_segments,
                        attempt,
                        "Sending segment"
                    );
                    let result = self.transport.send(recipient, &text).await;
                    self.policy.transition(attempt, result)
                }
                AttemptState::RetryWait {
                    next_attempt,
                    delay,
                    last_error,
                } => {
                    warn!(
                        recipient,
                        segment = segment.sequence_index,
                        attempt = next_attempt - 1,
                        remaining = self.policy.remaining_attempts(next_attempt - 1),
                        delay_secs = delay.as_secs_f64(),
                        error = %last_error,
                        "Segment send failed, retrying"
                    );
                    let interrupted = tokio::select! {
                        biased;
                        () = cancellation.cancelled() => true,
                        () = self.sleeper.sleep(delay) => cancellation.is_cancelled(),
                    };

                    if interrupted {
                        AttemptState::TerminalFailure(SegmentFailure {
                            error: SystemError::Cancelled.into(),
                            error_code: last_error.code,
                            attempts: next_attempt - 1,
                        })
                    } else {
                        AttemptState::Attempting(next_attempt)
                    }
                }
                AttemptState::Success(delivery) => {
                    internal!(
                        level = DEBUG,
                        recipient,
                        segment = segment.sequence_index,
                        provider_id = %delivery.provider_id,
                        attempts = delivery.attempts,
                        "Segment delivered"
                    );
                    return Ok(delivery);
                }
                AttemptState::TerminalFailure(failure) => {
                    warn!(
                        recipient,
                        segment = segment.sequence_index,
                        attempts = failure.attempts,
                        retryable = failure.retryable(),
                        error = %failure.error,
                        "Segment send failed"
                    );
                    return Err(failure);
                }
            };
        }
    }
}
