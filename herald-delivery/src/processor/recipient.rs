//! Delivering every segment of one message to one recipient.

use herald_common::{internal, tracing::info};

use super::DeliveryProcessor;
use crate::{
    cancel::Cancellation,
    error::{DeliveryError, SystemError},
    executor::SegmentFailure,
    report::DeliveryOutcome,
    segment::Segment,
};

/// Text recorded for a failed recipient.
fn reason(error: &DeliveryError) -> String {
    match error {
        DeliveryError::System(SystemError::Cancelled) => "cancelled".to_string(),
        other => other.to_string(),
    }
}

fn failed(failure: &SegmentFailure, segment: &Segment, sent: usize) -> DeliveryOutcome {
    DeliveryOutcome::Failed {
        reason: reason(&failure.error),
        error_code: failure.error_code,
        failing_segment_index: segment.sequence_index,
        segments_sent_before_failure: sent,
        total_segments: segment.total_segments,
        retryable: failure.retryable(),
    }
}

impl DeliveryProcessor {
    /// Send `segments` to `recipient` in order, stopping at the first failure.
    pub(crate) async fn deliver_to(
        &self,
        recipient: &str,
        segments: &[Segment],
        cancellation: &Cancellation,
    ) -> DeliveryOutcome {
        let mut provider_ids = Vec::with_capacity(segments.len());
        let mut attempts_used = 0;

        for segment in segments {
            if cancellation.is_cancelled() {
                let failure = SegmentFailure {
                    error: SystemError::Cancelled.into(),
                    error_code: None,
                    attempts: 0,
                };
                return failed(&failure, segment, provider_ids.len());
            }

            match self
                .executor
                .send_segment_until(recipient, segment, cancellation)
                .await
            {
                Ok(delivery) => {
                    attempts_used = attempts_used.max(delivery.attempts);
                    provider_ids.push(delivery.provider_id);
                }
                Err(failure) => return failed(&failure, segment, provider_ids.len()),
            }

            let delay = self.config.inter_segment_delay();
            if !segment.is_last() && !delay.is_zero() {
                internal!(
                    recipient,
                    next = segment.sequence_index + 1,
                    delay_secs = delay.as_secs(),
                    "Pacing before next segment"
                );
                tokio::select! {
                    biased;
                    () = cancellation.cancelled() => {}
                    () = self.executor.sleeper().sleep(delay) => {}
                }
            }
        }

        info!(
            recipient,
            segments = provider_ids.len(),
            attempts_used,
            "Message delivered"
        );

        DeliveryOutcome::Delivered {
            provider_ids,
            attempts_used,
        }
    }
}
