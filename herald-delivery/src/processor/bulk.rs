//! Fan-out of one message over many recipients.

use std::sync::Arc;

use herald_common::{
    internal,
    tracing::{error, info},
};
use tokio::task::JoinSet;

use super::DeliveryProcessor;
use crate::{
    cancel::Cancellation,
    error::SystemError,
    report::{BulkReport, DeliveryOutcome, RecipientReport},
    segment::Segment,
};

impl DeliveryProcessor {
    /// Deliver `message` to every recipient.
    ///
    /// Never fails as a whole: each recipient's result is recorded in the
    /// returned report, in input order.
    pub async fn send_bulk<S: AsRef<str>>(&self, message: &str, recipients: &[S]) -> BulkReport {
        self.send_bulk_until(message, recipients, &Cancellation::new())
            .await
    }

    /// As [`Self::send_bulk`], but stops starting new segment sends once
    /// `cancellation` is set. Interrupted and unstarted recipients are
    /// reported as retryable failures.
    pub async fn send_bulk_until<S: AsRef<str>>(
        &self,
        message: &str,
        recipients: &[S],
        cancellation: &Cancellation,
    ) -> BulkReport {
        let segments: Arc<[Segment]> = self.segment(message).into();
        let workers = self.config.max_concurrent_recipients.min(recipients.len());

        info!(
            recipients = recipients.len(),
            segments = segments.len(),
            workers,
            dry_run = self.config.dry_run,
            "Starting bulk delivery"
        );

        let mut report = BulkReport::with_capacity(recipients.len());

        if workers <= 1 {
            for recipient in recipients {
                let recipient = recipient.as_ref();
                let outcome = self.deliver_to(recipient, &segments, cancellation).await;
                report.record(RecipientReport {
                    recipient: recipient.to_string(),
                    outcome,
                });
            }
        } else {
            for entry in self
                .fan_out(&segments, recipients, workers, cancellation)
                .await
            {
                report.record(entry);
            }
        }

        info!(
            total = report.total_recipients,
            successful = report.successful_count,
            failed = report.failed_count,
            "Bulk delivery finished"
        );

        report
    }

    /// Serve recipients through at most `workers` concurrent tasks, returning
    /// reports in input order.
    async fn fan_out<S: AsRef<str>>(
        &self,
        segments: &Arc<[Segment]>,
        recipients: &[S],
        workers: usize,
        cancellation: &Cancellation,
    ) -> Vec<RecipientReport> {
        let mut slots: Vec<Option<RecipientReport>> = vec![None; recipients.len()];
        let mut pending = recipients
            .iter()
            .map(|recipient| recipient.as_ref().to_string())
            .enumerate();
        let mut join_set: JoinSet<(usize, RecipientReport)> = JoinSet::new();

        // Spawn initial batch of tasks (up to workers)
        for (index, recipient) in pending.by_ref().take(workers) {
            self.spawn_recipient(&mut join_set, index, recipient, segments, cancellation);
        }

        // As tasks complete, spawn new ones for remaining recipients
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, report)) => {
                    internal!(index, recipient = %report.recipient, "Recipient finished");
                    slots[index] = Some(report);
                }
                Err(e) => error!(error = %e, "Recipient worker failed"),
            }

            if let Some((index, recipient)) = pending.next() {
                self.spawn_recipient(&mut join_set, index, recipient, segments, cancellation);
            }
        }

        recipients
            .iter()
            .zip(slots)
            .map(|(recipient, slot)| {
                slot.unwrap_or_else(|| RecipientReport {
                    recipient: recipient.as_ref().to_string(),
                    outcome: DeliveryOutcome::Failed {
                        reason: SystemError::TaskFailed("worker stopped".to_string()).to_string(),
                        error_code: None,
                        failing_segment_index: 1,
                        segments_sent_before_failure: 0,
                        total_segments: segments.len(),
                        retryable: false,
                    },
                })
            })
            .collect()
    }

    fn spawn_recipient(
        &self,
        join_set: &mut JoinSet<(usize, RecipientReport)>,
        index: usize,
        recipient: String,
        segments: &Arc<[Segment]>,
        cancellation: &Cancellation,
    ) {
        let processor = self.clone();
        let segments = Arc::clone(segments);
        let cancellation = cancellation.clone();

        join_set.spawn(async move {
            let outcome = processor
                .deliver_to(&recipient, &segments, &cancellation)
                .await;
            (index, RecipientReport { recipient, outcome })
        });
    }
}
