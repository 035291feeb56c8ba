//! Human-readable bulk report.

use std::fmt::Write;

use herald_delivery::{BulkReport, DeliveryOutcome};

/// One line per recipient after a short tally.
pub fn render_report(report: &BulkReport) -> String {
    let mut out = format!(
        "Total recipients: {}\nSuccessfully sent: {}\nFailed: {}\n",
        report.total_recipients, report.successful_count, report.failed_count
    );

    for entry in &report.per_recipient {
        let _ = match &entry.outcome {
            DeliveryOutcome::Delivered {
                provider_ids,
                attempts_used,
            } => writeln!(
                out,
                "  {}: delivered ({} segment(s), at most {attempts_used} attempt(s) each)",
                entry.recipient,
                provider_ids.len()
            ),
            DeliveryOutcome::Failed {
                reason,
                failing_segment_index,
                segments_sent_before_failure,
                total_segments,
                retryable,
                ..
            } => writeln!(
                out,
                "  {}: failed at segment {failing_segment_index}/{total_segments} \
                 ({segments_sent_before_failure} sent{}): {reason}",
                entry.recipient,
                if *retryable { ", retryable" } else { "" }
            ),
        };
    }

    out
}
