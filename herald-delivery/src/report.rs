//! Outcomes of a bulk send.

use serde::{Deserialize, Serialize};

/// What happened to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// Every segment was accepted.
    Delivered {
        /// One identifier per segment, in segment order.
        provider_ids: Vec<String>,
        /// Highest attempt count any single segment needed.
        attempts_used: u32,
    },
    /// A segment failed; later segments were not sent.
    Failed {
        reason: String,
        /// Carrier code of the final transport error, if any.
        error_code: Option<u32>,
        /// 1-based index of the segment that failed.
        failing_segment_index: usize,
        segments_sent_before_failure: usize,
        total_segments: usize,
        /// Whether a later run could succeed for this recipient.
        retryable: bool,
    },
}

impl DeliveryOutcome {
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Segments the recipient actually received.
    #[must_use]
    pub fn segments_sent(&self) -> usize {
        match self {
            Self::Delivered { provider_ids, .. } => provider_ids.len(),
            Self::Failed {
                segments_sent_before_failure,
                ..
            } => *segments_sent_before_failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientReport {
    pub recipient: String,
    pub outcome: DeliveryOutcome,
}

/// Aggregate result of one bulk send, one entry per recipient in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReport {
    pub total_recipients: usize,
    pub successful_count: usize,
    pub failed_count: usize,
    pub per_recipient: Vec<RecipientReport>,
}

impl BulkReport {
    pub(crate) fn with_capacity(total_recipients: usize) -> Self {
        Self {
            total_recipients,
            per_recipient: Vec::with_capacity(total_recipients),
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, report: RecipientReport) {
        if report.outcome.is_delivered() {
            self.successful_count += 1;
        } else {
            self.failed_count += 1;
        }
        self.per_recipient.push(report);
    }

    #[must_use]
    pub const fn all_delivered(&self) -> bool {
        self.failed_count == 0
    }

    pub fn outcome_for(&self, recipient: &str) -> Option<&DeliveryOutcome> {
        self.per_recipient
            .iter()
            .find(|report| report.recipient == recipient)
            .map(|report| &report.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecipientReport> {
        self.per_recipient
            .iter()
            .filter(|report| !report.outcome.is_delivered())
    }
}
