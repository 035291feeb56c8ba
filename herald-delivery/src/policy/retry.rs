//! Retry policy for segment sends.
//!
//! The delay before attempt `n + 1` is `initial * 2^(n - 1)`, capped at
//! `max_backoff_seconds` and optionally jittered.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Retry configuration for a single segment send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per segment, including the first.
    ///
    /// Default: 5
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Wait before the second attempt (in seconds); doubled for each further attempt.
    ///
    /// Default: 1.0
    #[serde(default = "defaults::initial_backoff_seconds")]
    pub initial_backoff_seconds: f64,

    /// Upper bound for a single wait (in seconds).
    ///
    /// Default: 300.0
    #[serde(default = "defaults::max_backoff_seconds")]
    pub max_backoff_seconds: f64,

    /// Randomises each wait within ±`retry_jitter_factor`.
    ///
    /// Default: 0.0 (exact doubling)
    #[serde(default = "defaults::retry_jitter_factor")]
    pub retry_jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: defaults::max_retries(),
            initial_backoff_seconds: defaults::initial_backoff_seconds(),
            max_backoff_seconds: defaults::max_backoff_seconds(),
            retry_jitter_factor: defaults::retry_jitter_factor(),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether another attempt is allowed after `attempt_count` attempts.
    #[must_use]
    pub const fn should_retry(&self, attempt_count: u32) -> bool {
        attempt_count < self.max_retries
    }

    /// Number of attempts still available.
    #[must_use]
    pub const fn remaining_attempts(&self, attempt_count: u32) -> u32 {
        self.max_retries.saturating_sub(attempt_count)
    }

    /// Check if `attempt` (1-based) is the last one allowed.
    #[must_use]
    pub const fn is_final_attempt(&self, attempt: u32) -> bool {
        attempt >= self.max_retries
    }

    /// How long to wait after failed attempt `attempt` (1-based).
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1))
            .unwrap_or(i32::MAX)
            .min(1023);
        let delay = (self.initial_backoff_seconds * 2f64.powi(exponent)).min(self.max_backoff_seconds);

        let delay = if self.retry_jitter_factor > 0.0 {
            let jitter_range = delay * self.retry_jitter_factor;
            let jitter: f64 = rand::rng().random_range(-jitter_range..=jitter_range);
            (delay + jitter).max(0.0)
        } else {
            delay
        };

        Duration::try_from_secs_f64(delay).unwrap_or(Duration::ZERO)
    }

    /// The full wait sequence for a segment that never succeeds.
    #[must_use]
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_retries).map(|attempt| self.backoff_delay(attempt)).collect()
    }
}

pub(crate) mod defaults {
    pub const fn max_retries() -> u32 {
        5
    }

    pub const fn initial_backoff_seconds() -> f64 {
        1.0
    }

    pub const fn max_backoff_seconds() -> f64 {
        300.0 // 5 minutes
    }

    pub const fn retry_jitter_factor() -> f64 {
        0.0
    }
}
