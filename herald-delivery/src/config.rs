//! Delivery engine configuration.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{error::SystemError, policy::RetryPolicy, policy::retry::defaults};

const fn default_inter_segment_delay() -> u64 {
    5
}

const fn default_max_concurrent_recipients() -> usize {
    1
}

/// How long a single outbound segment may be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Short segments, one carrier message each.
    #[default]
    #[serde(alias = "segmented")]
    Segment,
    /// Long messages the carrier concatenates itself.
    #[serde(alias = "extended")]
    Long,
}

impl DeliveryMode {
    /// Maximum characters per segment in this mode.
    #[must_use]
    pub const fn max_length(self) -> usize {
        match self {
            Self::Segment => 120,
            Self::Long => 1600,
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Segment => f.write_str("segment"),
            Self::Long => f.write_str("long"),
        }
    }
}

impl FromStr for DeliveryMode {
    type Err = SystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "segment" | "segmented" => Ok(Self::Segment),
            "long" | "extended" => Ok(Self::Long),
            other => Err(SystemError::Configuration(format!(
                "unknown delivery mode '{other}' (expected 'segment' or 'long')"
            ))),
        }
    }
}

/// Configuration for a [`crate::DeliveryProcessor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Segment length limit.
    ///
    /// Default: `segment` (120 characters)
    #[serde(default)]
    pub mode: DeliveryMode,

    /// Skip the outbound call and report every segment as delivered.
    #[serde(default)]
    pub dry_run: bool,

    /// Total attempts per segment, including the first.
    ///
    /// Default: 5
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// First wait between attempts (in seconds), doubled after each failure.
    ///
    /// Default: 1.0
    #[serde(default = "defaults::initial_backoff_seconds")]
    pub initial_backoff_seconds: f64,

    /// Cap on a single backoff wait (in seconds).
    ///
    /// Default: 300.0
    #[serde(default = "defaults::max_backoff_seconds")]
    pub max_backoff_seconds: f64,

    /// Jitter applied to backoff waits (0.0 to 1.0).
    ///
    /// Default: 0.0
    #[serde(default = "defaults::retry_jitter_factor")]
    pub retry_jitter_factor: f64,

    /// Pause between consecutive segments to the same recipient (in seconds).
    ///
    /// Default: 5
    #[serde(default = "default_inter_segment_delay")]
    pub inter_segment_delay_seconds: u64,

    /// How many recipients are served at once.
    ///
    /// Default: 1 (strictly sequential)
    #[serde(default = "default_max_concurrent_recipients")]
    pub max_concurrent_recipients: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::default(),
            dry_run: false,
            max_retries: defaults::max_retries(),
            initial_backoff_seconds: defaults::initial_backoff_seconds(),
            max_backoff_seconds: defaults::max_backoff_seconds(),
            retry_jitter_factor: defaults::retry_jitter_factor(),
            inter_segment_delay_seconds: default_inter_segment_delay(),
            max_concurrent_recipients: default_max_concurrent_recipients(),
        }
    }
}

impl DeliveryConfig {
    /// Segment length limit for the configured mode.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.mode.max_length()
    }

    #[must_use]
    pub const fn inter_segment_delay(&self) -> Duration {
        Duration::from_secs(self.inter_segment_delay_seconds)
    }

    /// The retry policy applied to every segment.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff_seconds: self.initial_backoff_seconds,
            max_backoff_seconds: self.max_backoff_seconds,
            retry_jitter_factor: self.retry_jitter_factor,
        }
    }

    /// Check the configuration before any send is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::Configuration`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), SystemError> {
        if self.max_retries == 0 {
            return Err(SystemError::Configuration(
                "max_retries must be at least 1".to_string(),
            ));
        }

        for (name, value) in [
            ("initial_backoff_seconds", self.initial_backoff_seconds),
            ("max_backoff_seconds", self.max_backoff_seconds),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SystemError::Configuration(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.retry_jitter_factor) {
            return Err(SystemError::Configuration(format!(
                "retry_jitter_factor must be between 0.0 and 1.0, got {}",
                self.retry_jitter_factor
            )));
        }

        if self.max_concurrent_recipients == 0 {
            return Err(SystemError::Configuration(
                "max_concurrent_recipients must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
