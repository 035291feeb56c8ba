//! Typed error handling and classification for delivery operations.
//!
//! Transport failures are sorted into three categories:
//! - Permanent failures (bad or unreachable destination, opt-outs) - don't retry
//! - Temporary failures (rate limiting, upstream 5xx, anything unknown) - retry with backoff
//! - System errors - configuration problems and cancellation

use std::fmt;

use thiserror::Error;

/// Carrier error codes with a fixed classification.
pub mod codes {
    /// The destination address is not a valid number.
    pub const INVALID_DESTINATION: u32 = 21211;
    /// The destination cannot be reached.
    pub const UNREACHABLE_DESTINATION: u32 = 21214;
    /// The account is not permitted to send to this destination.
    pub const PERMISSION_NOT_ENABLED: u32 = 21408;
    /// The destination has opted out of messages from this sender.
    pub const OPTED_OUT: u32 = 21610;

    /// Too many requests.
    pub const RATE_LIMITED: u32 = 20429;
    /// Carrier-side internal error.
    pub const UPSTREAM_INTERNAL: u32 = 20500;
    /// Carrier service temporarily unavailable.
    pub const SERVICE_UNAVAILABLE: u32 = 20503;
}

/// The capability set the classifier works over.
///
/// A transport error may carry a numeric carrier code, an HTTP-like status,
/// both, or neither.
pub trait TransportFailure: fmt::Display {
    /// Carrier-specific numeric error code, if any.
    fn code(&self) -> Option<u32> {
        None
    }

    /// HTTP-like status of the failed call, if any.
    fn status(&self) -> Option<u16> {
        None
    }
}

/// Error raised by a [`crate::Transport`] for a single send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub code: Option<u32>,
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    /// An error reported by the carrier with both a code and a status.
    pub fn carrier(code: u32, status: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            status: Some(status),
            message: message.into(),
        }
    }

    /// An error with only a status (e.g. a proxy answering before the carrier).
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: Some(status),
            message: message.into(),
        }
    }

    /// An error with neither code nor status (I/O, timeouts, ...).
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        match (self.code, self.status) {
            (Some(code), Some(status)) => write!(f, " (code {code}, status {status})"),
            (Some(code), None) => write!(f, " (code {code})"),
            (None, Some(status)) => write!(f, " (status {status})"),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for TransportError {}

impl TransportFailure for TransportError {
    fn code(&self) -> Option<u32> {
        self.code
    }

    fn status(&self) -> Option<u16> {
        self.status
    }
}

/// Top-level delivery error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Permanent failure that must not be retried.
    #[error("Permanent failure: {0}")]
    Permanent(#[from] PermanentError),

    /// Temporary failure that can be retried with backoff.
    #[error("Temporary failure: {0}")]
    Temporary(#[from] TemporaryError),

    /// Engine-level error (configuration, cancellation).
    #[error("System error: {0}")]
    System(#[from] SystemError),
}

/// Permanent errors: the destination will not accept this message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermanentError {
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Destination unreachable: {0}")]
    Unreachable(String),

    #[error("Sending not permitted: {0}")]
    NotPermitted(String),

    #[error("Destination opted out: {0}")]
    OptedOut(String),
}

/// Temporary errors: expected to clear on their own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemporaryError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Upstream internal error: {0}")]
    UpstreamInternal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any other server-side (>= 500) failure.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Nothing identified the error; retried optimistically.
    #[error("Unclassified error: {0}")]
    Unclassified(String),

    /// Every permitted attempt failed with a temporary error.
    #[error("Max retries exceeded after {attempts} attempts (last error: {last})")]
    RetriesExhausted { attempts: u32, last: String },
}

/// Engine-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SystemError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The bulk send was cancelled before this recipient finished.
    #[error("Delivery cancelled")]
    Cancelled,

    /// A recipient worker stopped without producing an outcome.
    #[error("Delivery task failed: {0}")]
    TaskFailed(String),
}

impl DeliveryError {
    /// Returns `true` if this error is temporary and should be retried.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        matches!(self, Self::Temporary(_))
    }

    /// Returns `true` if this error is permanent and should not be retried.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    /// Returns `true` if this is a system error.
    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self, Self::System(_))
    }

    /// Whether a later attempt at the same delivery could succeed.
    ///
    /// Cancellation counts as retryable: nothing about the destination failed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Temporary(_) | Self::System(SystemError::Cancelled)
        )
    }
}

/// Classify a transport failure.
///
/// Known terminal codes are permanent, known transient codes and any
/// status >= 500 are temporary, and everything else is treated as temporary
/// so that one unrecognised error never silently drops a recipient.
pub fn classify<E: TransportFailure + ?Sized>(error: &E) -> DeliveryError {
    let detail = error.to_string();

    match error.code() {
        Some(codes::INVALID_DESTINATION) => PermanentError::InvalidDestination(detail).into(),
        Some(codes::UNREACHABLE_DESTINATION) => PermanentError::Unreachable(detail).into(),
        Some(codes::PERMISSION_NOT_ENABLED) => PermanentError::NotPermitted(detail).into(),
        Some(codes::OPTED_OUT) => PermanentError::OptedOut(detail).into(),
        Some(codes::RATE_LIMITED) => TemporaryError::RateLimited(detail).into(),
        Some(codes::UPSTREAM_INTERNAL) => TemporaryError::UpstreamInternal(detail).into(),
        Some(codes::SERVICE_UNAVAILABLE) => TemporaryError::ServiceUnavailable(detail).into(),
        _ if error.status().is_some_and(|status| status >= 500) => {
            TemporaryError::ServerError(detail).into()
        }
        _ => TemporaryError::Unclassified(detail).into(),
    }
}

/// Returns `true` if the failure should be retried.
pub fn is_retryable<E: TransportFailure + ?Sized>(error: &E) -> bool {
    classify(error).is_retryable()
}

impl From<TransportError> for DeliveryError {
    fn from(error: TransportError) -> Self {
        classify(&error)
    }
}
