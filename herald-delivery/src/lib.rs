//! Segmenting bulk delivery engine
//!
//! This crate provides functionality to:
//! - Split a message into marked segments that fit a carrier's length limit
//! - Classify transport failures as retryable or terminal
//! - Send each segment with exponential-backoff retry
//! - Deliver one message to many recipients and report per-recipient outcomes

mod cancel;
mod config;
mod error;
mod executor;
pub mod policy;
mod processor;
mod report;
pub mod segment;
pub mod sleep;
pub mod transport;

// Re-export error types
pub use error::{
    DeliveryError, PermanentError, SystemError, TemporaryError, TransportError, TransportFailure,
    classify, codes, is_retryable,
};
// Re-export core types
pub use cancel::Cancellation;
pub use config::{DeliveryConfig, DeliveryMode};
pub use executor::{AttemptState, DeliveryExecutor, SegmentDelivery, SegmentFailure};
pub use policy::RetryPolicy;
pub use processor::DeliveryProcessor;
pub use report::{BulkReport, DeliveryOutcome, RecipientReport};
pub use segment::{Segment, segment};
pub use sleep::{RecordingSleeper, Sleeper, TokioSleeper};
pub use transport::{DRY_RUN_TOKEN, TestTransport, Transport};
