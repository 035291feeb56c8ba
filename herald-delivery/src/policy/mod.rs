//! Policy abstractions for delivery operations.
//!
//! - [`RetryPolicy`]: how many attempts a segment gets and how long to wait
//!   between them

pub mod retry;

pub use retry::RetryPolicy;
