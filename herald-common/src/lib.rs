//! Pieces shared by every herald crate: logging setup, the logging macros and
//! the process-wide shutdown [`Signal`].

pub mod logging;

pub use tracing;

/// Lifecycle signals broadcast to long-running tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Stop issuing new work and wind down.
    Shutdown,
    /// All work has completed and the process is about to exit.
    Finalised,
}
