//! Daily briefing delivery
//!
//! Composes the briefing text through a summarizer, loads the subscriber
//! list and hands both to the [`herald_delivery`] engine.

pub mod briefing;
pub mod config;
pub mod console;
pub mod render;
pub mod summarizer;

pub use briefing::{Category, CategoryDigest, Digest, compose};
pub use config::{ConfigError, HeraldConfig};
pub use console::ConsoleTransport;
pub use render::render_report;
pub use summarizer::{
    ScriptedSummarizer, SummarizeError, Summarizer, SummarizerConfig, SummarizerProvider,
};
