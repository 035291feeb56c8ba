//! Test support utilities for end-to-end briefing delivery
#![allow(dead_code)] // Test utility module - not all helpers used in every test

use std::path::PathBuf;

use herald::{CategoryDigest, Digest, ScriptedSummarizer, SummarizeError};
use tempfile::TempDir;

/// Write `content` as a config file inside a fresh temp dir.
pub fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("herald.config.ron");
    std::fs::write(&path, content).expect("write config");
    (dir, path)
}

/// A digest with headlines for two categories.
pub fn sample_digest() -> Digest {
    Digest {
        general: CategoryDigest {
            headlines: vec!["Trade summit opens".to_string()],
        },
        tech: CategoryDigest {
            headlines: (1..=6).map(|i| format!("Tech headline number {i}")).collect(),
        },
        ..Digest::default()
    }
}

/// Summarizer that answers for the first category and fails the second.
pub fn flaky_summarizer() -> ScriptedSummarizer {
    ScriptedSummarizer::new().script([
        Ok("Leaders met to discuss trade. Markets rallied on the news, and analysts \
            expect the momentum to continue through the week."
            .to_string()),
        Err(SummarizeError::Failed("service overloaded".to_string())),
    ])
}
