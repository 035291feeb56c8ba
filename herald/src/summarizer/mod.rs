//! Turning a category's headlines into briefing text.
//!
//! A [`Summarizer`] takes a prompt and returns text. Which backend answers is
//! chosen by [`SummarizerConfig::provider`]; any error it returns is replaced
//! by the headline fallback when the briefing is composed.

mod provider;

use std::{fmt, fmt::Write, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::briefing::Category;

pub use provider::{ClaudeSummarizer, GeminiSummarizer};
pub use test::ScriptedSummarizer;

/// Headlines per category included in a prompt.
pub const PROMPT_ARTICLES: usize = 10;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("Missing {provider} API key. Set the {var} environment variable")]
    MissingApiKey {
        provider: SummarizerProvider,
        var: &'static str,
    },

    #[error("No {0} client is available in this build")]
    Unavailable(SummarizerProvider),

    #[error("Summarizer returned no content")]
    Empty,

    #[error("Summarizer request failed: {0}")]
    Failed(String),
}

/// Text generation backend.
///
/// Implementations must be safe to share across tasks.
#[async_trait]
pub trait Summarizer: Send + Sync + fmt::Debug {
    /// Generate text for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns a [`SummarizeError`] if the backend can't produce text.
    async fn summarize(&self, prompt: &str) -> Result<String, SummarizeError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerProvider {
    #[default]
    Claude,
    Gemini,
}

impl SummarizerProvider {
    /// Environment variable holding the API key.
    pub const fn api_key_var(self) -> &'static str {
        match self {
            Self::Claude => "CLAUDE_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Claude => "claude-3-5-sonnet-20241022",
            Self::Gemini => "gemini-2.0-flash-exp",
        }
    }
}

impl fmt::Display for SummarizerProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claude => f.write_str("claude"),
            Self::Gemini => f.write_str("gemini"),
        }
    }
}

/// Summarizer section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Backend to use
    ///
    /// Default: `claude`
    #[serde(default)]
    pub provider: SummarizerProvider,

    /// Model name; the provider's default when unset
    #[serde(default)]
    pub model: Option<String>,
}

impl SummarizerConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Build the configured backend, taking its key from the environment.
    pub fn build(&self) -> Arc<dyn Summarizer> {
        let api_key = std::env::var(self.provider.api_key_var())
            .ok()
            .filter(|key| !key.is_empty());
        let model = self.model().to_string();

        match self.provider {
            SummarizerProvider::Claude => Arc::new(ClaudeSummarizer::new(api_key, model)),
            SummarizerProvider::Gemini => Arc::new(GeminiSummarizer::new(api_key, model)),
        }
    }
}

/// Prompt asking for an SMS-friendly summary of `headlines`.
pub fn prompt(category: Category, headlines: &[String]) -> String {
    let mut prompt = format!(
        "You are a news summarization assistant. Create a concise, SMS-friendly \
         summary covering {}.\n\nHere are today's top articles:\n",
        category.description()
    );

    for (i, headline) in headlines.iter().take(PROMPT_ARTICLES).enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, headline.trim());
    }

    prompt.push_str(
        "\nHighlight the 2-4 most important stories in clear, accessible language. \
         Do not use emojis or special formatting.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn prompt_lists_at_most_ten_headlines() {
        let headlines: Vec<String> = (1..=12).map(|i| format!(" Story {i} ")).collect();
        let prompt = prompt(Category::Ai, &headlines);

        assert!(prompt.contains("AI and machine learning developments"));
        assert!(prompt.contains("\n1. Story 1\n"));
        assert!(prompt.contains("\n10. Story 10\n"));
        assert!(!prompt.contains("Story 11"));
    }

    #[test]
    fn config_defaults_to_claude() {
        let config: SummarizerConfig = ron::from_str("()").expect("empty section");
        assert_eq!(config.provider, SummarizerProvider::Claude);
        assert_eq!(config.model(), "claude-3-5-sonnet-20241022");
    }

    #[test]
    fn explicit_model_overrides_default() {
        let config: SummarizerConfig =
            ron::from_str(r#"(provider: gemini, model: Some("gemini-pro"))"#).expect("valid");
        assert_eq!(config.provider, SummarizerProvider::Gemini);
        assert_eq!(config.model(), "gemini-pro");
        assert_eq!(config.provider.api_key_var(), "GEMINI_API_KEY");
    }
}
