use async_trait::async_trait;
use herald_common::internal;

use super::{SummarizeError, Summarizer, SummarizerProvider};

/// Shared state of the hosted backends.
#[derive(Debug, Clone)]
struct Hosted {
    provider: SummarizerProvider,
    api_key: Option<String>,
    model: String,
}

impl Hosted {
    fn request(&self, prompt: &str) -> Result<String, SummarizeError> {
        if self.api_key.is_none() {
            return Err(SummarizeError::MissingApiKey {
                provider: self.provider,
                var: self.provider.api_key_var(),
            });
        }

        internal!(
            provider = %self.provider,
            model = %self.model,
            prompt_length = prompt.chars().count(),
            "Summary requested"
        );

        // TODO: wire an HTTP client for the messages/generateContent endpoints
        Err(SummarizeError::Unavailable(self.provider))
    }
}

/// Anthropic Claude backend.
#[derive(Debug, Clone)]
pub struct ClaudeSummarizer(Hosted);

impl ClaudeSummarizer {
    pub const fn new(api_key: Option<String>, model: String) -> Self {
        Self(Hosted {
            provider: SummarizerProvider::Claude,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Summarizer for ClaudeSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, SummarizeError> {
        self.0.request(prompt)
    }
}

/// Google Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiSummarizer(Hosted);

impl GeminiSummarizer {
    pub const fn new(api_key: Option<String>, model: String) -> Self {
        Self(Hosted {
            provider: SummarizerProvider::Gemini,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, SummarizeError> {
        self.0.request(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_reported_by_name() {
        let error = GeminiSummarizer::new(None, "gemini-2.0-flash-exp".to_string())
            .summarize("prompt")
            .await
            .expect_err("no key");

        assert!(matches!(
            error,
            SummarizeError::MissingApiKey {
                provider: SummarizerProvider::Gemini,
                var: "GEMINI_API_KEY",
            }
        ));
        assert!(error.to_string().contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn keyed_backend_without_client_is_unavailable() {
        let error = ClaudeSummarizer::new(Some("key".to_string()), "model".to_string())
            .summarize("prompt")
            .await
            .expect_err("no client");

        assert!(matches!(
            error,
            SummarizeError::Unavailable(SummarizerProvider::Claude)
        ));
    }
}
