//! Daily briefing composition.
//!
//! Each category's headlines go to a [`Summarizer`]. A category whose
//! summary fails or comes back empty falls back to a numbered list of its
//! top headlines; a category with no headlines is left out.

use std::fmt::Write;

use chrono::NaiveDate;
use herald_common::{
    internal,
    tracing::{info, warn},
};
use serde::{Deserialize, Serialize};

use crate::summarizer::{self, SummarizeError, Summarizer};

const RULE_WIDTH: usize = 40;
const FALLBACK_HEADLINES: usize = 5;
const HEADLINE_WIDTH: usize = 80;
const FOOTER: &str = "Stay informed! Reply STOP to unsubscribe.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Ai,
    Tech,
    Local,
}

impl Category {
    /// Briefing order.
    pub const ALL: [Self; 4] = [Self::General, Self::Ai, Self::Tech, Self::Local];

    /// Section heading in the briefing.
    pub const fn heading(self) -> &'static str {
        match self {
            Self::General => "WORLD NEWS",
            Self::Ai => "AI & MACHINE LEARNING",
            Self::Tech => "TECHNOLOGY",
            Self::Local => "LOCAL NEWS",
        }
    }

    /// Title line of a headline-list fallback.
    pub const fn fallback_label(self) -> &'static str {
        match self {
            Self::General => "GENERAL NEWS",
            Self::Ai => "AI NEWS",
            Self::Tech => "TECH NEWS",
            Self::Local => "LOCAL NEWS",
        }
    }

    /// What the summarizer is asked to cover.
    pub const fn description(self) -> &'static str {
        match self {
            Self::General => "world news and current events",
            Self::Ai => "AI and machine learning developments",
            Self::Tech => "technology industry news and innovations",
            Self::Local => "local news and community updates",
        }
    }
}

/// Article titles gathered for one category, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDigest {
    #[serde(default)]
    pub headlines: Vec<String>,
}

/// One day's input to [`compose`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    #[serde(default)]
    pub general: CategoryDigest,
    #[serde(default)]
    pub ai: CategoryDigest,
    #[serde(default)]
    pub tech: CategoryDigest,
    #[serde(default)]
    pub local: CategoryDigest,
}

impl Digest {
    pub const fn get(&self, category: Category) -> &CategoryDigest {
        match category {
            Category::General => &self.general,
            Category::Ai => &self.ai,
            Category::Tech => &self.tech,
            Category::Local => &self.local,
        }
    }
}

/// Plain-text stand-in for a failed summary.
pub fn fallback_summary(category: Category, headlines: &[String]) -> String {
    let mut summary = format!("{}\n\n", category.fallback_label());

    for (i, headline) in headlines.iter().take(FALLBACK_HEADLINES).enumerate() {
        let title = headline.trim();
        let title = if title.is_empty() { "No title" } else { title };
        let title: String = title.chars().take(HEADLINE_WIDTH).collect();
        let _ = writeln!(summary, "{}. {title}", i + 1);
    }

    summary
}

/// The text for `category`, if it has anything to say.
async fn section_text(
    category: Category,
    headlines: &[String],
    summarizer: &dyn Summarizer,
) -> Option<String> {
    if headlines.is_empty() {
        internal!(?category, "No content, skipping category");
        return None;
    }

    let prompt = summarizer::prompt(category, headlines);
    let result = summarizer
        .summarize(&prompt)
        .await
        .and_then(|summary| {
            let summary = summary.trim();
            if summary.is_empty() {
                Err(SummarizeError::Empty)
            } else {
                Ok(summary.to_string())
            }
        });

    match result {
        Ok(summary) => {
            internal!(
                ?category,
                length = summary.chars().count(),
                "Summary generated"
            );
            Some(summary)
        }
        Err(error) => {
            warn!(
                ?category,
                headlines = headlines.len(),
                %error,
                "Summary failed, using headline fallback"
            );
            Some(fallback_summary(category, headlines))
        }
    }
}

/// Assemble the full briefing for `date`, summarising each category with
/// `summarizer`.
pub async fn compose(digest: &Digest, summarizer: &dyn Summarizer, date: NaiveDate) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut briefing = format!("DAILY NEWS BRIEFING\n{}\n{rule}\n\n", date.format("%B %d, %Y"));

    for category in Category::ALL {
        let Some(text) = section_text(category, &digest.get(category).headlines, summarizer).await
        else {
            continue;
        };

        let heading = category.heading();
        if !text.contains(heading) {
            let _ = write!(
                briefing,
                "\n{heading}\n{}\n",
                "-".repeat(heading.chars().count())
            );
        }

        briefing.push_str(&text);
        briefing.push_str("\n\n");
    }

    briefing.push_str(&rule);
    briefing.push('\n');
    briefing.push_str(FOOTER);

    info!(length = briefing.chars().count(), "Daily briefing composed");

    briefing
}
