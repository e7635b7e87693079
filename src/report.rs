//! The aggregated report and its parts.
//!
//! A [`Report`] is always fully populated: every field holds either a real
//! value or one of the sentinel strings defined here.

use serde::{Deserialize, Serialize};

/// Summary text used when the knowledge service lookup fails.
pub const NO_SUMMARY: &str = "No summary found.";

/// Profile link used when no search result matches.
pub const PROFILE_NOT_FOUND: &str = "Not found";

/// Future-plans text when no candidate page yielded text.
pub const NO_FUTURE_PLANS: &str = "No future plans information found.";

/// Future-plans text when the web search itself failed.
pub const SEARCH_FAILED: &str = "Could not perform future plans search.";

/// Future-plans text when the completion service failed.
pub const SUMMARIZER_FAILED: &str = "Could not retrieve summary from OpenAI.";

/// Short encyclopedia summary with its canonical page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub text: String,
    pub source_url: Option<String>,
}

impl SummaryResult {
    /// The sentinel result for a failed lookup.
    pub fn not_found() -> Self {
        Self {
            text: NO_SUMMARY.to_string(),
            source_url: None,
        }
    }
}

/// Publisher of a news article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// One article as returned by the news service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub source: NewsSource,
}

/// The merged research record for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub subject: String,
    pub summary: String,
    pub source_url: Option<String>,
    pub news: Vec<NewsArticle>,
    pub linkedin: String,
    pub future_plans: String,
}

impl Report {
    /// Merge the outputs of the four lookups.
    pub fn new(
        subject: impl Into<String>,
        summary: SummaryResult,
        news: Vec<NewsArticle>,
        linkedin: String,
        future_plans: String,
    ) -> Self {
        Self {
            subject: subject.into(),
            summary: summary.text,
            source_url: summary.source_url,
            news,
            linkedin,
            future_plans,
        }
    }

    /// Field names and rendered values, in export order.
    pub fn export_fields(&self) -> Vec<(&'static str, String)> {
        let news = self
            .news
            .iter()
            .map(|a| format!("{} ({})", a.title, a.url))
            .collect::<Vec<_>>()
            .join("; ");

        vec![
            ("summary", self.summary.clone()),
            ("url", self.source_url.clone().unwrap_or_default()),
            ("news", news),
            ("linkedin", self.linkedin.clone()),
            ("future_plans", self.future_plans.clone()),
        ]
    }
}
