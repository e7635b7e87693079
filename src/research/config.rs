//! Researcher configuration.

use crate::sources::USER_AGENT;
use std::time::Duration;

/// Configuration for the researcher, built once at process start.
#[derive(Clone, Debug)]
pub struct ResearchConfig {
    /// NewsAPI key
    pub news_api_key: Option<String>,
    /// OpenAI key
    pub openai_api_key: Option<String>,
    /// The completion model (e.g., "gpt-3.5-turbo")
    pub model: String,
    /// Output budget for the future-plans completion
    pub max_tokens: u32,
    /// Sentences kept from the encyclopedia summary
    pub summary_sentences: usize,
    /// Articles kept from the news service (at most 5)
    pub news_page_size: usize,
    /// Search results scanned for a profile link
    pub profile_results: usize,
    /// Candidate pages tried for future plans
    pub future_plans_results: usize,
    /// Paragraphs extracted from each candidate page
    pub paragraph_limit: usize,
    /// Timeout for each candidate page fetch
    pub page_timeout: Duration,
    /// `User-Agent` header sent to every outbound service
    pub user_agent: String,
}

/// Upper bound on articles in a report.
pub const MAX_NEWS: usize = 5;

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            openai_api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 200,
            summary_sentences: 5,
            news_page_size: MAX_NEWS,
            profile_results: 5,
            future_plans_results: 3,
            paragraph_limit: 10,
            page_timeout: Duration::from_secs(5),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ResearchConfig {
    /// Create a config with the default limits and no keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the NewsAPI key.
    pub fn news_api_key(mut self, key: impl Into<String>) -> Self {
        self.news_api_key = Some(key.into());
        self
    }

    /// Set the OpenAI key.
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the completion model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the max tokens for the completion.
    pub fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = n;
        self
    }

    /// Set how many summary sentences to keep.
    pub fn summary_sentences(mut self, n: usize) -> Self {
        self.summary_sentences = n;
        self
    }

    /// Set the news page size, clamped to [`MAX_NEWS`].
    pub fn news_page_size(mut self, n: usize) -> Self {
        self.news_page_size = n.min(MAX_NEWS);
        self
    }

    /// Set how many search results are scanned for a profile.
    pub fn profile_results(mut self, n: usize) -> Self {
        self.profile_results = n;
        self
    }

    /// Set how many candidate pages are tried for future plans.
    pub fn future_plans_results(mut self, n: usize) -> Self {
        self.future_plans_results = n;
        self
    }

    /// Set how many paragraphs are taken from a page.
    pub fn paragraph_limit(mut self, n: usize) -> Self {
        self.paragraph_limit = n;
        self
    }

    /// Set the page fetch timeout.
    pub fn page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Set the user agent for outbound requests.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
