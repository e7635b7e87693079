//! External collaborators the researcher talks to.
//!
//! Each service sits behind a small blocking trait so the researcher can be
//! driven by the HTTP-backed implementations in production and by in-memory
//! fakes in tests.

mod news;
mod openai;
mod page;
mod search;
mod wikipedia;

#[cfg(test)]
pub(crate) mod testing;

pub use news::NewsApi;
pub use openai::OpenAi;
pub use page::{HttpFetcher, extract_paragraphs};
pub use search::{DuckDuckGo, parse_results};
pub use wikipedia::Wikipedia;

use crate::error::Result;
use crate::report::{NewsArticle, SummaryResult};
use std::time::Duration;

/// Default browser-like user agent; several services reject bare clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Encyclopedia-style knowledge service.
pub trait KnowledgeService: Send + Sync {
    /// Summary of at most `sentences` sentences plus the canonical page link.
    fn summary(&self, subject: &str, sentences: usize) -> Result<SummaryResult>;
}

/// News-article search service.
pub trait NewsService: Send + Sync {
    /// Recent articles mentioning `subject`, newest first.
    fn articles(&self, subject: &str, page_size: usize) -> Result<Vec<NewsArticle>>;
}

/// General web search returning result URLs in rank order.
pub trait WebSearch: Send + Sync {
    fn search(&self, query: &str, num_results: usize) -> Result<Vec<String>>;
}

/// Fetches raw HTML for a URL.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Single-shot language-model completion.
pub trait CompletionService: Send + Sync {
    /// Text of the first returned choice.
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// Build a ureq agent, optionally bounded by a global timeout.
pub(crate) fn http_agent(timeout: Option<Duration>) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(timeout)
        .build();
    ureq::Agent::new_with_config(config)
}
