//! Page fetching and paragraph extraction.

use super::{PageFetcher, USER_AGENT, http_agent};
use crate::error::{Error, Result};
use scraper::{Html, Selector};
use std::time::Duration;

/// Fetches pages over HTTP with a bounded timeout.
pub struct HttpFetcher {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: http_agent(Some(timeout)),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Set the `User-Agent` sent with every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let mut resp = self
            .agent
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "text/html")
            .call()?;

        Ok(resp.body_mut().read_to_string()?)
    }
}

/// Text of the first `limit` `<p>` elements, joined with single spaces.
pub fn extract_paragraphs(html: &str, limit: usize) -> Result<String> {
    let doc = Html::parse_document(html);
    let paragraph = Selector::parse("p").map_err(|e| Error::Selector(e.to_string()))?;

    Ok(doc
        .select(&paragraph)
        .take(limit)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" "))
}
