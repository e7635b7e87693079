//! Wikipedia-backed knowledge service.

use super::{KnowledgeService, USER_AGENT, http_agent};
use crate::error::{Error, Result};
use crate::report::SummaryResult;
use serde::Deserialize;
use std::collections::HashMap;

const DEFAULT_BASE: &str = "https://en.wikipedia.org";

#[derive(Deserialize)]
struct QueryResponse {
    /// Absent when the search has no hits.
    query: Option<QueryPages>,
}

#[derive(Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: String,
    fullurl: Option<String>,
    #[serde(default)]
    pageprops: HashMap<String, serde_json::Value>,
    #[serde(default)]
    missing: bool,
    /// Search rank when the page came from the search generator.
    index: Option<u32>,
}

/// Resolves a subject with the MediaWiki search generator and reads the
/// page's plain-text intro through TextExtracts.
///
/// Sentence counting is done by the server (`exsentences`), which knows
/// that "Inc." or "Corp." do not end a sentence.
pub struct Wikipedia {
    agent: ureq::Agent,
    base: String,
    user_agent: String,
}

impl Wikipedia {
    pub fn new() -> Self {
        Self::with_base(DEFAULT_BASE)
    }

    /// Point at a different MediaWiki host (another language edition).
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            agent: http_agent(None),
            base: base.into(),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Set the `User-Agent` sent with every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for Wikipedia {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeService for Wikipedia {
    fn summary(&self, subject: &str, sentences: usize) -> Result<SummaryResult> {
        let mut request = self
            .agent
            .get(format!("{}/w/api.php", self.base))
            .query("action", "query")
            .query("format", "json")
            .query("formatversion", "2")
            .query("redirects", "1")
            .query("generator", "search")
            .query("gsrsearch", subject)
            .query("gsrlimit", "1")
            .query("prop", "extracts|pageprops|info")
            .query("ppprop", "disambiguation")
            .query("inprop", "url")
            .query("exintro", "1")
            .query("explaintext", "1");
        if sentences > 0 {
            request = request.query("exsentences", sentences.to_string());
        }

        let mut resp = request.header("User-Agent", &self.user_agent).call()?;
        let body: QueryResponse = resp.body_mut().read_json()?;
        summary_from_response(subject, body)
    }
}

fn summary_from_response(subject: &str, body: QueryResponse) -> Result<SummaryResult> {
    let page = body
        .query
        .into_iter()
        .flat_map(|q| q.pages)
        .min_by_key(|page| page.index.unwrap_or(u32::MAX))
        .ok_or_else(|| Error::NotFound(subject.to_string()))?;

    if page.missing || page.extract.trim().is_empty() {
        return Err(Error::NotFound(page.title));
    }
    if page.pageprops.contains_key("disambiguation") {
        return Err(Error::Ambiguous(page.title));
    }

    Ok(SummaryResult {
        text: page.extract.trim().to_string(),
        source_url: page.fullurl,
    })
}
