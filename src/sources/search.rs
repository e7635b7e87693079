//! Web search by scraping the DuckDuckGo HTML endpoint.

use super::{USER_AGENT, WebSearch, http_agent};
use crate::error::{Error, Result};
use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo HTML search. Needs no API key.
pub struct DuckDuckGo {
    agent: ureq::Agent,
    endpoint: String,
    user_agent: String,
}

impl DuckDuckGo {
    pub fn new() -> Self {
        Self {
            agent: http_agent(None),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Override the search endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the `User-Agent` sent with every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSearch for DuckDuckGo {
    fn search(&self, query: &str, num_results: usize) -> Result<Vec<String>> {
        let mut resp = self
            .agent
            .get(&self.endpoint)
            .query("q", query)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "text/html")
            .call()?;

        let body = resp.body_mut().read_to_string()?;
        parse_results(&body, num_results)
    }
}

/// Extract up to `limit` result URLs from a DuckDuckGo results page.
pub fn parse_results(html: &str, limit: usize) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let link = Selector::parse("a.result__a").map_err(|e| Error::Selector(e.to_string()))?;

    Ok(doc
        .select(&link)
        .filter_map(|el| el.value().attr("href"))
        .map(unwrap_redirect)
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
        .take(limit)
        .collect())
}

/// Result links may be wrapped as `//duckduckgo.com/l/?uddg=<encoded>&rut=...`.
fn unwrap_redirect(href: &str) -> String {
    if let Some(pos) = href.find("uddg=") {
        let start = pos + 5;
        let end = href[start..]
            .find('&')
            .map(|i| start + i)
            .unwrap_or(href.len());
        let encoded = &href[start..end];
        if !encoded.is_empty() {
            return percent_decode_str(encoded).decode_utf8_lossy().into_owned();
        }
    }
    href.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::testing;

    const PAGE: &str = r#"<html><body>
        <div class="result">
          <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.linkedin.com%2Fcompany%2Facme&rut=abc">Acme | LinkedIn</a>
        </div>
        <div class="result">
          <a class="result__a" href="https://acme.example/about">About Acme</a>
        </div>
        <div class="result">
          <a class="result__a" href="/relative">Relative</a>
        </div>
        <div class="result">
          <a class="result__a" href="https://third.example/">Third</a>
        </div>
    </body></html>"#;

    #[test]
    fn test_parse_results_decodes_and_filters() {
        let urls = parse_results(PAGE, 10).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://www.linkedin.com/company/acme",
                "https://acme.example/about",
                "https://third.example/",
            ]
        );
    }

    #[test]
    fn test_parse_results_respects_limit() {
        let urls = parse_results(PAGE, 2).unwrap();
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn test_parse_results_empty_page() {
        let urls = parse_results("<html><body>No results.</body></html>", 5).unwrap();
        assert!(urls.is_empty());
    }

    #[test]
    fn test_unwrap_redirect_plain_url() {
        assert_eq!(unwrap_redirect("https://x.com/a"), "https://x.com/a");
    }

    #[test]
    fn test_search_over_http() {
        let (base, requests) = testing::serve(vec![(200, "text/html", PAGE.to_string())]);

        let urls = DuckDuckGo::new()
            .endpoint(format!("{}/html/", base))
            .user_agent("dossier-test/1.0")
            .search("acme site:linkedin.com/company", 1)
            .unwrap();
        assert_eq!(urls, vec!["https://www.linkedin.com/company/acme"]);

        let head = requests.join().unwrap()[0].to_ascii_lowercase();
        assert!(head.starts_with("get /html/?q="));
        assert!(head.contains("user-agent: dossier-test/1.0"));
    }
}
