//! NewsAPI-backed news service.

use super::{NewsService, USER_AGENT, http_agent};
use crate::error::Result;
use crate::report::NewsArticle;
use serde::Deserialize;

const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";

#[derive(Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

/// Client for the NewsAPI `everything` search.
pub struct NewsApi {
    agent: ureq::Agent,
    endpoint: String,
    api_key: Option<String>,
    user_agent: String,
}

impl NewsApi {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            agent: http_agent(None),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Set the `User-Agent` sent with every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the search endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl NewsService for NewsApi {
    fn articles(&self, subject: &str, page_size: usize) -> Result<Vec<NewsArticle>> {
        let mut resp = self
            .agent
            .get(&self.endpoint)
            .query("q", subject)
            .query("apiKey", self.api_key.as_deref().unwrap_or_default())
            .query("pageSize", page_size.to_string())
            .header("User-Agent", &self.user_agent)
            .call()?;

        let body: NewsResponse = resp.body_mut().read_json()?;
        Ok(body.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sources::testing;

    #[test]
    fn test_response_without_articles() {
        let body: NewsResponse =
            serde_json::from_str(r#"{"status": "ok", "totalResults": 0}"#).unwrap();
        assert!(body.articles.is_empty());
    }

    #[test]
    fn test_response_articles_in_order() {
        let body: NewsResponse = serde_json::from_str(
            r#"{"status": "ok", "articles": [
                {"title": "Newest", "url": "https://n/1", "publishedAt": "2024-02-02", "source": {"name": "A"}},
                {"title": "Older", "url": "https://n/2", "publishedAt": "2024-01-01", "source": {"name": "B"}}
            ]}"#,
        )
        .unwrap();

        let titles: Vec<&str> = body.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Older"]);
    }

    #[test]
    fn test_rejected_key_is_status_error() {
        let (base, requests) = testing::serve(vec![(
            401,
            "application/json",
            r#"{"status": "error", "code": "apiKeyInvalid"}"#.to_string(),
        )]);

        let news = NewsApi::new(Some("bad-key".to_string()))
            .endpoint(format!("{}/v2/everything", base));
        let err = news.articles("Acme", 5).unwrap_err();
        assert!(matches!(err, Error::Status(401)));

        let requests = requests.join().unwrap();
        assert!(requests[0].starts_with("GET /v2/everything?"));
        assert!(requests[0].contains("q=Acme"));
        assert!(requests[0].contains("apiKey=bad-key"));
        assert!(requests[0].contains("pageSize=5"));
    }

    #[test]
    fn test_articles_over_http() {
        let (base, _requests) = testing::serve(vec![(
            200,
            "application/json",
            r#"{"status": "ok", "articles": [{"title": "Acme grows", "url": "https://n/1"}]}"#
                .to_string(),
        )]);

        let articles = NewsApi::new(None).endpoint(base).articles("Acme", 5).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Acme grows");
    }
}
