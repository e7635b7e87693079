//! Multi-source research pipeline.
//!
//! A [`Researcher`] runs four independent lookups for one subject and merges
//! them into a [`Report`]. Each lookup has a typed `Result` form so callers
//! can see why it failed; [`Researcher::assemble`] collapses every failure
//! into the documented sentinel, so it always returns a complete report.

mod config;
mod events;
mod prompt;

pub use config::{MAX_NEWS, ResearchConfig};
pub use events::{EventCallback, Lookup, ResearchCallbacks, ResearchEvent};

use crate::error::{Error, Result};
use crate::report::{
    NO_FUTURE_PLANS, NewsArticle, PROFILE_NOT_FOUND, Report, SEARCH_FAILED, SUMMARIZER_FAILED,
    SummaryResult,
};
use crate::sources::{
    CompletionService, DuckDuckGo, HttpFetcher, KnowledgeService, NewsApi, NewsService, OpenAi,
    PageFetcher, WebSearch, Wikipedia, extract_paragraphs,
};
use prompt::{PROFILE_PATH, future_plans_prompt, future_plans_query, profile_query};
use std::sync::{Arc, Mutex};

/// Runs the lookups behind a report. Cloning is cheap (Arc-based).
#[derive(Clone)]
pub struct Researcher {
    config: Arc<ResearchConfig>,
    knowledge: Arc<dyn KnowledgeService>,
    news: Arc<dyn NewsService>,
    search: Arc<dyn WebSearch>,
    fetcher: Arc<dyn PageFetcher>,
    completion: Arc<dyn CompletionService>,
    callbacks: ResearchCallbacks,
}

impl Researcher {
    /// Create a researcher backed by the public HTTP services.
    pub fn new(config: ResearchConfig) -> Self {
        let user_agent = config.user_agent.as_str();
        Self {
            knowledge: Arc::new(Wikipedia::new().user_agent(user_agent)),
            news: Arc::new(NewsApi::new(config.news_api_key.clone()).user_agent(user_agent)),
            search: Arc::new(DuckDuckGo::new().user_agent(user_agent)),
            fetcher: Arc::new(HttpFetcher::new(config.page_timeout).user_agent(user_agent)),
            completion: Arc::new(OpenAi::new(
                config.openai_api_key.clone(),
                config.model.clone(),
            )),
            config: Arc::new(config),
            callbacks: ResearchCallbacks::default(),
        }
    }

    // =========================================================================
    // Builder methods for services
    // =========================================================================

    /// Replace the knowledge service.
    pub fn knowledge(mut self, service: impl KnowledgeService + 'static) -> Self {
        self.knowledge = Arc::new(service);
        self
    }

    /// Replace the news service.
    pub fn news(mut self, service: impl NewsService + 'static) -> Self {
        self.news = Arc::new(service);
        self
    }

    /// Replace the web search.
    pub fn search(mut self, service: impl WebSearch + 'static) -> Self {
        self.search = Arc::new(service);
        self
    }

    /// Replace the page fetcher.
    pub fn fetcher(mut self, service: impl PageFetcher + 'static) -> Self {
        self.fetcher = Arc::new(service);
        self
    }

    /// Replace the completion service.
    pub fn completion(mut self, service: impl CompletionService + 'static) -> Self {
        self.completion = Arc::new(service);
        self
    }

    // =========================================================================
    // Builder methods for callbacks
    // =========================================================================

    /// Set a callback for successfully scraped pages.
    pub fn on_page_fetched<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResearchEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_page_fetched = Some(Arc::new(f));
        self
    }

    /// Set a callback for pages that could not be scraped.
    pub fn on_page_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResearchEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_page_failed = Some(Arc::new(f));
        self
    }

    /// Set a callback for summarizer requests and responses.
    pub fn on_summarizer<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResearchEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_summarizer = Some(Arc::new(f));
        self
    }

    /// Set a callback for lookups that fell back to a sentinel.
    pub fn on_lookup_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResearchEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_lookup_failed = Some(Arc::new(f));
        self
    }

    /// Set a catch-all callback for any event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&ResearchEvent) + Send + Sync + 'static,
    {
        self.callbacks.on_event = Some(Arc::new(f));
        self
    }

    /// Enable event capture.
    pub fn capture_events(mut self, enabled: bool) -> Self {
        if enabled {
            self.callbacks.captured_events = Some(Arc::new(Mutex::new(Vec::new())));
        } else {
            self.callbacks.captured_events = None;
        }
        self
    }

    /// Take captured events.
    pub fn take_events(&self) -> Vec<ResearchEvent> {
        if let Some(ref events) = self.callbacks.captured_events
            && let Ok(mut events) = events.lock()
        {
            return std::mem::take(&mut *events);
        }
        Vec::new()
    }

    /// The active configuration.
    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    fn emit(&self, event: ResearchEvent) {
        self.callbacks.emit(&event);
    }

    fn failed(&self, lookup: Lookup, err: &Error) {
        self.emit(ResearchEvent::LookupFailed {
            lookup,
            message: err.to_string(),
        });
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Encyclopedia summary and canonical link.
    pub fn lookup_summary(&self, subject: &str) -> Result<SummaryResult> {
        self.emit(ResearchEvent::LookupStart {
            lookup: Lookup::Summary,
            subject: subject.to_string(),
        });
        self.knowledge.summary(subject, self.config.summary_sentences)
    }

    /// Up to [`MAX_NEWS`] recent articles.
    pub fn lookup_news(&self, subject: &str) -> Result<Vec<NewsArticle>> {
        self.emit(ResearchEvent::LookupStart {
            lookup: Lookup::News,
            subject: subject.to_string(),
        });
        let limit = self.config.news_page_size.min(MAX_NEWS);
        let mut articles = self.news.articles(subject, limit)?;
        articles.truncate(limit);
        Ok(articles)
    }

    /// First search result on the professional network's company path.
    pub fn find_profile(&self, subject: &str) -> Result<String> {
        self.emit(ResearchEvent::LookupStart {
            lookup: Lookup::Profile,
            subject: subject.to_string(),
        });
        let query = profile_query(subject);
        let urls = self.search.search(&query, self.config.profile_results)?;
        self.emit(ResearchEvent::SearchResults {
            query,
            count: urls.len(),
        });

        urls.into_iter()
            .find(|url| url.contains(PROFILE_PATH))
            .ok_or(Error::NoProfileMatch)
    }

    /// Summarized future plans from the first candidate page with text.
    ///
    /// Pages are tried in search order and the loop stops at the first page
    /// whose paragraphs are non-blank; later candidates are never fetched.
    pub fn future_plans(&self, subject: &str) -> Result<String> {
        self.emit(ResearchEvent::LookupStart {
            lookup: Lookup::FuturePlans,
            subject: subject.to_string(),
        });
        let query = future_plans_query(subject);
        let urls = self
            .search
            .search(&query, self.config.future_plans_results)
            .map_err(|e| Error::Search(Box::new(e)))?;
        self.emit(ResearchEvent::SearchResults {
            query,
            count: urls.len(),
        });

        for url in urls.iter().take(self.config.future_plans_results) {
            let text = match self.scrape(url) {
                Ok(text) => text,
                Err(e) => {
                    self.emit(ResearchEvent::PageFailed {
                        url: url.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            self.emit(ResearchEvent::PageFetched {
                url: url.clone(),
                chars: text.chars().count(),
            });

            if !text.trim().is_empty() {
                return self
                    .summarize_text(&text)
                    .map_err(|e| Error::Summarizer(Box::new(e)));
            }
        }

        Err(Error::NoUsablePage)
    }

    fn scrape(&self, url: &str) -> Result<String> {
        let html = self.fetcher.fetch(url)?;
        extract_paragraphs(&html, self.config.paragraph_limit)
    }

    /// One completion over `text` with the future-plans instruction.
    pub fn summarize_text(&self, text: &str) -> Result<String> {
        self.emit(ResearchEvent::SummarizerRequest {
            chars: text.chars().count(),
        });
        let content = self
            .completion
            .complete(&future_plans_prompt(text), self.config.max_tokens)?;
        let content = content.trim().to_string();
        self.emit(ResearchEvent::SummarizerResponse {
            content: content.clone(),
        });
        Ok(content)
    }

    // =========================================================================
    // Sentinel collapsing
    // =========================================================================

    fn summary_or_sentinel(&self, subject: &str) -> SummaryResult {
        self.lookup_summary(subject).unwrap_or_else(|e| {
            self.failed(Lookup::Summary, &e);
            SummaryResult::not_found()
        })
    }

    fn news_or_empty(&self, subject: &str) -> Vec<NewsArticle> {
        self.lookup_news(subject).unwrap_or_else(|e| {
            self.failed(Lookup::News, &e);
            Vec::new()
        })
    }

    fn profile_or_sentinel(&self, subject: &str) -> String {
        self.find_profile(subject).unwrap_or_else(|e| {
            self.failed(Lookup::Profile, &e);
            PROFILE_NOT_FOUND.to_string()
        })
    }

    fn future_plans_or_sentinel(&self, subject: &str) -> String {
        self.future_plans(subject).unwrap_or_else(|e| {
            self.failed(Lookup::FuturePlans, &e);
            future_plans_sentinel(&e).to_string()
        })
    }

    // =========================================================================
    // Assembly
    // =========================================================================

    /// Run the four lookups concurrently and merge them into a report.
    ///
    /// Never fails: every lookup failure, including a panicked task, becomes
    /// that field's sentinel. The report is only built once all four finish.
    pub async fn assemble(&self, subject: &str) -> Report {
        let (summary, news, linkedin, future_plans) = futures::join!(
            self.blocking(
                subject,
                Lookup::Summary,
                Self::summary_or_sentinel,
                SummaryResult::not_found,
            ),
            self.blocking(subject, Lookup::News, Self::news_or_empty, Vec::new),
            self.blocking(subject, Lookup::Profile, Self::profile_or_sentinel, || {
                PROFILE_NOT_FOUND.to_string()
            }),
            self.blocking(subject, Lookup::FuturePlans, Self::future_plans_or_sentinel, || {
                NO_FUTURE_PLANS.to_string()
            }),
        );

        self.emit(ResearchEvent::ReportAssembled {
            subject: subject.to_string(),
        });
        Report::new(subject, summary, news, linkedin, future_plans)
    }

    /// Run the four lookups one after another on the calling thread.
    pub fn assemble_blocking(&self, subject: &str) -> Report {
        let summary = self.summary_or_sentinel(subject);
        let news = self.news_or_empty(subject);
        let linkedin = self.profile_or_sentinel(subject);
        let future_plans = self.future_plans_or_sentinel(subject);

        self.emit(ResearchEvent::ReportAssembled {
            subject: subject.to_string(),
        });
        Report::new(subject, summary, news, linkedin, future_plans)
    }

    async fn blocking<T, F, D>(&self, subject: &str, lookup: Lookup, f: F, fallback: D) -> T
    where
        T: Send + 'static,
        F: FnOnce(&Researcher, &str) -> T + Send + 'static,
        D: FnOnce() -> T,
    {
        let this = self.clone();
        let subject = subject.to_string();
        match tokio::task::spawn_blocking(move || f(&this, &subject)).await {
            Ok(value) => value,
            Err(e) => {
                self.emit(ResearchEvent::LookupFailed {
                    lookup,
                    message: format!("task failed: {}", e),
                });
                fallback()
            }
        }
    }
}

/// The user-facing text for a failed future-plans lookup.
pub fn future_plans_sentinel(err: &Error) -> &'static str {
    match err {
        Error::Search(_) => SEARCH_FAILED,
        Error::Summarizer(_) => SUMMARIZER_FAILED,
        _ => NO_FUTURE_PLANS,
    }
}
