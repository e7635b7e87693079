//! Dossier - company research aggregator
//!
//! Given a company name, Dossier gathers an encyclopedia summary, recent
//! news, a LinkedIn company page and an AI-condensed "future plans" blurb
//! into one [`Report`], and exports that report as PDF or CSV.
//!
//! Every lookup tolerates failure on its own: a failed lookup contributes a
//! fixed sentinel string instead of an error, so assembling a report never
//! fails.
//!
//! # Quick Start
//!
//! ```ignore
//! use dossier::{ResearchConfig, Researcher};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ResearchConfig::new()
//!         .news_api_key(std::env::var("NEWSAPI_KEY").unwrap_or_default())
//!         .openai_api_key(std::env::var("OPENAI_KEY").unwrap_or_default());
//!
//!     let report = Researcher::new(config).assemble("Acme Corp").await;
//!     println!("{}", report.future_plans);
//! }
//! ```

mod error;
pub mod export;
mod report;
mod research;
mod session;
pub mod sources;
pub mod web;

pub use error::{Error, Result};
pub use export::{ExportFormat, export_csv, export_pdf};
pub use report::{
    NO_FUTURE_PLANS, NO_SUMMARY, NewsArticle, NewsSource, PROFILE_NOT_FOUND, Report,
    SEARCH_FAILED, SUMMARIZER_FAILED, SummaryResult,
};
pub use research::{
    EventCallback, Lookup, MAX_NEWS, ResearchCallbacks, ResearchConfig, ResearchEvent, Researcher,
    future_plans_sentinel,
};
pub use session::{DEFAULT_SESSION_TTL, SessionId, SessionStore};
