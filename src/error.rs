//! Error types for Dossier.

use thiserror::Error;

/// Errors that can occur while researching a subject or exporting a report.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(ureq::Error),

    /// Service answered with a non-success status
    #[error("Service returned status {0}")]
    Status(u16),

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Knowledge service has no entry for the subject
    #[error("No entry found for '{0}'")]
    NotFound(String),

    /// Knowledge service resolved the subject to a disambiguation page
    #[error("'{0}' is ambiguous")]
    Ambiguous(String),

    /// No search result matched the profile path
    #[error("No profile result matched")]
    NoProfileMatch,

    /// Every candidate page failed or had no paragraph text
    #[error("No candidate page yielded usable text")]
    NoUsablePage,

    /// The web search step itself failed
    #[error("Web search failed: {0}")]
    Search(Box<Error>),

    /// The completion service failed
    #[error("Summarizer failed: {0}")]
    Summarizer(Box<Error>),

    /// Completion response carried no text
    #[error("Completion returned no choices")]
    EmptyCompletion,

    /// CSS selector failed to parse
    #[error("Invalid selector: {0}")]
    Selector(String),

    /// Export requested before any report was assembled
    #[error("No data available to download.")]
    NoData,

    /// File system error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// PDF encoding error
    #[error("PDF error: {0}")]
    Pdf(String),
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Error::Status(code),
            other => Error::Http(other),
        }
    }
}

/// Result type for Dossier operations.
pub type Result<T> = std::result::Result<T, Error>;
