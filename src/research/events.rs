//! Research events and callbacks for observability.

use std::fmt;
use std::sync::{Arc, Mutex};

/// The four independent lookups behind a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Summary,
    News,
    Profile,
    FuturePlans,
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lookup::Summary => "summary",
            Lookup::News => "news",
            Lookup::Profile => "profile",
            Lookup::FuturePlans => "future_plans",
        };
        f.write_str(name)
    }
}

/// Events emitted while assembling a report.
#[derive(Debug, Clone, PartialEq)]
pub enum ResearchEvent {
    /// A lookup is starting
    LookupStart { lookup: Lookup, subject: String },
    /// A web search returned
    SearchResults { query: String, count: usize },
    /// A candidate page was fetched and parsed
    PageFetched { url: String, chars: usize },
    /// A candidate page could not be fetched or parsed
    PageFailed { url: String, message: String },
    /// Text is being sent to the completion service
    SummarizerRequest { chars: usize },
    /// The completion service answered
    SummarizerResponse { content: String },
    /// A lookup fell back to its sentinel
    LookupFailed { lookup: Lookup, message: String },
    /// All four lookups finished
    ReportAssembled { subject: String },
}

/// Type alias for event callbacks
pub type EventCallback = Arc<dyn Fn(&ResearchEvent) + Send + Sync>;

/// Storage for researcher callbacks
#[derive(Default, Clone)]
pub struct ResearchCallbacks {
    pub on_page_fetched: Option<EventCallback>,
    pub on_page_failed: Option<EventCallback>,
    pub on_summarizer: Option<EventCallback>,
    pub on_lookup_failed: Option<EventCallback>,
    /// Catch-all callback for any event
    pub on_event: Option<EventCallback>,
    pub(crate) captured_events: Option<Arc<Mutex<Vec<ResearchEvent>>>>,
}

impl ResearchCallbacks {
    /// Log the event, then hand it to the matching callback(s).
    pub fn emit(&self, event: &ResearchEvent) {
        log(event);

        if let Some(ref events) = self.captured_events
            && let Ok(mut events) = events.lock()
        {
            events.push(event.clone());
        }

        let specific = match event {
            ResearchEvent::PageFetched { .. } => self.on_page_fetched.as_ref(),
            ResearchEvent::PageFailed { .. } => self.on_page_failed.as_ref(),
            ResearchEvent::SummarizerRequest { .. } | ResearchEvent::SummarizerResponse { .. } => {
                self.on_summarizer.as_ref()
            }
            ResearchEvent::LookupFailed { .. } => self.on_lookup_failed.as_ref(),
            _ => None,
        };

        if let Some(cb) = specific {
            cb(event);
        }

        if let Some(cb) = &self.on_event {
            cb(event);
        }
    }
}

fn log(event: &ResearchEvent) {
    match event {
        ResearchEvent::LookupStart { lookup, subject } => {
            tracing::debug!(%lookup, %subject, "lookup started");
        }
        ResearchEvent::SearchResults { query, count } => {
            tracing::debug!(%query, count, "search returned");
        }
        ResearchEvent::PageFetched { url, chars } => {
            tracing::debug!(%url, chars, "extracted page text");
        }
        ResearchEvent::PageFailed { url, message } => {
            tracing::warn!(%url, error = %message, "failed to scrape page");
        }
        ResearchEvent::SummarizerRequest { chars } => {
            tracing::debug!(chars, "sending text to summarizer");
        }
        ResearchEvent::SummarizerResponse { content } => {
            let preview: String = content.chars().take(200).collect();
            tracing::debug!(%preview, "summarizer responded");
        }
        ResearchEvent::LookupFailed { lookup, message } => {
            tracing::warn!(%lookup, error = %message, "lookup fell back to sentinel");
        }
        ResearchEvent::ReportAssembled { subject } => {
            tracing::info!(%subject, "report assembled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_specific_and_catch_all_callbacks() {
        let specific = Arc::new(AtomicUsize::new(0));
        let all = Arc::new(AtomicUsize::new(0));

        let s = specific.clone();
        let a = all.clone();
        let callbacks = ResearchCallbacks {
            on_page_failed: Some(Arc::new(move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            })),
            on_event: Some(Arc::new(move |_| {
                a.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        };

        callbacks.emit(&ResearchEvent::PageFailed {
            url: "https://x".to_string(),
            message: "timeout".to_string(),
        });
        callbacks.emit(&ResearchEvent::ReportAssembled {
            subject: "Acme".to_string(),
        });

        assert_eq!(specific.load(Ordering::SeqCst), 1);
        assert_eq!(all.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_capture() {
        let callbacks = ResearchCallbacks {
            captured_events: Some(Arc::new(Mutex::new(Vec::new()))),
            ..Default::default()
        };

        callbacks.emit(&ResearchEvent::SummarizerRequest { chars: 12 });

        let events = callbacks.captured_events.unwrap();
        let events = events.lock().unwrap();
        assert_eq!(events.as_slice(), &[ResearchEvent::SummarizerRequest { chars: 12 }]);
    }

    #[test]
    fn test_lookup_display() {
        assert_eq!(Lookup::FuturePlans.to_string(), "future_plans");
    }
}
