//! Per-session report storage.
//!
//! Each browser session owns at most one [`Report`]. Writes replace the whole
//! report under the store's lock (last write wins), and reads hand out a
//! snapshot, so a reader never sees a half-written report.
//!
//! # Example
//!
//! ```
//! use dossier::{SessionId, SessionStore};
//!
//! let store = SessionStore::new();
//! let session = SessionId::new();
//! assert!(store.get(&session).is_none());
//! ```

use crate::report::Report;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Opaque identifier of one browser session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Issue a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept an identifier presented by a client. Only UUIDs are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(|id| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How long a session's report is kept after it was stored.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry {
    report: Report,
    stored_at: Instant,
}

/// Shared store of the latest report per session.
///
/// Entries expire `ttl` after they were written. Expired entries are dropped
/// when they are looked up, on every write, and by [`SessionStore::sweep`].
/// Cloning is cheap (Arc-based), so the same store can be handed to every
/// request handler.
#[derive(Clone)]
pub struct SessionStore {
    reports: Arc<Mutex<HashMap<SessionId, Entry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    /// Create a new empty store with [`DEFAULT_SESSION_TTL`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty store whose entries live for `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            reports: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Lifetime of a stored report.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, Entry>> {
        // A panicking writer cannot leave a partial report behind: inserts
        // move a finished value in.
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expired(&self, entry: &Entry) -> bool {
        entry.stored_at.elapsed() >= self.ttl
    }

    /// Store `report` for `session`, replacing any previous one.
    pub fn set(&self, session: &SessionId, report: Report) {
        let mut reports = self.lock();
        reports.retain(|_, entry| !self.expired(entry));
        reports.insert(
            session.clone(),
            Entry {
                report,
                stored_at: Instant::now(),
            },
        );
    }

    /// Snapshot of the report stored for `session`, unless it has expired.
    pub fn get(&self, session: &SessionId) -> Option<Report> {
        let mut reports = self.lock();
        if reports.get(session).map(|entry| self.expired(entry))? {
            reports.remove(session);
            return None;
        }
        reports.get(session).map(|entry| entry.report.clone())
    }

    /// Check if `session` has a live report.
    pub fn contains(&self, session: &SessionId) -> bool {
        self.get(session).is_some()
    }

    /// Forget the report for `session`.
    pub fn remove(&self, session: &SessionId) -> Option<Report> {
        self.lock().remove(session).map(|entry| entry.report)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let mut reports = self.lock();
        let before = reports.len();
        reports.retain(|_, entry| !self.expired(entry));
        before - reports.len()
    }

    /// Number of sessions holding a live report.
    pub fn len(&self) -> usize {
        let mut reports = self.lock();
        reports.retain(|_, entry| !self.expired(entry));
        reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
