//! Per-browser search sessions keyed by a cookie
//!
//! Loading the page opens a fresh session and drops the one the browser held
//! before, so search state lives exactly as long as the page showing it.
//! Sessions that nobody has polled for the idle timeout are evicted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, header};
use marquee_core::SearchConfig;
use marquee_search::{MovieProvider, SearchSession};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "marquee_session";

struct SessionEntry {
    session: Arc<SearchSession>,
    last_seen: Instant,
}

/// Open search sessions, one per browser page.
pub struct SessionRegistry {
    provider: Arc<dyn MovieProvider>,
    search: SearchConfig,
    idle_timeout: Duration,
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("provider", &self.provider)
            .field("idle_timeout", &self.idle_timeout)
            .field("open_sessions", &self.len())
            .finish()
    }
}

impl SessionRegistry {
    /// Creates an empty registry whose sessions search through `provider`.
    pub fn new(
        provider: Arc<dyn MovieProvider>,
        search: SearchConfig,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            search,
            idle_timeout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a new session and returns its id.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn open(&self) -> (Uuid, Arc<SearchSession>) {
        self.evict_idle();

        let id = Uuid::new_v4();
        let session = Arc::new(SearchSession::start(
            Arc::clone(&self.provider),
            &self.search,
        ));
        self.sessions.lock().insert(
            id,
            SessionEntry {
                session: Arc::clone(&session),
                last_seen: Instant::now(),
            },
        );

        tracing::debug!(%id, "Search session opened");
        (id, session)
    }

    /// Looks up a session and marks it as seen.
    pub fn get(&self, id: &Uuid) -> Option<Arc<SearchSession>> {
        let mut sessions = self.sessions.lock();
        let entry = sessions.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Drops a session; returns `false` if it was not open.
    pub fn close(&self, id: &Uuid) -> bool {
        let closed = self.sessions.lock().remove(id).is_some();
        if closed {
            tracing::debug!(%id, "Search session closed");
        }
        closed
    }

    /// Session for the request's cookie, opening one if it is missing or expired.
    ///
    /// The second element is the `Set-Cookie` value to send when a session
    /// was opened.
    pub fn resolve(&self, headers: &HeaderMap) -> (Arc<SearchSession>, Option<String>) {
        if let Some(session) = session_id(headers).and_then(|id| self.get(&id)) {
            return (session, None);
        }

        let (id, session) = self.open();
        (session, Some(session_cookie(id)))
    }

    /// Drops every session idle for longer than the timeout.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_timeout);

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "Idle search sessions evicted");
        }
        evicted
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// True when no session is open.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Idle period after which a session is evicted.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }
}

/// Periodically evicts idle sessions until aborted.
///
/// # Panics
///
/// Panics when called outside of a tokio runtime.
pub fn spawn_session_sweeper(registry: Arc<SessionRegistry>) -> JoinHandle<()> {
    let period = registry.idle_timeout().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            registry.evict_idle();
        }
    })
}

/// Session id from the request's `Cookie` headers, if present and well formed.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

/// `Set-Cookie` value binding the browser to session `id`.
pub fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
