//! Debounced search session: keystrokes in, rendered view state out.
//!
//! The session owns the view state and a [`Debouncer`] over the search term.
//! Each newly debounced term starts one fetch; a fetch that is still running
//! when the next one starts is aborted, and its generation is superseded so a
//! late answer is ignored even if it slips through.

use std::sync::Arc;

use marquee_core::{Debouncer, SearchConfig};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::providers::MovieProvider;
use crate::types::MovieQuery;
use crate::view::{FetchOutcome, FetchTicket, SearchView};

/// Runs one fetch for `term` without a session and classifies the answer.
///
/// Used by one-shot callers such as the CLI `search` command and the JSON API.
pub async fn fetch_movies(provider: &dyn MovieProvider, term: &str) -> FetchOutcome {
    let query = MovieQuery::from_term(term);
    let outcome = FetchOutcome::from_result(provider.fetch_movies(&query).await);
    log_outcome(&query, &outcome);
    outcome
}

fn log_outcome(query: &MovieQuery, outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::Movies(movies) => {
            tracing::info!(%query, count = movies.len(), "Movies fetched");
        }
        FetchOutcome::NoResults => {
            tracing::info!(%query, "No movies found");
        }
        FetchOutcome::Failed(error) => {
            tracing::error!(%query, %error, "Error fetching movies");
        }
    }
}

/// Starts fetches and keeps at most one of them running.
#[derive(Clone)]
struct Fetcher {
    view: Arc<watch::Sender<SearchView>>,
    provider: Arc<dyn MovieProvider>,
    in_flight: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Fetcher {
    fn start_fetch(&self, term: &str) {
        // Held until the handle is stored: generations and handle
        // replacement must happen in the same order.
        let mut in_flight = self.in_flight.lock();

        let mut started = None;
        self.view
            .send_modify(|view| started = Some(view.begin_fetch(term)));
        let Some(ticket) = started else {
            return;
        };

        tracing::debug!(generation = ticket.generation, query = %ticket.query, "Fetch started");
        let handle = tokio::spawn(run_fetch(
            Arc::clone(&self.view),
            Arc::clone(&self.provider),
            ticket,
        ));

        if let Some(superseded) = in_flight.replace(handle) {
            superseded.abort();
        }
    }

    fn abort(&self) {
        if let Some(handle) = self.in_flight.lock().take() {
            handle.abort();
        }
    }
}

async fn run_fetch(
    view: Arc<watch::Sender<SearchView>>,
    provider: Arc<dyn MovieProvider>,
    ticket: FetchTicket,
) {
    let outcome = FetchOutcome::from_result(provider.fetch_movies(&ticket.query).await);
    log_outcome(&ticket.query, &outcome);

    let applied = view.send_if_modified(|view| view.complete_fetch(&ticket, outcome));
    if !applied {
        tracing::debug!(
            generation = ticket.generation,
            query = %ticket.query,
            "Discarded stale movie response"
        );
    }
}

/// One user's search page: the search term, its debounced query and results.
///
/// Dropping the session stops the debouncer and aborts any running fetch.
pub struct SearchSession {
    fetcher: Fetcher,
    debouncer: Debouncer<String>,
    reactor: JoinHandle<()>,
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("provider", &self.fetcher.provider)
            .field("debounce_window", &self.debouncer.window())
            .finish_non_exhaustive()
    }
}

impl SearchSession {
    /// Creates a session and immediately fetches the discover listing.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn start(provider: Arc<dyn MovieProvider>, config: &SearchConfig) -> Self {
        let (view, _) = watch::channel(SearchView::default());
        let fetcher = Fetcher {
            view: Arc::new(view),
            provider,
            in_flight: Arc::new(Mutex::new(None)),
        };
        let debouncer = Debouncer::new(String::new(), config.debounce_window);

        fetcher.start_fetch("");

        let mut debounced = debouncer.subscribe();
        let reactor_fetcher = fetcher.clone();
        let reactor = tokio::spawn(async move {
            while debounced.changed().await.is_ok() {
                let term = debounced.borrow_and_update().clone();
                reactor_fetcher.start_fetch(&term);
            }
        });

        tracing::debug!(
            debounce_ms = config.debounce_window.as_millis() as u64,
            "Search session started"
        );

        Self {
            fetcher,
            debouncer,
            reactor,
        }
    }

    /// Records a keystroke: the term is visible at once, the fetch waits for quiet.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.fetcher.view.send_if_modified(|view| {
            if view.search_term == term {
                false
            } else {
                view.set_search_term(term.clone());
                true
            }
        });
        self.debouncer.set(term);
    }

    /// Re-runs the fetch for the current debounced term.
    pub fn refresh(&self) {
        self.fetcher.start_fetch(&self.debouncer.debounced());
    }

    /// Copy of the current view state.
    pub fn snapshot(&self) -> SearchView {
        self.fetcher.view.borrow().clone()
    }

    /// Receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.fetcher.view.subscribe()
    }

    /// Waits until no fetch is in flight and returns the view at that point.
    pub async fn wait_until_idle(&self) -> SearchView {
        let mut rx = self.subscribe();
        match rx.wait_for(|view| !view.is_loading).await {
            Ok(view) => view.clone(),
            Err(_) => self.snapshot(),
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.reactor.abort();
        self.fetcher.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::errors::{FETCH_FAILED_MESSAGE, NO_MOVIES_FOUND_MESSAGE};
    use crate::providers::{MockProvider, MockResponse};
    use crate::types::Movie;
    use crate::view::ViewContent;

    fn config() -> SearchConfig {
        SearchConfig::default()
    }

    fn start(mock: MockProvider) -> (Arc<MockProvider>, SearchSession) {
        let mock = Arc::new(mock);
        let provider: Arc<dyn MovieProvider> = mock.clone();
        (mock, SearchSession::start(provider, &config()))
    }

    fn batman_results() -> Vec<Movie> {
        vec![Movie::new(268, "Batman"), Movie::new(414906, "The Batman")]
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_fetches_discover_listing() {
        let popular = vec![Movie::new(155, "The Dark Knight")];
        let (mock, session) =
            start(MockProvider::new().with_response("", MockResponse::movies(popular.clone())));

        let view = session.wait_until_idle().await;

        assert_eq!(mock.requests(), vec![MovieQuery::Discover]);
        assert_eq!(view.movies, popular);
        assert_eq!(view.generation, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_issues_single_request() {
        let (mock, session) = start(
            MockProvider::new().with_response("batman", MockResponse::movies(batman_results())),
        );
        session.wait_until_idle().await;

        session.set_search_term("bat");
        sleep(Duration::from_millis(200)).await;
        session.set_search_term("batman");
        sleep(Duration::from_millis(1500)).await;
        let view = session.wait_until_idle().await;

        assert_eq!(
            mock.requests(),
            vec![
                MovieQuery::Discover,
                MovieQuery::Search("batman".to_string())
            ]
        );
        assert_eq!(view.movies, batman_results());
        assert_eq!(view.debounced_term, "batman");
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_term_visible_before_debounce() {
        let (mock, session) = start(MockProvider::new());
        session.wait_until_idle().await;

        session.set_search_term("ali");

        let view = session.snapshot();
        assert_eq!(view.search_term, "ali");
        assert_eq!(view.debounced_term, "");
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_spans_request() {
        let (_mock, session) = start(MockProvider::new().with_delayed_response(
            "slow",
            MockResponse::movies(vec![Movie::new(1, "Slow Burn")]),
            Duration::from_secs(2),
        ));
        session.wait_until_idle().await;

        session.set_search_term("slow");
        sleep(Duration::from_millis(400)).await;
        assert!(!session.snapshot().is_loading);

        sleep(Duration::from_millis(200)).await;
        let view = session.snapshot();
        assert!(view.is_loading);
        assert_eq!(view.content(), ViewContent::Loading);

        sleep(Duration::from_secs(2)).await;
        let view = session.snapshot();
        assert!(!view.is_loading);
        assert_eq!(view.movies.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_older_response_never_overwrites_newer() {
        let (mock, session) = start(
            MockProvider::new()
                .with_delayed_response(
                    "bat",
                    MockResponse::movies(vec![Movie::new(1, "Bat*21")]),
                    Duration::from_secs(3),
                )
                .with_delayed_response(
                    "batman",
                    MockResponse::movies(batman_results()),
                    Duration::from_millis(100),
                ),
        );
        session.wait_until_idle().await;

        session.set_search_term("bat");
        sleep(Duration::from_millis(600)).await;
        session.set_search_term("batman");
        sleep(Duration::from_secs(5)).await;

        let view = session.snapshot();
        assert_eq!(mock.request_count(), 3);
        assert_eq!(view.movies, batman_results());
        assert!(!view.is_loading);
        assert_eq!(view.generation, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_failure_keeps_results_and_shows_message() {
        let popular = vec![Movie::new(603, "The Matrix")];
        let (_mock, session) = start(
            MockProvider::new()
                .with_response("", MockResponse::movies(popular.clone()))
                .with_response("matrix", MockResponse::HttpStatus(500)),
        );
        session.wait_until_idle().await;

        session.set_search_term("matrix");
        sleep(Duration::from_millis(600)).await;
        let view = session.wait_until_idle().await;

        assert_eq!(view.movies, popular);
        assert_eq!(view.error_message.as_deref(), Some(FETCH_FAILED_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_results_sentinel_clears_list() {
        let (_mock, session) = start(
            MockProvider::new()
                .with_response("", MockResponse::movies(vec![Movie::new(1, "Any")]))
                .with_response("qqqq", MockResponse::no_results()),
        );
        session.wait_until_idle().await;

        session.set_search_term("qqqq");
        sleep(Duration::from_millis(600)).await;
        let view = session.wait_until_idle().await;

        assert!(view.movies.is_empty());
        assert_eq!(
            view.content(),
            ViewContent::Message(NO_MOVIES_FOUND_MESSAGE)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_body_shows_retry_message() {
        let (_mock, session) =
            start(MockProvider::new().with_response("", MockResponse::Malformed));

        let view = session.wait_until_idle().await;

        assert_eq!(view.error_message.as_deref(), Some(FETCH_FAILED_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_repeats_current_query() {
        let (mock, session) = start(MockProvider::new());
        session.wait_until_idle().await;

        session.refresh();
        session.wait_until_idle().await;

        assert_eq!(
            mock.requests(),
            vec![MovieQuery::Discover, MovieQuery::Discover]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_refreshes_always_settle() {
        for _ in 0..200 {
            let session = Arc::new(SearchSession::start(
                Arc::new(MockProvider::new()),
                &config(),
            ));

            let refreshers: Vec<_> = (0..4)
                .map(|_| {
                    let session = Arc::clone(&session);
                    tokio::spawn(async move { session.refresh() })
                })
                .collect();
            for refresher in refreshers {
                refresher.await.unwrap();
            }

            let view = tokio::time::timeout(Duration::from_secs(2), session.wait_until_idle())
                .await
                .expect("loading flag never cleared");
            assert!(!view.is_loading);
            assert_eq!(view.generation, 5);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_term_returns_to_discover() {
        let (mock, session) = start(MockProvider::new());
        session.wait_until_idle().await;

        session.set_search_term("heat");
        sleep(Duration::from_millis(600)).await;
        session.set_search_term("");
        sleep(Duration::from_millis(600)).await;
        session.wait_until_idle().await;

        assert_eq!(
            mock.requests(),
            vec![
                MovieQuery::Discover,
                MovieQuery::Search("heat".to_string()),
                MovieQuery::Discover
            ]
        );
    }

    #[tokio::test]
    async fn test_one_shot_fetch_classifies_answer() {
        let mock = MockProvider::new()
            .with_response("batman", MockResponse::movies(batman_results()))
            .with_response("nothing", MockResponse::no_results())
            .with_response("down", MockResponse::NetworkError);

        assert!(matches!(
            fetch_movies(&mock, "batman").await,
            FetchOutcome::Movies(ref m) if m.len() == 2
        ));
        assert!(matches!(
            fetch_movies(&mock, "nothing").await,
            FetchOutcome::NoResults
        ));
        assert!(matches!(
            fetch_movies(&mock, "down").await,
            FetchOutcome::Failed(_)
        ));
    }
}
