//! HTMX fragment handlers for the search page

use axum::Form;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::{AppendHeaders, Html, IntoResponse};
use serde::Deserialize;

use crate::components::results_fragment;
use crate::server::AppState;

/// Form body posted by the search input on every keystroke.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    /// Current contents of the search box
    #[serde(default)]
    pub query: String,
}

/// Records the current search term and answers with the results fragment.
///
/// The fetch itself only starts once the term has been stable for the
/// session's debounce window; until then the previous results are returned.
pub async fn htmx_search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SearchForm>,
) -> impl IntoResponse {
    let (session, cookie) = state.sessions.resolve(&headers);
    tracing::trace!(term = %form.query, "Search term updated");
    session.set_search_term(form.query);

    (
        AppendHeaders(cookie.map(|c| (header::SET_COOKIE, c))),
        Html(results_fragment(&session.snapshot())),
    )
}

/// Current results fragment, polled by the results container.
pub async fn htmx_movies(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let (session, cookie) = state.sessions.resolve(&headers);

    (
        AppendHeaders(cookie.map(|c| (header::SET_COOKIE, c))),
        Html(results_fragment(&session.snapshot())),
    )
}

/// Re-runs the fetch for the debounced term, used by the retry button.
pub async fn htmx_refresh(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let (session, cookie) = state.sessions.resolve(&headers);
    session.refresh();

    (
        AppendHeaders(cookie.map(|c| (header::SET_COOKIE, c))),
        Html(results_fragment(&session.snapshot())),
    )
}
