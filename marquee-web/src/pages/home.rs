//! Home page - hero, search box and the movie list

use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;

use crate::components::{hero_header, render_page, results_container, search_input, section};
use crate::server::AppState;
use crate::sessions::{session_cookie, session_id};

/// Renders the search page on a fresh session.
///
/// A reload replaces the browser's previous session, so the page always
/// starts with an empty search box and the discover listing.
pub async fn home_page(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(previous) = session_id(&headers) {
        state.sessions.close(&previous);
    }
    let (id, session) = state.sessions.open();
    let view = session.snapshot();

    let content = format!(
        "{}\n{}",
        hero_header(&search_input(&view.search_term)),
        section("all-movies", "All Movies", &results_container(&view))
    );

    (
        [(header::SET_COOKIE, session_cookie(id))],
        render_page("Find movies", &content),
    )
}
