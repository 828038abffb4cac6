//! JSON API handlers for movie search and session state

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use marquee_search::{FetchOutcome, Movie, SearchView, fetch_movies};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::server::AppState;
use crate::sessions::session_id;

/// Query string of `/api/movies`; a missing query discovers.
#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    /// Title to search for
    #[serde(default)]
    pub query: String,
}

/// One-shot search answer.
#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    /// Query as received
    pub query: String,
    /// Movies in API order, empty on no results or failure
    pub movies: Vec<Movie>,
    /// "No movies found" or the retry message
    pub message: Option<&'static str>,
}

/// Searches (or discovers, for an empty query) without touching the session.
///
/// Failures answer `502 Bad Gateway` with the user-facing message.
pub async fn api_movies(
    State(state): State<AppState>,
    Query(params): Query<MoviesQuery>,
) -> (StatusCode, Json<MoviesResponse>) {
    let outcome = fetch_movies(state.provider.as_ref(), &params.query).await;
    let message = outcome.message();

    let (status, movies) = match outcome {
        FetchOutcome::Movies(movies) => (StatusCode::OK, movies),
        FetchOutcome::NoResults => (StatusCode::OK, Vec::new()),
        FetchOutcome::Failed(_) => (StatusCode::BAD_GATEWAY, Vec::new()),
    };

    (
        status,
        Json(MoviesResponse {
            query: params.query,
            movies,
            message,
        }),
    )
}

/// Snapshot of the caller's session view.
///
/// Answers `404 Not Found` when the request carries no open session.
pub async fn api_state(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SearchView>, StatusCode> {
    session_id(&headers)
        .and_then(|id| state.sessions.get(&id))
        .map(|session| Json(session.snapshot()))
        .ok_or(StatusCode::NOT_FOUND)
}

/// Liveness check with runtime mode and uptime.
pub async fn api_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "mode": state.mode.to_string(),
        "uptime_seconds": state.server_started_at.elapsed().as_secs(),
        "open_sessions": state.sessions.len(),
    }))
}
