//! In-process stand-in for the TMDB v3 API.
//!
//! Answers are chosen by the search term:
//! - `error` -> 500
//! - `garbled` -> 200 with a non-JSON body
//! - `nothing` -> 200 with the "no results" sentinel
//! - `bare` -> 200 without a `results` field
//! - `slow...` -> 200 after 300 ms
//! - anything else -> 200 with movies whose titles contain the term

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use marquee_core::MarqueeConfig;
use parking_lot::Mutex;
use serde_json::json;

/// One request as the fake server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub params: HashMap<String, String>,
    pub accept: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
struct FakeState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Running fake server.
pub struct FakeTmdb {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: tokio::task::JoinHandle<()>,
}

impl FakeTmdb {
    /// Binds to an ephemeral port and starts serving.
    pub async fn start() -> Self {
        let state = FakeState::default();
        let requests = Arc::clone(&state.requests);

        let app = Router::new()
            .route("/3/search/movie", get(search_movie))
            .route("/3/discover/movie", get(discover_movie))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    /// Base URL to configure the provider with.
    pub fn base_url(&self) -> String {
        format!("http://{}/3", self.addr)
    }

    /// Configuration pointing at this server with a short debounce window.
    pub fn config(&self) -> MarqueeConfig {
        let mut config = MarqueeConfig::for_testing();
        config.tmdb.base_url = self.base_url();
        config.tmdb.api_token = Some("fake-token".to_string());
        config.search.debounce_window = Duration::from_millis(150);
        config
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Search terms requested so far, discover requests excluded.
    pub fn search_terms(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with("/search/movie"))
            .filter_map(|r| r.params.get("query").cloned())
            .collect()
    }
}

impl Drop for FakeTmdb {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn record(state: &FakeState, path: &str, params: &HashMap<String, String>, headers: &HeaderMap) {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().push(RecordedRequest {
        path: path.to_string(),
        params: params.clone(),
        accept: header_text(header::ACCEPT),
        authorization: header_text(header::AUTHORIZATION),
    });
}

fn movie_json(id: u64, title: &str, year: u32) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "release_date": format!("{year}-06-01"),
        "vote_average": 7.5,
        "original_language": "en",
        "poster_path": format!("/poster-{id}.jpg"),
        "video": false
    })
}

async fn search_movie(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    record(&state, "/3/search/movie", &params, &headers);
    let term = params.get("query").cloned().unwrap_or_default();

    match term.as_str() {
        "error" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "garbled" => (
            [(header::CONTENT_TYPE, "application/json")],
            "<html>not json</html>",
        )
            .into_response(),
        "nothing" => axum::Json(json!({ "response": "False" })).into_response(),
        "bare" => axum::Json(json!({ "page": 1 })).into_response(),
        _ => {
            if term.starts_with("slow") {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            axum::Json(json!({
                "page": 1,
                "results": [
                    movie_json(1, &format!("{term} Begins"), 2005),
                    movie_json(2, &format!("The {term}"), 2022),
                ],
                "total_pages": 1,
                "total_results": 2
            }))
            .into_response()
        }
    }
}

async fn discover_movie(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    record(&state, "/3/discover/movie", &params, &headers);

    axum::Json(json!({
        "page": 1,
        "results": [
            movie_json(155, "The Dark Knight", 2008),
            movie_json(603, "The Matrix", 1999),
            movie_json(27205, "Inception", 2010),
        ]
    }))
    .into_response()
}
