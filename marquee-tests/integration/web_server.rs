//! Web server end to end: browser-style requests against a bound listener

use std::sync::Arc;
use std::time::Duration;

use marquee_core::RuntimeMode;
use marquee_search::{FETCH_FAILED_MESSAGE, NO_MOVIES_FOUND_MESSAGE, TmdbProvider};
use marquee_web::{AppState, build_router};
use reqwest::header;
use tokio::net::TcpListener;

use crate::fake_tmdb::FakeTmdb;

struct TestServer {
    base: String,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn start_server(fake: &FakeTmdb) -> TestServer {
    let config = fake.config();
    let provider = Arc::new(TmdbProvider::new(&config.tmdb, &config.search).unwrap());
    let state = AppState::new(provider, &config, RuntimeMode::Production);
    let app = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: format!("http://{addr}"),
        task,
    }
}

/// One browser tab: a client plus the session cookie the page handed out.
struct Browser {
    client: reqwest::Client,
    base: String,
    cookie: String,
}

impl Browser {
    async fn open(server: &TestServer) -> Self {
        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/", server.base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let cookie = response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        Self {
            client,
            base: server.base.clone(),
            cookie,
        }
    }

    async fn type_term(&self, term: &str) {
        let response = self
            .client
            .post(format!("{}/htmx/search", self.base))
            .header(header::COOKIE, &self.cookie)
            .form(&[("query", term)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    async fn fragment(&self) -> String {
        self.client
            .get(format!("{}/htmx/movies", self.base))
            .header(header::COOKIE, &self.cookie)
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }

    async fn wait_for_fragment(&self, needle: &str) -> String {
        let mut body = String::new();
        for _ in 0..100 {
            body = self.fragment().await;
            if body.contains(needle) {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("fragment never contained {needle:?}, last body: {body}");
    }

    async fn state(&self) -> serde_json::Value {
        self.client
            .get(format!("{}/api/state", self.base))
            .header(header::COOKIE, &self.cookie)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_home_page_shows_popular_movies() {
    let fake = FakeTmdb::start().await;
    let server = start_server(&fake).await;

    let page = reqwest::get(format!("{}/", server.base)).await.unwrap();
    assert_eq!(page.status(), 200);
    assert!(page.headers().contains_key(header::SET_COOKIE));
    let html = page.text().await.unwrap();
    assert!(html.contains("hx-post=\"/htmx/search\""));

    let browser = Browser::open(&server).await;
    browser.wait_for_fragment("The Dark Knight").await;
}

#[tokio::test]
async fn test_typing_in_browser_updates_results() {
    let fake = FakeTmdb::start().await;
    let server = start_server(&fake).await;
    let browser = Browser::open(&server).await;
    browser.wait_for_fragment("The Dark Knight").await;

    for typed in ["m", "ma", "mat", "matrix"] {
        browser.type_term(typed).await;
    }

    let fragment = browser.wait_for_fragment("matrix Begins").await;
    assert!(fragment.contains("The matrix"));
    assert_eq!(fake.search_terms(), vec!["matrix".to_string()]);

    let state = browser.state().await;
    assert_eq!(state["search_term"], "matrix");
    assert_eq!(state["debounced_term"], "matrix");
    assert_eq!(state["is_loading"], false);
}

#[tokio::test]
async fn test_two_browsers_search_independently() {
    let fake = FakeTmdb::start().await;
    let server = start_server(&fake).await;
    let first = Browser::open(&server).await;
    let second = Browser::open(&server).await;

    first.type_term("alien").await;
    second.type_term("heat").await;

    first.wait_for_fragment("alien Begins").await;
    let second_fragment = second.wait_for_fragment("heat Begins").await;
    assert!(!second_fragment.contains("alien"));

    assert_eq!(first.state().await["search_term"], "alien");
    assert_eq!(second.state().await["search_term"], "heat");

    let mut terms = fake.search_terms();
    terms.sort();
    assert_eq!(terms, vec!["alien".to_string(), "heat".to_string()]);
}

#[tokio::test]
async fn test_failure_message_offers_retry() {
    let fake = FakeTmdb::start().await;
    let server = start_server(&fake).await;
    let browser = Browser::open(&server).await;

    browser.type_term("error").await;

    let fragment = browser.wait_for_fragment(FETCH_FAILED_MESSAGE).await;
    assert!(fragment.contains("/htmx/refresh"));
}

#[tokio::test]
async fn test_no_results_message_in_fragment() {
    let fake = FakeTmdb::start().await;
    let server = start_server(&fake).await;
    let browser = Browser::open(&server).await;

    browser.type_term("nothing").await;

    browser.wait_for_fragment(NO_MOVIES_FOUND_MESSAGE).await;
}

#[tokio::test]
async fn test_api_movies_reports_upstream_failure() {
    let fake = FakeTmdb::start().await;
    let server = start_server(&fake).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/movies", server.base))
        .query(&[("query", "error")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], FETCH_FAILED_MESSAGE);
    assert_eq!(body["movies"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_health_reports_production_mode() {
    let fake = FakeTmdb::start().await;
    let server = start_server(&fake).await;

    let body: serde_json::Value = reqwest::get(format!("{}/api/health", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["mode"], "PRODUCTION");
}
