//! HTMX + Tailwind web server for Marquee
//!
//! Serves the search page, the HTMX fragments it polls, static assets and a
//! small JSON API. Every browser page gets its own search session.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, post};
use marquee_core::{MarqueeConfig, MarqueeError, RuntimeMode};
use marquee_search::{MovieProvider, provider_for_mode};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::handlers::{
    api_health, api_movies, api_state, htmx_movies, htmx_refresh, htmx_search,
};
use crate::pages::home_page;
use crate::sessions::{SessionRegistry, spawn_session_sweeper};

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// One search session per browser page
    pub sessions: Arc<SessionRegistry>,
    /// Provider used for one-shot API searches
    pub provider: Arc<dyn MovieProvider>,
    /// Production or demo data
    pub mode: RuntimeMode,
    /// Reported by the health endpoint
    pub server_started_at: Instant,
}

impl AppState {
    /// Wraps `provider` and an empty session registry for the handlers.
    pub fn new(provider: Arc<dyn MovieProvider>, config: &MarqueeConfig, mode: RuntimeMode) -> Self {
        let sessions = SessionRegistry::new(
            Arc::clone(&provider),
            config.search.clone(),
            config.server.session_idle_timeout,
        );
        Self {
            sessions: Arc::new(sessions),
            provider,
            mode,
            server_started_at: Instant::now(),
        }
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/htmx/search", post(htmx_search))
        .route("/htmx/movies", get(htmx_movies))
        .route("/htmx/refresh", post(htmx_refresh))
        .route("/api/movies", get(api_movies))
        .route("/api/state", get(api_state))
        .route("/api/health", get(api_health))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Validates the configuration, builds the provider and serves until shutdown.
///
/// # Errors
///
/// - `MarqueeError::Configuration` - Invalid configuration or missing credential
/// - `MarqueeError::Io` - Binding or serving the listener failed
pub async fn run_server(config: MarqueeConfig, mode: RuntimeMode) -> Result<(), MarqueeError> {
    config.validate(mode)?;

    let provider = provider_for_mode(mode, &config).map_err(|e| MarqueeError::Configuration {
        reason: e.to_string(),
    })?;
    let state = AppState::new(provider, &config, mode);
    let sweeper = spawn_session_sweeper(Arc::clone(&state.sessions));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| MarqueeError::Configuration {
            reason: format!(
                "Invalid bind address {}:{}: {e}",
                config.server.host, config.server.port
            ),
        })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "Marquee listening on http://{} ({mode} mode)",
        listener.local_addr()?
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweeper.abort();
    served?;

    tracing::info!("Marquee server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use marquee_search::DemoProvider;
    use tower::ServiceExt;

    use super::*;
    use crate::sessions::session_id;

    fn demo_state() -> AppState {
        AppState::new(
            Arc::new(DemoProvider::new()),
            &MarqueeConfig::for_testing(),
            RuntimeMode::Development,
        )
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// `name=value` part of the response's `Set-Cookie` header.
    fn cookie_of(response: &axum::response::Response) -> String {
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn open_page(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        cookie_of(&response)
    }

    fn search_request(cookie: &str, query: &str) -> Request<Body> {
        Request::post("/htmx/search")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::COOKIE, cookie)
            .body(Body::from(format!("query={query}")))
            .unwrap()
    }

    async fn state_of(app: &Router, cookie: &str) -> serde_json::Value {
        let response = app
            .clone()
            .oneshot(
                Request::get("/api/state")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_home_page_opens_session() {
        let state = demo_state();
        let app = build_router(state.clone());

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = cookie_of(&response);
        assert!(cookie.starts_with("marquee_session="));
        let html = body_text(response).await;
        assert!(html.contains("All Movies"));
        assert!(html.contains(r#"id="movie-results""#));
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_reload_discards_previous_session() {
        let state = demo_state();
        let app = build_router(state.clone());
        let first = open_page(&app).await;

        app.clone()
            .oneshot(search_request(&first, "alien"))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::get("/")
                    .header(header::COOKIE, &first)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let second = cookie_of(&response);
        let html = body_text(response).await;

        assert_ne!(first, second);
        assert!(!html.contains(r#"value="alien""#));
        assert_eq!(state.sessions.len(), 1);
        assert_eq!(state_of(&app, &second).await["search_term"], "");
    }

    #[tokio::test]
    async fn test_browsers_do_not_share_search_terms() {
        let state = demo_state();
        let app = build_router(state.clone());
        let alice = open_page(&app).await;
        let bob = open_page(&app).await;

        let response = app
            .clone()
            .oneshot(search_request(&alice, "alien"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        app.clone()
            .oneshot(search_request(&bob, "matrix"))
            .await
            .unwrap();

        assert_eq!(state_of(&app, &alice).await["search_term"], "alien");
        assert_eq!(state_of(&app, &bob).await["search_term"], "matrix");
        assert_eq!(state.sessions.len(), 2);
    }

    #[tokio::test]
    async fn test_fragment_without_cookie_opens_session() {
        let state = demo_state();
        let app = build_router(state.clone());

        let response = app
            .oneshot(Request::get("/htmx/movies").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_reruns_current_search() {
        let state = demo_state();
        let app = build_router(state.clone());
        let cookie = open_page(&app).await;

        let mut headers = axum::http::HeaderMap::new();
        headers.insert(header::COOKIE, cookie.parse().unwrap());
        let session = state.sessions.get(&session_id(&headers).unwrap()).unwrap();
        session.wait_until_idle().await;

        let response = app
            .clone()
            .oneshot(
                Request::post("/htmx/refresh")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let view = session.wait_until_idle().await;
        assert_eq!(view.generation, 2);
        assert!(!view.movies.is_empty());
    }

    #[tokio::test]
    async fn test_api_state_requires_session() {
        let app = build_router(demo_state());

        let response = app
            .oneshot(Request::get("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_placeholder_poster_is_served() {
        let app = build_router(demo_state());

        let response = app
            .oneshot(
                Request::get(marquee_search::types::NO_POSTER_PLACEHOLDER)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<svg"));
    }

    #[tokio::test]
    async fn test_api_movies_one_shot_search() {
        let app = build_router(demo_state());

        let response = app
            .oneshot(
                Request::get("/api/movies?query=matrix")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["query"], "matrix");
        assert_eq!(json["movies"][0]["title"], "The Matrix");
        assert!(json["message"].is_null());
    }

    #[tokio::test]
    async fn test_api_movies_reports_no_results() {
        let app = build_router(demo_state());

        let response = app
            .oneshot(
                Request::get("/api/movies?query=zzzz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["message"], "No movies found");
        assert_eq!(json["movies"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_api_health() {
        let app = build_router(demo_state());

        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["mode"], "DEVELOPMENT");
    }
}
