//! TmdbProvider against the fake movie database over real HTTP

use marquee_search::{
    FETCH_FAILED_MESSAGE, FetchOutcome, MovieProvider, MovieQuery, MovieSearchError,
    TmdbProvider, fetch_movies,
};

use crate::fake_tmdb::FakeTmdb;

fn provider_for(fake: &FakeTmdb) -> TmdbProvider {
    let config = fake.config();
    TmdbProvider::new(&config.tmdb, &config.search).unwrap()
}

#[tokio::test]
async fn test_search_sends_bearer_token_and_json_accept() {
    let fake = FakeTmdb::start().await;
    let provider = provider_for(&fake);

    provider
        .fetch_movies(&MovieQuery::from_term("batman"))
        .await
        .unwrap();

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.path, "/3/search/movie");
    assert_eq!(request.params.get("query").map(String::as_str), Some("batman"));
    assert_eq!(request.accept.as_deref(), Some("application/json"));
    assert_eq!(request.authorization.as_deref(), Some("Bearer fake-token"));
}

#[tokio::test]
async fn test_search_term_is_sent_exactly_as_typed() {
    let fake = FakeTmdb::start().await;
    let provider = provider_for(&fake);

    let term = "  Amélie & Nino? 100% ";
    provider
        .fetch_movies(&MovieQuery::from_term(term))
        .await
        .unwrap();

    assert_eq!(fake.search_terms(), vec![term.to_string()]);
}

#[tokio::test]
async fn test_empty_term_discovers_by_popularity() {
    let fake = FakeTmdb::start().await;
    let provider = provider_for(&fake);

    let page = provider.fetch_movies(&MovieQuery::Discover).await.unwrap();
    let titles: Vec<_> = page.into_movies().into_iter().map(|m| m.title).collect();
    assert_eq!(titles, vec!["The Dark Knight", "The Matrix", "Inception"]);

    let requests = fake.requests();
    assert_eq!(requests[0].path, "/3/discover/movie");
    assert_eq!(
        requests[0].params.get("sort_by").map(String::as_str),
        Some("popularity.desc")
    );
    assert!(!requests[0].params.contains_key("query"));
}

#[tokio::test]
async fn test_results_keep_api_order_and_fields() {
    let fake = FakeTmdb::start().await;
    let provider = provider_for(&fake);

    let movies = provider
        .fetch_movies(&MovieQuery::from_term("Heat"))
        .await
        .unwrap()
        .into_movies();

    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].title, "Heat Begins");
    assert_eq!(movies[1].title, "The Heat");
    assert_eq!(movies[0].year_label(), "2005");
    assert_eq!(movies[0].rating_label(), "7.5");
    assert_eq!(
        movies[0].poster_url(),
        "https://image.tmdb.org/t/p/w500/poster-1.jpg"
    );
}

#[tokio::test]
async fn test_sentinel_response_means_no_results() {
    let fake = FakeTmdb::start().await;
    let provider = provider_for(&fake);

    let outcome = fetch_movies(&provider, "nothing").await;
    assert!(matches!(outcome, FetchOutcome::NoResults));
}

#[tokio::test]
async fn test_missing_results_field_is_an_empty_list() {
    let fake = FakeTmdb::start().await;
    let provider = provider_for(&fake);

    let outcome = fetch_movies(&provider, "bare").await;
    match outcome {
        FetchOutcome::Movies(movies) => assert!(movies.is_empty()),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_maps_to_http_status() {
    let fake = FakeTmdb::start().await;
    let provider = provider_for(&fake);

    let error = provider
        .fetch_movies(&MovieQuery::from_term("error"))
        .await
        .unwrap_err();

    match &error {
        MovieSearchError::HttpStatus { status, endpoint } => {
            assert_eq!(*status, 500);
            assert_eq!(endpoint, "/3/search/movie");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(error.user_message(), FETCH_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_malformed_body_maps_to_parse_error() {
    let fake = FakeTmdb::start().await;
    let provider = provider_for(&fake);

    let error = provider
        .fetch_movies(&MovieQuery::from_term("garbled"))
        .await
        .unwrap_err();

    assert!(matches!(error, MovieSearchError::Parse { .. }));
    assert_eq!(error.user_message(), FETCH_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_unreachable_server_maps_to_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = marquee_core::MarqueeConfig::for_testing();
    config.tmdb.base_url = format!("http://{addr}/3");
    let provider = TmdbProvider::new(&config.tmdb, &config.search).unwrap();

    let error = provider
        .fetch_movies(&MovieQuery::Discover)
        .await
        .unwrap_err();
    assert!(matches!(error, MovieSearchError::Network { .. }));
}

#[tokio::test]
async fn test_connection_dropped_mid_body_maps_to_network_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await.unwrap();
        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 1000\r\n\r\n{\"page\": 1, \"results\": [",
            )
            .await
            .unwrap();
        socket.flush().await.unwrap();
    });

    let mut config = marquee_core::MarqueeConfig::for_testing();
    config.tmdb.base_url = format!("http://{addr}/3");
    let provider = TmdbProvider::new(&config.tmdb, &config.search).unwrap();

    let error = provider
        .fetch_movies(&MovieQuery::Discover)
        .await
        .unwrap_err();
    assert!(
        matches!(error, MovieSearchError::Network { .. }),
        "unexpected error: {error:?}"
    );
    server.await.unwrap();
}
