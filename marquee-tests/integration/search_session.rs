//! SearchSession driving the real HTTP provider

use std::sync::Arc;
use std::time::Duration;

use marquee_search::{
    FETCH_FAILED_MESSAGE, NO_MOVIES_FOUND_MESSAGE, SearchSession, SearchView, TmdbProvider,
    ViewContent,
};
use tokio::time::sleep;

use crate::fake_tmdb::FakeTmdb;

fn start_session(fake: &FakeTmdb) -> SearchSession {
    let config = fake.config();
    let provider = TmdbProvider::new(&config.tmdb, &config.search).unwrap();
    SearchSession::start(Arc::new(provider), &config.search)
}

async fn type_slowly(session: &SearchSession, text: &str, gap: Duration) {
    let mut typed = String::new();
    for ch in text.chars() {
        typed.push(ch);
        session.set_search_term(typed.clone());
        sleep(gap).await;
    }
}

/// Waits until `term` has been debounced and its fetch has completed.
async fn settle(session: &SearchSession, term: &str) -> SearchView {
    let mut updates = session.subscribe();
    let view = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|view| view.debounced_term == term && !view.is_loading),
    )
    .await
    .expect("search never settled")
    .unwrap();
    view.clone()
}

#[tokio::test]
async fn test_session_starts_with_discover_listing() {
    let fake = FakeTmdb::start().await;
    let session = start_session(&fake);

    let view = session.wait_until_idle().await;
    assert_eq!(view.movies.len(), 3);
    assert_eq!(view.movies[0].title, "The Dark Knight");
    assert!(fake.search_terms().is_empty());
}

#[tokio::test]
async fn test_fast_typing_sends_one_search() {
    let fake = FakeTmdb::start().await;
    let session = start_session(&fake);
    session.wait_until_idle().await;

    type_slowly(&session, "batman", Duration::from_millis(10)).await;
    let view = settle(&session, "batman").await;

    assert_eq!(fake.search_terms(), vec!["batman".to_string()]);
    assert_eq!(view.debounced_term, "batman");
    let titles: Vec<_> = view.movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["batman Begins", "The batman"]);
}

#[tokio::test]
async fn test_slow_answer_is_replaced_by_newer_search() {
    let fake = FakeTmdb::start().await;
    let session = start_session(&fake);
    session.wait_until_idle().await;

    // The first search takes 300ms; the second starts while it is still running.
    let mut updates = session.subscribe();
    session.set_search_term("slowpoke");
    updates
        .wait_for(|view| view.debounced_term == "slowpoke" && view.is_loading)
        .await
        .unwrap();
    session.set_search_term("quick");
    let view = settle(&session, "quick").await;

    assert_eq!(view.debounced_term, "quick");
    assert_eq!(view.movies[0].title, "quick Begins");

    sleep(Duration::from_millis(300)).await;
    assert_eq!(session.snapshot().movies[0].title, "quick Begins");
}

#[tokio::test]
async fn test_no_results_then_failure_messages() {
    let fake = FakeTmdb::start().await;
    let session = start_session(&fake);
    session.wait_until_idle().await;

    session.set_search_term("nothing");
    let view = settle(&session, "nothing").await;
    assert_eq!(view.content(), ViewContent::Message(NO_MOVIES_FOUND_MESSAGE));
    assert!(view.movies.is_empty());

    session.set_search_term("error");
    let view = settle(&session, "error").await;
    assert_eq!(view.content(), ViewContent::Message(FETCH_FAILED_MESSAGE));
}

#[tokio::test]
async fn test_failure_keeps_previous_movies_until_next_success() {
    let fake = FakeTmdb::start().await;
    let session = start_session(&fake);
    session.wait_until_idle().await;

    session.set_search_term("garbled");
    let view = settle(&session, "garbled").await;
    assert_eq!(view.error_message.as_deref(), Some(FETCH_FAILED_MESSAGE));
    assert_eq!(view.movies.len(), 3);

    session.set_search_term("");
    let view = settle(&session, "").await;
    assert_eq!(view.error_message, None);
    assert_eq!(view.content(), ViewContent::Movies(&view.movies));
}
