//! Mock provider implementation for testing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::MovieProvider;
use crate::errors::MovieSearchError;
use crate::types::{Movie, MoviePage, MovieQuery};

/// Scripted answer for one search term.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Successful page, sentinel or not
    Page(MoviePage),
    /// Non-success HTTP status
    HttpStatus(u16),
    /// Transport-level failure
    NetworkError,
    /// Body that is not valid JSON
    Malformed,
}

impl MockResponse {
    /// Successful page with the given movies.
    pub fn movies(movies: Vec<Movie>) -> Self {
        MockResponse::Page(MoviePage::with_results(movies))
    }

    /// Successful page carrying the "no results" sentinel.
    pub fn no_results() -> Self {
        MockResponse::Page(MoviePage::no_results())
    }
}

/// Mock provider for testing.
///
/// Answers are looked up by the query's term (empty for discover); unknown
/// terms get an empty page. Every request is recorded in arrival order.
#[derive(Debug, Default)]
pub struct MockProvider {
    responses: HashMap<String, (MockResponse, Duration)>,
    requests: Mutex<Vec<MovieQuery>>,
}

impl MockProvider {
    /// Creates a mock provider that answers every query with an empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts an immediate answer for `term`.
    pub fn with_response(self, term: &str, response: MockResponse) -> Self {
        self.with_delayed_response(term, response, Duration::ZERO)
    }

    /// Scripts an answer for `term` that arrives after `delay`.
    pub fn with_delayed_response(
        mut self,
        term: &str,
        response: MockResponse,
        delay: Duration,
    ) -> Self {
        self.responses
            .insert(term.to_string(), (response, delay));
        self
    }

    /// Queries received so far, oldest first.
    pub fn requests(&self) -> Vec<MovieQuery> {
        self.requests.lock().clone()
    }

    /// Number of queries received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl MovieProvider for MockProvider {
    async fn fetch_movies(&self, query: &MovieQuery) -> Result<MoviePage, MovieSearchError> {
        self.requests.lock().push(query.clone());

        let Some((response, delay)) = self.responses.get(query.term()).cloned() else {
            return Ok(MoviePage::with_results(Vec::new()));
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match response {
            MockResponse::Page(page) => Ok(page),
            MockResponse::HttpStatus(status) => Err(MovieSearchError::HttpStatus {
                status,
                endpoint: "/mock".to_string(),
            }),
            MockResponse::NetworkError => Err(MovieSearchError::Network {
                reason: "mock connection reset".to_string(),
            }),
            MockResponse::Malformed => Err(MovieSearchError::Parse {
                reason: "mock body is not JSON".to_string(),
            }),
        }
    }
}
