//! Provider implementations for movie lookups.

use async_trait::async_trait;

use crate::errors::MovieSearchError;
use crate::types::{MoviePage, MovieQuery};

pub mod demo;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod tmdb;

pub use demo::DemoProvider;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockProvider, MockResponse};
pub use tmdb::TmdbProvider;

/// Trait for movie database providers.
///
/// Implementations answer one query with one page of results (real API,
/// offline demo data, scripted mock for testing).
#[async_trait]
pub trait MovieProvider: Send + Sync + std::fmt::Debug {
    /// Fetch the movies for a search or discover query.
    ///
    /// A page carrying the "no results" sentinel is a successful answer.
    ///
    /// # Errors
    /// - `MovieSearchError::HttpStatus` - API answered with a non-success status
    /// - `MovieSearchError::Network` - Network connectivity issues
    /// - `MovieSearchError::Parse` - Response body was not the expected JSON
    async fn fetch_movies(&self, query: &MovieQuery) -> Result<MoviePage, MovieSearchError>;
}
