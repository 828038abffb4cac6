//! TMDB REST API provider.

use async_trait::async_trait;
use marquee_core::{SearchConfig, TmdbConfig};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use url::Url;

use super::MovieProvider;
use crate::errors::MovieSearchError;
use crate::types::{MoviePage, MovieQuery};

/// Movie provider backed by the TMDB v3 API.
///
/// Every request is a single GET with `accept: application/json` and the
/// configured bearer token. No retries are attempted.
#[derive(Clone)]
pub struct TmdbProvider {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    discover_sort: &'static str,
}

impl std::fmt::Debug for TmdbProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbProvider")
            .field("base_url", &self.base_url)
            .field("discover_sort", &self.discover_sort)
            .finish_non_exhaustive()
    }
}

impl TmdbProvider {
    /// Creates a provider from the API and search configuration.
    ///
    /// # Errors
    ///
    /// - `MovieSearchError::MissingCredentials` - No bearer token configured
    /// - `MovieSearchError::InvalidEndpoint` - Base URL does not parse
    /// - `MovieSearchError::Network` - HTTP client could not be constructed
    pub fn new(tmdb: &TmdbConfig, search: &SearchConfig) -> Result<Self, MovieSearchError> {
        let api_token = tmdb
            .api_token
            .clone()
            .ok_or(MovieSearchError::MissingCredentials)?;

        let base_url = tmdb.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| MovieSearchError::InvalidEndpoint {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .user_agent(tmdb.user_agent)
            .default_headers(headers);
        if let Some(timeout) = tmdb.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url,
            api_token,
            discover_sort: search.discover_sort,
        })
    }

    /// Base URL endpoints are built from.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint URL this provider requests for `query`.
    ///
    /// # Errors
    ///
    /// - `MovieSearchError::InvalidEndpoint` - The resulting URL does not parse
    pub fn endpoint(&self, query: &MovieQuery) -> Result<Url, MovieSearchError> {
        build_endpoint(&self.base_url, query, self.discover_sort)
    }
}

/// Builds the search or discover endpoint for `query` under `base_url`.
///
/// Search terms are percent-encoded in full, so any text typed by the user
/// round-trips through the `query` parameter.
///
/// # Errors
///
/// - `MovieSearchError::InvalidEndpoint` - The resulting URL does not parse
pub fn build_endpoint(
    base_url: &str,
    query: &MovieQuery,
    discover_sort: &str,
) -> Result<Url, MovieSearchError> {
    let base = base_url.trim_end_matches('/');
    let raw = match query {
        MovieQuery::Search(term) => {
            format!("{base}/search/movie?query={}", urlencoding::encode(term))
        }
        MovieQuery::Discover => format!(
            "{base}/discover/movie?sort_by={}",
            urlencoding::encode(discover_sort)
        ),
    };

    Url::parse(&raw).map_err(|e| MovieSearchError::InvalidEndpoint {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl MovieProvider for TmdbProvider {
    async fn fetch_movies(&self, query: &MovieQuery) -> Result<MoviePage, MovieSearchError> {
        let url = self.endpoint(query)?;
        let endpoint = url.path().to_string();
        tracing::debug!(%query, %endpoint, "Requesting movies");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), %endpoint, "Failed to fetch data");
            return Err(MovieSearchError::HttpStatus {
                status: status.as_u16(),
                endpoint,
            });
        }

        // Reading the body and parsing it fail differently: a connection
        // dropped mid-body is a network error, not a malformed answer.
        let body = response.bytes().await.map_err(|e| MovieSearchError::Network {
            reason: format!("Reading response body failed: {e}"),
        })?;
        let page: MoviePage =
            serde_json::from_slice(&body).map_err(|e| MovieSearchError::Parse {
                reason: format!("JSON parsing failed: {e}"),
            })?;

        tracing::debug!(
            %query,
            results = page.results.as_ref().map_or(0, Vec::len),
            no_results = page.is_no_results(),
            "Movies received"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const BASE: &str = "https://api.themoviedb.org/3";

    #[test]
    fn test_search_endpoint_encodes_term() {
        let url = build_endpoint(
            BASE,
            &MovieQuery::Search("the dark knight & co".to_string()),
            "popularity.desc",
        )
        .unwrap();

        assert_eq!(url.path(), "/3/search/movie");
        assert_eq!(url.query(), Some("query=the%20dark%20knight%20%26%20co"));
    }

    #[test]
    fn test_discover_endpoint_sorts_by_popularity() {
        let url = build_endpoint(BASE, &MovieQuery::Discover, "popularity.desc").unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.themoviedb.org/3/discover/movie?sort_by=popularity.desc"
        );
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let url = build_endpoint("http://localhost:8080/3/", &MovieQuery::Discover, "x").unwrap();
        assert_eq!(url.path(), "/3/discover/movie");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = build_endpoint("not a url", &MovieQuery::Discover, "x").unwrap_err();
        assert!(matches!(err, MovieSearchError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_provider_requires_token() {
        let tmdb = TmdbConfig::default();
        let err = TmdbProvider::new(&tmdb, &SearchConfig::default()).unwrap_err();
        assert!(matches!(err, MovieSearchError::MissingCredentials));
    }

    #[test]
    fn test_provider_debug_hides_token() {
        let tmdb = TmdbConfig {
            api_token: Some("secret-token".to_string()),
            ..Default::default()
        };
        let provider = TmdbProvider::new(&tmdb, &SearchConfig::default()).unwrap();

        assert!(!format!("{provider:?}").contains("secret-token"));
        assert_eq!(provider.base_url(), BASE);
    }

    proptest! {
        #[test]
        fn test_any_term_round_trips_through_query_parameter(term in "\\PC{1,40}") {
            let url = build_endpoint(BASE, &MovieQuery::Search(term.clone()), "popularity.desc")
                .unwrap();
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

            prop_assert_eq!(pairs, vec![("query".to_string(), term)]);
        }
    }
}
