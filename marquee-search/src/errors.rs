//! Error types for movie search functionality.

use thiserror::Error;

/// Message shown when a fetch fails for any reason.
pub const FETCH_FAILED_MESSAGE: &str = "Error fetching movies. Please try again later";

/// Message shown when the API reports a valid but empty answer.
pub const NO_MOVIES_FOUND_MESSAGE: &str = "No movies found";

/// Errors that can occur during movie search operations.
#[derive(Debug, Error)]
pub enum MovieSearchError {
    /// The API answered with a non-success HTTP status.
    #[error("Failed to fetch data: HTTP {status} from {endpoint}")]
    HttpStatus {
        /// Status code returned by the API
        status: u16,
        /// Endpoint that was requested, without credentials
        endpoint: String,
    },

    /// Network communication error occurred during search.
    #[error("Network error: {reason}")]
    Network {
        /// The reason for the network error
        reason: String,
    },

    /// Failed to parse the response body.
    #[error("Parse error: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },

    /// The configured base URL cannot produce a valid endpoint.
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint {
        /// The URL that failed to parse
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// No bearer credential was configured for the API.
    #[error("Missing API credentials")]
    MissingCredentials,
}

impl MovieSearchError {
    /// Returns the fixed message displayed to the user for this failure.
    ///
    /// Every failure kind maps to the same retry-later message; the details
    /// only go to the log.
    pub fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }
}

impl From<reqwest::Error> for MovieSearchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            MovieSearchError::Parse {
                reason: error.to_string(),
            }
        } else {
            MovieSearchError::Network {
                reason: error.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_failures_share_user_message() {
        let errors = [
            MovieSearchError::HttpStatus {
                status: 401,
                endpoint: "/search/movie".to_string(),
            },
            MovieSearchError::Network {
                reason: "connection refused".to_string(),
            },
            MovieSearchError::Parse {
                reason: "expected value".to_string(),
            },
            MovieSearchError::MissingCredentials,
        ];

        for error in &errors {
            assert_eq!(error.user_message(), FETCH_FAILED_MESSAGE);
        }
    }

    #[test]
    fn test_http_status_display_mentions_status() {
        let error = MovieSearchError::HttpStatus {
            status: 503,
            endpoint: "/discover/movie".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to fetch data: HTTP 503 from /discover/movie"
        );
    }
}
