//! Marquee Search - Movie lookup and debounced search sessions

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Wraps the TMDB search and discover endpoints behind a provider trait and
//! turns keystrokes into at most one in-flight request per quiet period.

pub mod errors;
pub mod providers;
pub mod session;
pub mod types;
pub mod view;

// Re-export main types
pub use errors::{FETCH_FAILED_MESSAGE, MovieSearchError, NO_MOVIES_FOUND_MESSAGE};
pub use providers::{DemoProvider, MovieProvider, TmdbProvider};
pub use session::{SearchSession, fetch_movies};
pub use types::{Movie, MoviePage, MovieQuery};
pub use view::{FetchOutcome, FetchTicket, SearchView, ViewContent};

/// Convenience type alias for Results with MovieSearchError.
pub type Result<T> = std::result::Result<T, MovieSearchError>;

/// Builds the provider for a runtime mode.
///
/// # Errors
///
/// - `MovieSearchError::MissingCredentials` - Production mode without a token
/// - `MovieSearchError::InvalidEndpoint` - Unusable base URL
pub fn provider_for_mode(
    mode: marquee_core::RuntimeMode,
    config: &marquee_core::MarqueeConfig,
) -> Result<std::sync::Arc<dyn MovieProvider>> {
    match mode {
        marquee_core::RuntimeMode::Production => Ok(std::sync::Arc::new(TmdbProvider::new(
            &config.tmdb,
            &config.search,
        )?)),
        marquee_core::RuntimeMode::Development => Ok(std::sync::Arc::new(DemoProvider::new())),
    }
}
