//! View state of a search session and the fetch bookkeeping that mutates it.
//!
//! Every fetch is stamped with a generation number when it starts. Only the
//! completion carrying the newest generation is applied, so a slow response
//! for an older term can never overwrite the results of a newer one.

use serde::Serialize;

use crate::errors::{FETCH_FAILED_MESSAGE, MovieSearchError, NO_MOVIES_FOUND_MESSAGE};
use crate::types::{Movie, MoviePage, MovieQuery};

/// Everything the page renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchView {
    /// Raw input text, updated on every keystroke
    pub search_term: String,
    /// Term of the most recently started fetch
    pub debounced_term: String,
    /// True while the newest fetch is in flight
    pub is_loading: bool,
    /// Message replacing the result list, if any
    pub error_message: Option<String>,
    /// Results of the last successful fetch, in API order
    pub movies: Vec<Movie>,
    /// Generation of the most recently started fetch
    pub generation: u64,
}

/// What the results section shows, in display precedence order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewContent<'a> {
    /// A fetch is in flight
    Loading,
    /// Error or "no results" message
    Message(&'a str),
    /// Result list, possibly empty
    Movies(&'a [Movie]),
}

/// Handle for one started fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Generation stamped when the fetch started
    pub generation: u64,
    /// Query the fetch asks for
    pub query: MovieQuery,
}

/// Classified result of one fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successful answer, possibly empty
    Movies(Vec<Movie>),
    /// API reported a valid empty answer
    NoResults,
    /// Any failure: HTTP status, transport or parsing
    Failed(MovieSearchError),
}

impl FetchOutcome {
    /// Classifies a provider answer.
    pub fn from_result(result: Result<MoviePage, MovieSearchError>) -> Self {
        match result {
            Ok(page) if page.is_no_results() => FetchOutcome::NoResults,
            Ok(page) => FetchOutcome::Movies(page.into_movies()),
            Err(error) => FetchOutcome::Failed(error),
        }
    }

    /// Message displayed instead of results, if any.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            FetchOutcome::Movies(_) => None,
            FetchOutcome::NoResults => Some(NO_MOVIES_FOUND_MESSAGE),
            FetchOutcome::Failed(error) => Some(error.user_message()),
        }
    }
}

impl SearchView {
    /// Records a keystroke; the results are untouched until a fetch completes.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Marks a fetch for `term` as started and returns its ticket.
    ///
    /// Sets loading, clears the previous message and supersedes any fetch
    /// that is still in flight.
    pub fn begin_fetch(&mut self, term: &str) -> FetchTicket {
        self.generation += 1;
        self.debounced_term = term.to_string();
        self.is_loading = true;
        self.error_message = None;

        FetchTicket {
            generation: self.generation,
            query: MovieQuery::from_term(term),
        }
    }

    /// Applies the outcome of the fetch identified by `ticket`.
    ///
    /// Returns `false` and leaves the view untouched when a newer fetch has
    /// started since. A failure keeps the previous results; "no results"
    /// clears them.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, outcome: FetchOutcome) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        match outcome {
            FetchOutcome::Movies(movies) => {
                self.movies = movies;
            }
            FetchOutcome::NoResults => {
                self.error_message = Some(NO_MOVIES_FOUND_MESSAGE.to_string());
                self.movies.clear();
            }
            FetchOutcome::Failed(_) => {
                self.error_message = Some(FETCH_FAILED_MESSAGE.to_string());
            }
        }
        self.is_loading = false;

        true
    }

    /// Checks whether `ticket` belongs to the newest fetch.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Content to render: loading beats a message, a message beats the list.
    pub fn content(&self) -> ViewContent<'_> {
        if self.is_loading {
            ViewContent::Loading
        } else if let Some(message) = self.error_message.as_deref() {
            ViewContent::Message(message)
        } else {
            ViewContent::Movies(&self.movies)
        }
    }
}
