//! Data types for movie search functionality.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Image CDN prefix for poster paths returned by the API.
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Placeholder shown on cards without a poster.
pub const NO_POSTER_PLACEHOLDER: &str = "/static/no-movie.svg";

/// One movie record as returned by the API.
///
/// Only the fields the cards display are typed; everything else the API sends
/// is kept in `extra` so the record round-trips unchanged through the JSON API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// API identifier
    pub id: u64,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Title in the original language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    /// Plot summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    /// Poster image path relative to the image CDN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    /// Backdrop image path relative to the image CDN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    /// Release date as `YYYY-MM-DD`, possibly empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Average user rating out of 10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f32>,
    /// Number of user ratings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<u32>,
    /// ISO 639-1 code of the original language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    /// API popularity score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    /// Genre identifiers
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Adult content flag
    #[serde(default)]
    pub adult: bool,
    /// Fields not modelled above, kept verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Movie {
    /// Creates a movie with only an id and a title set.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            original_title: None,
            overview: None,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: None,
            vote_count: None,
            original_language: None,
            popularity: None,
            genre_ids: Vec::new(),
            adult: false,
            extra: serde_json::Map::new(),
        }
    }

    /// Release year parsed from `release_date`.
    ///
    /// Accepts full `YYYY-MM-DD` dates as well as bare years; empty strings,
    /// which the API sends for unreleased titles, yield `None`.
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?.trim();
        if date.is_empty() {
            return None;
        }

        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map(|d| d.year())
            .ok()
            .or_else(|| date.split('-').next().and_then(|y| y.parse().ok()))
    }

    /// Vote average with one decimal, or `N/A` when the API has none.
    pub fn rating_label(&self) -> String {
        match self.vote_average {
            Some(rating) if rating > 0.0 => format!("{rating:.1}"),
            _ => "N/A".to_string(),
        }
    }

    /// Release year as display text, or `N/A`.
    pub fn year_label(&self) -> String {
        self.release_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Original language code, or `N/A`.
    pub fn language_label(&self) -> &str {
        self.original_language
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or("N/A")
    }

    /// Absolute poster URL, falling back to the local placeholder.
    pub fn poster_url(&self) -> String {
        match self.poster_path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) if path.starts_with('/') => format!("{POSTER_BASE_URL}{path}"),
            Some(path) => format!("{POSTER_BASE_URL}/{path}"),
            None => NO_POSTER_PLACEHOLDER.to_string(),
        }
    }
}

/// Response body of the search and discover endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
    /// Page number of this answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Movies on this page; absent on some error answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Movie>>,
    /// Total number of pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    /// Total number of matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    /// API status flag; the string `"False"` marks a valid empty answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl MoviePage {
    /// Creates a page holding the given results.
    pub fn with_results(results: Vec<Movie>) -> Self {
        Self {
            page: Some(1),
            total_pages: Some(1),
            total_results: Some(results.len() as u64),
            results: Some(results),
            response: None,
        }
    }

    /// Creates a page carrying the "no results" sentinel.
    pub fn no_results() -> Self {
        Self {
            response: Some(serde_json::Value::String("False".to_string())),
            ..Default::default()
        }
    }

    /// Checks for the API "no results" sentinel.
    pub fn is_no_results(&self) -> bool {
        matches!(&self.response, Some(serde_json::Value::String(flag)) if flag == "False")
    }

    /// Consumes the page, yielding its results or an empty list when absent.
    pub fn into_movies(self) -> Vec<Movie> {
        self.results.unwrap_or_default()
    }
}

/// What a fetch asks the API for, derived from the debounced term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieQuery {
    /// Title search for a non-empty term
    Search(String),
    /// Popularity listing shown for an empty term
    Discover,
}

impl MovieQuery {
    /// Selects search or discover by whether the term is empty.
    ///
    /// The term is used exactly as typed; only the empty string discovers.
    pub fn from_term(term: &str) -> Self {
        if term.is_empty() {
            MovieQuery::Discover
        } else {
            MovieQuery::Search(term.to_string())
        }
    }

    /// The term this query searches for, empty for discover.
    pub fn term(&self) -> &str {
        match self {
            MovieQuery::Search(term) => term,
            MovieQuery::Discover => "",
        }
    }
}

impl std::fmt::Display for MovieQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovieQuery::Search(term) => write!(f, "search '{term}'"),
            MovieQuery::Discover => write!(f, "discover"),
        }
    }
}
