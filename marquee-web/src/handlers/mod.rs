//! HTTP request handlers organized by functionality

pub mod api;
pub mod htmx;

// Re-export handler functions
pub use api::{MoviesQuery, MoviesResponse, api_health, api_movies, api_state};
pub use htmx::{SearchForm, htmx_movies, htmx_refresh, htmx_search};
