//! Reusable HTML components for HTMX + Tailwind UI
//!
//! Components are server-rendered HTML fragments that can be used
//! in full pages or as HTMX partial updates. All styling uses Tailwind CSS.

pub mod layout;
pub mod movie;
pub mod search;

// Re-export main component functions
pub use layout::{hero_header, render_page, section};
pub use movie::{RESULTS_TARGET_ID, movie_card, results_container, results_fragment};
pub use search::search_input;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
