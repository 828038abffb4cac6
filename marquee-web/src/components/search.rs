//! Search input that forwards every keystroke to the session

use super::layout;
use super::movie::RESULTS_TARGET_ID;

/// Renders the search box.
///
/// Each `input` event posts the whole term to `/htmx/search`; debouncing
/// happens server-side in the search session, not in the browser.
pub fn search_input(search_term: &str) -> String {
    let htmx_attributes = format!(
        r##"hx-post="/htmx/search" hx-trigger="input" hx-target="#{RESULTS_TARGET_ID}" hx-swap="innerHTML" autocomplete="off" autofocus"##
    );

    format!(
        r#"<div class="search relative w-full">
            <span class="absolute left-4 top-1/2 -translate-y-1/2 text-gray-400">🔍</span>
            <div class="pl-10">{}</div>
        </div>"#,
        layout::input(
            "query",
            "Search through thousands of movies",
            search_term,
            "text",
            Some(&htmx_attributes)
        )
    )
}
