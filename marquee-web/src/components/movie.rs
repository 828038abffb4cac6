//! Movie cards and the results section

use marquee_search::{FETCH_FAILED_MESSAGE, Movie, SearchView, ViewContent};

use super::escape_html;

/// DOM id of the element the results fragment is swapped into.
pub const RESULTS_TARGET_ID: &str = "movie-results";

/// Renders one movie card: poster, title, rating, language and year.
pub fn movie_card(movie: &Movie) -> String {
    let title = escape_html(&movie.title);
    let poster = escape_html(&movie.poster_url());
    let rating = movie.rating_label();
    let language = escape_html(movie.language_label());
    let year = movie.year_label();

    format!(
        r#"<li class="movie-card bg-gray-900 border border-gray-800 rounded-2xl p-5 shadow-inner" data-movie-id="{id}">
            <img src="{poster}" alt="{title}" class="rounded-lg h-auto w-full" loading="lazy" />
            <div class="mt-4">
                <h3 class="text-white font-bold text-base line-clamp-1">{title}</h3>
                <div class="mt-2 flex flex-row items-center flex-wrap gap-2 text-gray-400">
                    <div class="flex flex-row items-center gap-1">
                        <span class="text-yellow-400">★</span>
                        <p class="font-bold text-white">{rating}</p>
                    </div>
                    <span>•</span>
                    <p class="capitalize">{language}</p>
                    <span>•</span>
                    <p>{year}</p>
                </div>
            </div>
        </li>"#,
        id = movie.id,
    )
}

/// Renders what the results section currently shows.
///
/// Loading takes precedence over a message, a message over the card list.
pub fn results_fragment(view: &SearchView) -> String {
    match view.content() {
        ViewContent::Loading => {
            r#"<p class="text-white" data-state="loading">Loading...</p>"#.to_string()
        }
        ViewContent::Message(message) => {
            let retry = if message == FETCH_FAILED_MESSAGE {
                retry_button()
            } else {
                String::new()
            };
            format!(
                r#"<p class="text-red-500" data-state="message">{}</p>{retry}"#,
                escape_html(message)
            )
        }
        ViewContent::Movies(movies) => {
            let cards: String = movies.iter().map(movie_card).collect();
            format!(
                r#"<ul class="grid grid-cols-1 gap-5 xs:grid-cols-2 md:grid-cols-3 lg:grid-cols-4" data-state="movies">{cards}</ul>"#
            )
        }
    }
}

fn retry_button() -> String {
    format!(
        r##"<button class="mt-4 px-4 py-2 rounded-lg bg-gray-800 text-white hover:bg-gray-700" hx-post="/htmx/refresh" hx-target="#{RESULTS_TARGET_ID}" hx-swap="innerHTML">Try again</button>"##
    )
}

/// Results container that polls for fresh fragments while the page is open.
pub fn results_container(view: &SearchView) -> String {
    format!(
        r#"<div id="{RESULTS_TARGET_ID}" hx-get="/htmx/movies" hx-trigger="every 500ms" hx-swap="innerHTML">{}</div>"#,
        results_fragment(view)
    )
}
