//! Demo provider for offline development.

use async_trait::async_trait;

use super::MovieProvider;
use crate::errors::MovieSearchError;
use crate::types::{Movie, MoviePage, MovieQuery};

/// Serves a fixed catalog so the UI can be developed without API access.
///
/// Discover lists the catalog by popularity; searches match titles
/// case-insensitively and answer with the "no results" sentinel on a miss,
/// the same way the real API signals an empty answer.
#[derive(Debug, Clone)]
pub struct DemoProvider {
    catalog: Vec<Movie>,
}

impl DemoProvider {
    /// Creates a demo provider with the built-in catalog.
    pub fn new() -> Self {
        Self {
            catalog: demo_catalog(),
        }
    }

    /// Number of movies in the catalog.
    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }
}

impl Default for DemoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MovieProvider for DemoProvider {
    async fn fetch_movies(&self, query: &MovieQuery) -> Result<MoviePage, MovieSearchError> {
        match query {
            MovieQuery::Discover => {
                let mut movies = self.catalog.clone();
                movies.sort_by(|a, b| {
                    b.popularity
                        .unwrap_or_default()
                        .total_cmp(&a.popularity.unwrap_or_default())
                });
                Ok(MoviePage::with_results(movies))
            }
            MovieQuery::Search(term) => {
                let needle = term.trim().to_lowercase();
                let movies: Vec<Movie> = self
                    .catalog
                    .iter()
                    .filter(|m| m.title.to_lowercase().contains(&needle))
                    .cloned()
                    .collect();

                if movies.is_empty() {
                    Ok(MoviePage::no_results())
                } else {
                    Ok(MoviePage::with_results(movies))
                }
            }
        }
    }
}

fn demo_movie(
    id: u64,
    title: &str,
    release_date: &str,
    vote_average: f32,
    popularity: f64,
    overview: &str,
) -> Movie {
    Movie {
        original_title: Some(title.to_string()),
        overview: Some(overview.to_string()),
        release_date: Some(release_date.to_string()),
        vote_average: Some(vote_average),
        original_language: Some("en".to_string()),
        popularity: Some(popularity),
        ..Movie::new(id, title)
    }
}

fn demo_catalog() -> Vec<Movie> {
    vec![
        demo_movie(
            268,
            "Batman",
            "1989-06-21",
            7.2,
            41.5,
            "Gotham's caped crusader faces the Joker.",
        ),
        demo_movie(
            155,
            "The Dark Knight",
            "2008-07-16",
            8.5,
            96.2,
            "Batman raises the stakes in his war on crime.",
        ),
        demo_movie(
            414906,
            "The Batman",
            "2022-03-01",
            7.7,
            88.1,
            "A young Batman uncovers corruption in Gotham City.",
        ),
        demo_movie(
            603,
            "The Matrix",
            "1999-03-30",
            8.2,
            77.4,
            "A hacker learns the truth about his reality.",
        ),
        demo_movie(
            348,
            "Alien",
            "1979-05-25",
            8.1,
            52.9,
            "The crew of a commercial spacecraft meets a deadly lifeform.",
        ),
        demo_movie(
            679,
            "Aliens",
            "1986-07-18",
            7.9,
            48.3,
            "Ripley returns to the planet with a unit of marines.",
        ),
        demo_movie(
            27205,
            "Inception",
            "2010-07-15",
            8.4,
            83.0,
            "A thief enters dreams to plant an idea.",
        ),
        demo_movie(
            157336,
            "Interstellar",
            "2014-11-05",
            8.4,
            91.7,
            "Explorers travel through a wormhole to save humanity.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_discover_sorted_by_popularity() {
        let provider = DemoProvider::new();
        let movies = provider
            .fetch_movies(&MovieQuery::Discover)
            .await
            .unwrap()
            .into_movies();

        assert_eq!(movies.len(), provider.catalog_len());
        assert_eq!(movies[0].title, "The Dark Knight");
        assert!(
            movies
                .windows(2)
                .all(|w| w[0].popularity >= w[1].popularity)
        );
    }

    #[tokio::test]
    async fn test_search_matches_case_insensitively() {
        let provider = DemoProvider::new();
        let movies = provider
            .fetch_movies(&MovieQuery::Search("BATMAN".to_string()))
            .await
            .unwrap()
            .into_movies();

        let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Batman", "The Batman"]);
    }

    #[tokio::test]
    async fn test_search_miss_returns_sentinel() {
        let provider = DemoProvider::new();
        let page = provider
            .fetch_movies(&MovieQuery::Search("zzzz".to_string()))
            .await
            .unwrap();

        assert!(page.is_no_results());
    }
}
