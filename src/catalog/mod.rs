pub mod models;
pub mod parser;

use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use rand::seq::SliceRandom;
use tracing::{debug, info};

pub use models::{Movie, PosterState};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Year,
}

/// The full in-memory catalog, built once at startup. Order is mutated only
/// by explicit sort/shuffle; everything downstream (filtered views, visible
/// window) refers to it by index.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Catalog file not found, starting empty");
            return Ok(Catalog::default());
        }

        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_lines(content.lines());
        info!(path = %path.display(), movies = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    pub fn from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Self {
        let mut movies = Vec::new();
        let mut dropped = 0usize;

        for line in lines {
            match parser::parse_line(line) {
                Some(movie) => movies.push(movie),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(dropped, "Dropped malformed catalog lines");
        }

        Self { movies }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn movie(&self, idx: usize) -> Option<&Movie> {
        self.movies.get(idx)
    }

    pub fn movie_mut(&mut self, idx: usize) -> Option<&mut Movie> {
        self.movies.get_mut(idx)
    }

    /// Stable in-place sort. Title comparison ignores case; years are the
    /// raw catalog strings, compared lexically.
    pub fn sort(&mut self, key: SortKey) {
        match key {
            SortKey::Title => self
                .movies
                .sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase())),
            SortKey::Year => self.movies.sort_by(|a, b| a.year.cmp(&b.year)),
        }
    }

    pub fn shuffle(&mut self) {
        self.movies.shuffle(&mut rand::rng());
    }

    /// Distinct genre values across the catalog, sorted, for the filter picker.
    pub fn genre_values(&self) -> Vec<String> {
        Self::facet_values(self.movies.iter().flat_map(|m| m.genres()))
    }

    pub fn country_values(&self) -> Vec<String> {
        Self::facet_values(self.movies.iter().flat_map(|m| m.countries()))
    }

    fn facet_values<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
        let mut out: Vec<String> = values.map(str::to_string).collect();
        out.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
        out.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        out
    }

    /// Mark every movie sharing `image_url` as loaded. Movies already in
    /// `Ready` keep their image (posters are never re-fetched).
    pub fn set_poster_ready(&mut self, image_url: &str, image: Arc<DynamicImage>) {
        for movie in &mut self.movies {
            if movie.image_url == image_url && movie.poster.image().is_none() {
                movie.poster = PosterState::Ready(image.clone());
            }
        }
    }

    /// Mark movies whose load for `image_url` failed. Only movies still in
    /// `Loading` transition; `Failed` is terminal so they won't retry.
    pub fn set_poster_failed(&mut self, image_url: &str) {
        for movie in &mut self.movies {
            if movie.image_url == image_url && movie.poster.is_loading() {
                movie.poster = PosterState::Failed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::from_lines(
            [
                "1999|The Matrix|http://a|http://img1|Action, Sci-Fi|136 min|USA",
                "2003|Matrix Reloaded|http://b|http://img2|Action, Sci-Fi|138 min|USA, Australia",
                "1972|The Godfather|http://c|http://img3|Crime, Drama|175 min|USA",
                "not|enough",
                "",
            ]
            .into_iter(),
        )
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let catalog = sample();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_sort_by_title() {
        let mut catalog = sample();
        catalog.sort(SortKey::Title);
        let titles: Vec<&str> = catalog.movies().iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Matrix Reloaded", "The Godfather", "The Matrix"]);
    }

    #[test]
    fn test_sort_by_year() {
        let mut catalog = sample();
        catalog.sort(SortKey::Year);
        let years: Vec<&str> = catalog.movies().iter().map(|m| m.year.as_str()).collect();
        assert_eq!(years, vec!["1972", "1999", "2003"]);
    }

    #[test]
    fn test_shuffle_preserves_multiset() {
        let mut catalog = sample();
        let mut before: Vec<String> = catalog.movies().iter().map(|m| m.title.clone()).collect();
        catalog.shuffle();
        let mut after: Vec<String> = catalog.movies().iter().map(|m| m.title.clone()).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_facet_values_distinct_sorted() {
        let catalog = sample();
        assert_eq!(
            catalog.genre_values(),
            vec!["Action", "Crime", "Drama", "Sci-Fi"]
        );
        assert_eq!(catalog.country_values(), vec!["Australia", "USA"]);
    }

    #[test]
    fn test_poster_ready_is_sticky() {
        let mut catalog = sample();
        let first = Arc::new(image::DynamicImage::new_rgb8(1, 1));
        let second = Arc::new(image::DynamicImage::new_rgb8(2, 2));

        catalog.set_poster_ready("http://img1", first.clone());
        catalog.set_poster_ready("http://img1", second);

        let poster = catalog.movie(0).unwrap().poster.image().unwrap();
        assert!(Arc::ptr_eq(poster, &first));
    }

    #[test]
    fn test_poster_failure_only_hits_loading() {
        let mut catalog = sample();
        catalog.movie_mut(0).unwrap().poster = PosterState::Loading;

        catalog.set_poster_failed("http://img1");
        assert!(matches!(
            catalog.movie(0).unwrap().poster,
            PosterState::Failed
        ));

        // img2 was never loading, so it stays untouched
        catalog.set_poster_failed("http://img2");
        assert!(matches!(
            catalog.movie(1).unwrap().poster,
            PosterState::NotLoaded
        ));
    }
}
