pub mod matcher;
pub mod score;

use std::cmp::Reverse;

use crate::catalog::Movie;

/// Active filter set: free-text query plus independent category filters.
/// `None` for genre/country means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub query: String,
    pub genre: Option<String>,
    pub country: Option<String>,
}

impl Filters {
    pub fn is_default(&self) -> bool {
        self.query.trim().is_empty() && self.genre.is_none() && self.country.is_none()
    }

    /// Recompute the filtered view from scratch: category membership AND
    /// (empty query OR every term matching title/year by any rule). Results
    /// are catalog indices; whenever the query is non-empty they are ordered
    /// by descending score, ties keeping catalog order (stable sort).
    pub fn apply(&self, movies: &[Movie]) -> Vec<usize> {
        let terms = matcher::tokenize(&self.query);
        let mut matched: Vec<(usize, i32)> = Vec::new();

        for (idx, movie) in movies.iter().enumerate() {
            if let Some(genre) = &self.genre
                && !movie.has_genre(genre)
            {
                continue;
            }
            if let Some(country) = &self.country
                && !movie.has_country(country)
            {
                continue;
            }

            if terms.is_empty() {
                matched.push((idx, 0));
                continue;
            }

            let title = movie.title.to_lowercase();
            let year = movie.year.to_lowercase();

            let all_terms_match = terms
                .iter()
                .all(|t| matcher::term_matches(&title, t) || matcher::term_matches(&year, t));

            if all_terms_match {
                matched.push((idx, score::match_score(&title, &year, &terms)));
            }
        }

        if !terms.is_empty() {
            matched.sort_by_key(|&(_, s)| Reverse(s));
        }

        matched.into_iter().map(|(idx, _)| idx).collect()
    }
}
