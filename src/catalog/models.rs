use std::sync::Arc;

use image::DynamicImage;

/// One catalog record. Identity fields are fixed at load time; the only
/// mutable state is the poster, written exclusively by the owning app when a
/// load finishes.
#[derive(Debug, Clone)]
pub struct Movie {
    pub year: String,
    pub title: String,
    pub url: String,
    pub image_url: String,
    /// Comma-separated list, empty for 4-field catalog lines.
    pub genre: String,
    pub duration: String,
    /// Comma-separated list, empty for 4-field catalog lines.
    pub country: String,
    pub poster: PosterState,
}

/// Poster lifecycle. `Ready` is never cleared and `Failed` is terminal for
/// the process run, so each movie fetches its image at most once.
#[derive(Debug, Clone, Default)]
pub enum PosterState {
    #[default]
    NotLoaded,
    Loading,
    Ready(Arc<DynamicImage>),
    Failed,
}

impl PosterState {
    pub fn is_loading(&self) -> bool {
        matches!(self, PosterState::Loading)
    }

    pub fn image(&self) -> Option<&Arc<DynamicImage>> {
        match self {
            PosterState::Ready(img) => Some(img),
            _ => None,
        }
    }
}

impl Movie {
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        split_values(&self.genre)
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        split_values(&self.country)
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres().any(|v| v.eq_ignore_ascii_case(genre))
    }

    pub fn has_country(&self, country: &str) -> bool {
        self.countries().any(|v| v.eq_ignore_ascii_case(country))
    }
}

fn split_values(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(genre: &str, country: &str) -> Movie {
        Movie {
            year: "1999".to_string(),
            title: "The Matrix".to_string(),
            url: "http://a".to_string(),
            image_url: "http://img".to_string(),
            genre: genre.to_string(),
            duration: "136 min".to_string(),
            country: country.to_string(),
            poster: PosterState::default(),
        }
    }

    #[test]
    fn test_multi_value_split_trims() {
        let m = movie("Action, Sci-Fi ,Thriller", "USA");
        let genres: Vec<&str> = m.genres().collect();
        assert_eq!(genres, vec!["Action", "Sci-Fi", "Thriller"]);
    }

    #[test]
    fn test_membership_case_insensitive() {
        let m = movie("Action, Sci-Fi", "USA, Australia");
        assert!(m.has_genre("sci-fi"));
        assert!(m.has_country("australia"));
        assert!(!m.has_genre("Drama"));
    }

    #[test]
    fn test_empty_field_has_no_values() {
        let m = movie("", "");
        assert_eq!(m.genres().count(), 0);
        assert!(!m.has_genre("Action"));
    }
}
