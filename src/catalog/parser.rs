use crate::catalog::models::{Movie, PosterState};

/// Parse one catalog line. Fields are `|`-separated and trimmed; a line is
/// accepted only when its field count is exactly 4
/// (`year|title|url|imageUrl`) or 7 (`…|genre|duration|country`).
/// Everything else is dropped.
pub fn parse_line(line: &str) -> Option<Movie> {
    let parts: Vec<&str> = line.split('|').map(str::trim).collect();

    match parts.as_slice() {
        [year, title, url, image_url] => Some(new_movie(year, title, url, image_url, "", "", "")),
        [year, title, url, image_url, genre, duration, country] => {
            Some(new_movie(year, title, url, image_url, genre, duration, country))
        }
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn new_movie(
    year: &str,
    title: &str,
    url: &str,
    image_url: &str,
    genre: &str,
    duration: &str,
    country: &str,
) -> Movie {
    Movie {
        year: year.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        image_url: image_url.to_string(),
        genre: genre.to_string(),
        duration: duration.to_string(),
        country: country.to_string(),
        poster: PosterState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_field_line() {
        let m = parse_line("1999|The Matrix|http://a|http://img1").unwrap();
        assert_eq!(m.year, "1999");
        assert_eq!(m.title, "The Matrix");
        assert_eq!(m.url, "http://a");
        assert_eq!(m.image_url, "http://img1");
        assert_eq!(m.genre, "");
        assert_eq!(m.country, "");
    }

    #[test]
    fn test_seven_field_line() {
        let m = parse_line("1999|The Matrix|http://a|http://img1|Action, Sci-Fi|136 min|USA")
            .unwrap();
        assert_eq!(m.genre, "Action, Sci-Fi");
        assert_eq!(m.duration, "136 min");
        assert_eq!(m.country, "USA");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let m = parse_line(" 1999 | The Matrix |http://a| http://img1 ").unwrap();
        assert_eq!(m.year, "1999");
        assert_eq!(m.title, "The Matrix");
        assert_eq!(m.image_url, "http://img1");
    }

    #[test]
    fn test_wrong_arity_rejected() {
        assert!(parse_line("1999|The Matrix|http://a").is_none());
        assert!(parse_line("1999|The Matrix|http://a|http://img1|Action").is_none());
        assert!(parse_line("1999|a|b|c|d|e|f|g").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("no delimiters here").is_none());
    }
}
