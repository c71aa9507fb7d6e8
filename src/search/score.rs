use super::matcher::{is_fuzzy_match, is_partial_word_match};

/// Accumulate a relevance score for a movie against the search terms.
/// Expects `title` and `year` pre-lowercased. Rules are cumulative: a term
/// that is both a substring and a partial-word match in the title adds 130.
pub fn match_score(title: &str, year: &str, terms: &[String]) -> i32 {
    let mut score = 0;

    for term in terms {
        if title.contains(term.as_str()) {
            score += 100;
        }
        if year.contains(term.as_str()) {
            score += 50;
        }

        if is_partial_word_match(title, term) {
            score += 30;
        }
        if is_partial_word_match(year, term) {
            score += 15;
        }

        if is_fuzzy_match(title, term) {
            score += 10;
        }
        if is_fuzzy_match(year, term) {
            score += 5;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::matcher::tokenize;

    #[test]
    fn test_substring_title_floor() {
        // every term a title substring => at least 100 per term
        let terms = tokenize("matrix the");
        let score = match_score("the matrix", "1999", &terms);
        assert!(score >= 100 * terms.len() as i32);
    }

    #[test]
    fn test_rules_are_cumulative() {
        // "matrix" in "matrix": substring (100) + partial word (30) + fuzzy
        // whole-field (10, equal strings)
        let terms = vec!["matrix".to_string()];
        assert_eq!(match_score("matrix", "", &terms), 140);
    }

    #[test]
    fn test_year_weights_are_half() {
        let terms = vec!["1999".to_string()];
        // substring (50) + partial word (15) + fuzzy (5) on year only
        assert_eq!(match_score("the godfather", "1999", &terms), 70);
    }

    #[test]
    fn test_no_match_scores_zero() {
        let terms = vec!["zanzibar".to_string()];
        assert_eq!(match_score("the matrix", "1999", &terms), 0);
    }

    #[test]
    fn test_title_outranks_year() {
        let terms = vec!["19".to_string()];
        let title_hit = match_score("19 below", "2003", &terms);
        let year_hit = match_score("something else", "1999", &terms);
        assert!(title_hit > year_hit);
    }
}
