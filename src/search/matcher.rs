/// Delimiters used both to tokenize queries and to split fields into words.
pub const TERM_DELIMITERS: &[char] = &[' ', '-', '_', '.', ','];

const MIN_TERM_LEN: usize = 2;

/// Split a raw query into lowercase search terms, dropping anything shorter
/// than two characters.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(TERM_DELIMITERS)
        .filter(|t| t.chars().count() >= MIN_TERM_LEN)
        .map(str::to_string)
        .collect()
}

/// Levenshtein edit distance over chars, two-row DP.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Whole-field fuzzy match: edit distance between the entire field and the
/// term, threshold `max(1, term_len / 3)`. Known limitation: a one-word term
/// is diffed against the whole (possibly multi-word) field, so this rarely
/// fires except for near-equal-length strings. Kept as-is; the substring and
/// partial-word rules cover the common cases.
pub fn is_fuzzy_match(field: &str, term: &str) -> bool {
    let max_distance = (term.chars().count() / 3).max(1);
    levenshtein(field, term) <= max_distance
}

/// True when any word of the field starts or ends with the term.
pub fn is_partial_word_match(field: &str, term: &str) -> bool {
    field
        .split(TERM_DELIMITERS)
        .filter(|w| !w.is_empty())
        .any(|w| w.starts_with(term) || w.ends_with(term))
}

/// A term matches a field by substring, fuzzy or partial-word rules.
/// Both inputs are expected lowercase (fields via the caller, terms via
/// `tokenize`).
pub fn term_matches(field: &str, term: &str) -> bool {
    field.contains(term) || is_fuzzy_match(field, term) || is_partial_word_match(field, term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_delimiters_and_min_length() {
        assert_eq!(tokenize("the-matrix.1999"), vec!["the", "matrix", "1999"]);
        assert_eq!(tokenize("a b,c_d"), Vec::<String>::new());
        assert_eq!(tokenize("  Matrix   Reloaded "), vec!["matrix", "reloaded"]);
    }

    #[test]
    fn test_tokenize_lowercases() {
        assert_eq!(tokenize("The MATRIX"), vec!["the", "matrix"]);
    }

    #[test]
    fn test_levenshtein_known_pairs() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_levenshtein_symmetry() {
        let pairs = [("kitten", "sitting"), ("matrix", "matrik"), ("", "x")];
        for (a, b) in pairs {
            assert_eq!(levenshtein(a, b), levenshtein(b, a));
        }
    }

    #[test]
    fn test_levenshtein_triangle_inequality() {
        let words = ["matrix", "matrik", "metric", "merit"];
        for a in words {
            for b in words {
                for c in words {
                    assert!(levenshtein(a, c) <= levenshtein(a, b) + levenshtein(b, c));
                }
            }
        }
    }

    #[test]
    fn test_fuzzy_threshold_scales_with_term() {
        // "matrix" allows distance 2 (6 / 3)
        assert!(is_fuzzy_match("matrix", "matrik"));
        assert!(is_fuzzy_match("matrix", "motrik"));
        assert!(!is_fuzzy_match("matrix", "metronome"));
        // short terms still allow distance 1
        assert!(is_fuzzy_match("it", "at"));
    }

    #[test]
    fn test_fuzzy_is_whole_field() {
        // distance between the full title and the term is large even though
        // one word is close; this is the documented whole-field behavior
        assert!(!is_fuzzy_match("the matrix reloaded", "matrik"));
    }

    #[test]
    fn test_partial_word_match() {
        assert!(is_partial_word_match("the matrix reloaded", "mat"));
        assert!(is_partial_word_match("the matrix reloaded", "loaded"));
        assert!(is_partial_word_match("spider-man", "man"));
        assert!(!is_partial_word_match("the matrix", "atri"));
    }

    #[test]
    fn test_term_matches_any_rule() {
        // substring
        assert!(term_matches("the matrix", "atri"));
        // partial word
        assert!(term_matches("the matrix", "mat"));
        // fuzzy
        assert!(term_matches("matrix", "matrik"));
        assert!(!term_matches("the godfather", "matrix"));
    }
}
