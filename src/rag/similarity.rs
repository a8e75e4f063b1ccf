//! String similarity used by the fuzzy matching tiers.
//!
//! The scoring rules are kept exactly as the matcher has always applied them,
//! including the single-candidate closest-match step, because downstream
//! thresholds (0.7 / 0.6) were tuned against these numbers.

use strsim::normalized_levenshtein;

/// Score returned when either string contains the other.
pub const SUBSTRING_SCORE: f64 = 0.9;

/// Strings shorter than this only match on equality.
pub const MIN_FUZZY_LEN: usize = 4;

/// Candidates ordered by closeness to `word`, best first, keeping at most `n`
/// whose closeness is at least `cutoff`. Ties keep candidate order.
pub fn closest_matches<'a>(word: &str, candidates: &[&'a str], n: usize, cutoff: f64) -> Vec<&'a str> {
    if n == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &'a str)> = candidates
        .iter()
        .map(|&c| (normalized_levenshtein(word, c), c))
        .filter(|(score, _)| *score >= cutoff)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(n).map(|(_, c)| c).collect()
}

/// Share of position-aligned equal characters, over the longer length.
pub fn aligned_match_score(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    let matches = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    matches as f64 / longest as f64
}

/// Similarity of a query token against an entity name (both already lowercased).
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.contains(b) || b.contains(a) {
        return SUBSTRING_SCORE;
    }

    if a.chars().count() < MIN_FUZZY_LEN || b.chars().count() < MIN_FUZZY_LEN {
        return if a == b { 1.0 } else { 0.0 };
    }

    closest_matches(a, &[b], 1, 0.0)
        .first()
        .map(|best| aligned_match_score(a, best))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_scores_fixed_value() {
        assert_eq!(similarity("diab", "diabetes"), SUBSTRING_SCORE);
        assert_eq!(similarity("diabetes mellitus", "diabetes"), SUBSTRING_SCORE);
    }

    #[test]
    fn test_short_strings_need_equality() {
        assert_eq!(similarity("flu", "flux"), SUBSTRING_SCORE);
        assert_eq!(similarity("flu", "cold"), 0.0);
        assert_eq!(similarity("abc", "abd"), 0.0);
    }

    #[test]
    fn test_diabetic_resolves_to_diabetes() {
        // six of eight positions line up
        let score = similarity("diabetic", "diabetes");
        assert!((score - 0.75).abs() < 1e-9);
        assert!(score > 0.7);
    }

    #[test]
    fn test_aligned_score_is_positional() {
        // a dropped letter misaligns everything after it
        assert!((similarity("fevr", "fever") - 0.6).abs() < 1e-9);
        assert_eq!(similarity("malaria", "diabetes"), 0.0);
    }

    #[test]
    fn test_closest_matches_orders_and_cuts() {
        let candidates = ["diabetes", "malaria", "diabetic"];
        let best = closest_matches("diabetis", &candidates, 2, 0.5);
        assert_eq!(best.len(), 2);
        assert!(best.contains(&"diabetes"));
        assert!(!best.contains(&"malaria"));
        assert!(closest_matches("x", &candidates, 0, 0.0).is_empty());
        assert_eq!(closest_matches("zzzz", &["diabetes"], 1, 0.0), vec!["diabetes"]);
    }
}
