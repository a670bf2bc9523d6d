//! Fuzzy string scoring for name matching.
//!
//! All ratios are in 0..=100 and computed over `char`s:
//! - `ratio`: indel similarity (2 * LCS / total length)
//! - `partial_ratio`: best `ratio` of the shorter string against the
//!   windows of the longer one that share an edge character with it
//! - token sort / token set variants that ignore word order and duplicates
//! - `weighted_ratio`: the combination used to compare normalized names

use std::cmp::Ordering;

use rapidfuzz::fuzz;
use rustc_hash::FxHashSet;

// ============================================================================
// Score Thresholds
// ============================================================================

/// Minimum aggregate score for two names to be considered a match
pub const DEFAULT_MATCH_THRESHOLD: i32 = 80;

/// Score awarded when one side's English text is a romanization of the other's non-English text
pub const ROMANIZATION_BONUS: i32 = 95;

/// Token-based ratios never reach a full 100 on their own
pub const TOKEN_SCALE: f64 = 0.95;

/// Length ratio at which partial matching kicks in
pub const PARTIAL_LEN_RATIO: f64 = 1.5;

/// (exclusive lower bound on length ratio, scale) pairs, checked in order
const PARTIAL_SCALES: &[(f64, f64)] = &[(3.0, 0.25), (2.0, 0.45), (1.5, 0.625), (1.0, 0.75)];

const DEFAULT_PARTIAL_SCALE: f64 = 0.90;

/// Per-call overrides for name matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub threshold: i32,
    pub romanization_bonus: i32,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            romanization_bonus: ROMANIZATION_BONUS,
        }
    }
}

// ============================================================================
// Base Ratios
// ============================================================================

fn to_score(similarity: f64) -> i32 {
    (100.0 * similarity).round_ties_even() as i32
}

/// Indel similarity of two strings.
pub fn ratio(a: &str, b: &str) -> i32 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }
    to_score(fuzz::ratio(a.chars(), b.chars()))
}

/// Windows of `haystack` worth aligning `needle` against: partial overlaps at
/// either end plus every full-length window, kept only when an edge character
/// occurs in the needle.
fn alignment_windows<'a>(needle: &[char], haystack: &'a [char]) -> Vec<&'a [char]> {
    let needle_chars: FxHashSet<char> = needle.iter().copied().collect();
    let (n, h) = (needle.len(), haystack.len());
    let mut windows = Vec::new();

    for end in 1..n {
        if needle_chars.contains(&haystack[end - 1]) {
            windows.push(&haystack[..end]);
        }
    }
    for start in 0..=(h - n) {
        let window = &haystack[start..start + n];
        if needle_chars.contains(&window[0]) || needle_chars.contains(&window[n - 1]) {
            windows.push(window);
        }
    }
    for start in (h - n + 1)..h {
        if needle_chars.contains(&haystack[start]) {
            windows.push(&haystack[start..]);
        }
    }
    windows
}

fn partial_similarity(needle: &[char], haystack: &[char]) -> f64 {
    let scorer = fuzz::RatioBatchComparator::new(needle.iter().copied());
    let mut best = 0.0f64;
    for window in alignment_windows(needle, haystack) {
        let similarity = scorer.similarity(window.iter().copied());
        if similarity > 0.995 {
            return 1.0;
        }
        best = best.max(similarity);
    }
    best
}

/// Best `ratio` of the shorter string against the aligned windows of the longer one.
///
/// Equal-length strings are aligned both ways so the score stays symmetric.
pub fn partial_ratio(a: &str, b: &str) -> i32 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let similarity = match a.len().cmp(&b.len()) {
        Ordering::Less => partial_similarity(&a, &b),
        Ordering::Greater => partial_similarity(&b, &a),
        Ordering::Equal => partial_similarity(&a, &b).max(partial_similarity(&b, &a)),
    };
    to_score(similarity)
}

// ============================================================================
// Token Ratios
// ============================================================================

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn ratio_fn(partial: bool) -> fn(&str, &str) -> i32 {
    if partial {
        partial_ratio
    } else {
        ratio
    }
}

/// Ratio of the two strings with their words sorted.
pub fn token_sort_ratio(a: &str, b: &str, partial: bool) -> i32 {
    ratio_fn(partial)(&sorted_tokens(a), &sorted_tokens(b))
}

/// Compares the shared words against each side's shared + remaining words.
pub fn token_set_ratio(a: &str, b: &str, partial: bool) -> i32 {
    if a == b && !a.is_empty() {
        return 100;
    }
    let tokens_a: FxHashSet<&str> = a.split_whitespace().collect();
    let tokens_b: FxHashSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let join_sorted = |mut words: Vec<&str>| {
        words.sort_unstable();
        words.join(" ")
    };
    let sect = join_sorted(tokens_a.intersection(&tokens_b).copied().collect());
    let diff_ab = join_sorted(tokens_a.difference(&tokens_b).copied().collect());
    let diff_ba = join_sorted(tokens_b.difference(&tokens_a).copied().collect());

    let combined_ab = format!("{sect} {diff_ab}").trim().to_string();
    let combined_ba = format!("{sect} {diff_ba}").trim().to_string();

    let ratio_of = ratio_fn(partial);
    [
        ratio_of(&sect, &combined_ab),
        ratio_of(&sect, &combined_ba),
        ratio_of(&combined_ab, &combined_ba),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

// ============================================================================
// Weighted Ratio
// ============================================================================

fn partial_scale(len_ratio: f64) -> f64 {
    PARTIAL_SCALES
        .iter()
        .find(|(bound, _)| len_ratio > *bound)
        .map_or(DEFAULT_PARTIAL_SCALE, |(_, scale)| *scale)
}

/// Similarity of two (already normalized) strings, 0..=100.
///
/// Strings of similar length are compared whole, plus order-insensitive token
/// ratios. When one string is at least 1.5x as long as the other, partial
/// ratios are used instead, scaled down the more the lengths differ.
pub fn weighted_ratio(a: &str, b: &str) -> i32 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }

    let base = ratio(a, b) as f64;
    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    let best = if len_ratio >= PARTIAL_LEN_RATIO {
        let scale = partial_scale(len_ratio);
        let partial = partial_ratio(a, b) as f64 * scale;
        let token_sort = token_sort_ratio(a, b, true) as f64 * TOKEN_SCALE * scale;
        let token_set = token_set_ratio(a, b, true) as f64 * TOKEN_SCALE * scale;
        base.max(partial).max(token_sort).max(token_set)
    } else {
        let token_sort = token_sort_ratio(a, b, false) as f64 * TOKEN_SCALE;
        let token_set = token_set_ratio(a, b, false) as f64 * TOKEN_SCALE;
        base.max(token_sort).max(token_set)
    };
    best.round_ties_even() as i32
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("abc", "abc"), 100);
        assert_eq!(ratio("abc", ""), 0);
        assert_eq!(ratio("abcd", "abce"), 75);
        assert_eq!(ratio("a", "b"), 0);
    }

    #[test]
    fn test_partial_ratio() {
        assert_eq!(partial_ratio("velvet", "red velvet"), 100);
        assert_eq!(partial_ratio("red velvet", "velvet"), 100);
        assert_eq!(partial_ratio("", "velvet"), 0);
        assert!(partial_ratio("xyz", "red velvet") < 50);
        // overlap at either end of the longer string still counts
        assert_eq!(partial_ratio("velvet red", "red velvet"), 75);
    }

    #[test]
    fn test_alignment_windows() {
        let needle: Vec<char> = "ab".chars().collect();
        let haystack: Vec<char> = "xbyaz".chars().collect();
        let windows: Vec<String> = alignment_windows(&needle, &haystack)
            .into_iter()
            .map(|w| w.iter().collect())
            .collect();
        assert_eq!(windows, vec!["xb", "by", "ya", "az"]);
    }

    #[test]
    fn test_token_ratios() {
        assert_eq!(token_sort_ratio("new world into", "into new world", false), 100);
        assert_eq!(token_set_ratio("world world new", "new world", false), 100);
        assert_eq!(token_set_ratio("", "new world", false), 0);
    }

    #[test]
    fn test_weighted_ratio_identity_and_empty() {
        assert_eq!(weighted_ratio("taeyeon", "taeyeon"), 100);
        assert_eq!(weighted_ratio("", "taeyeon"), 0);
        assert_eq!(weighted_ratio("taeyeon", ""), 0);
    }

    #[test]
    fn test_weighted_ratio_short_vs_long() {
        assert_eq!(weighted_ratio("a", "abcdefg"), 25);
        assert_eq!(weighted_ratio("abcdefg", "a"), 25);
    }

    #[test]
    fn test_weighted_ratio_token_order() {
        // Same words, different order: token sort gives 100 * 0.95
        assert_eq!(weighted_ratio("into the new world", "new world into the"), 95);
    }

    #[test]
    fn test_weighted_ratio_symmetric() {
        let pairs = [
            ("red velvet", "red velvet the reve festival"),
            ("goblin", "guardian the lonely and great god"),
            ("girls generation", "girls generation snsd"),
            ("ab", "ba"),
        ];
        for (a, b) in pairs {
            assert_eq!(weighted_ratio(a, b), weighted_ratio(b, a), "{a} / {b}");
        }
    }

    #[test]
    fn test_partial_scale() {
        assert_eq!(partial_scale(7.0), 0.25);
        assert_eq!(partial_scale(2.5), 0.45);
        assert_eq!(partial_scale(1.75), 0.625);
        assert_eq!(partial_scale(1.5), 0.75);
    }

    #[test]
    fn test_match_options_default() {
        let opts = MatchOptions::default();
        assert_eq!(opts.threshold, 80);
        assert_eq!(opts.romanization_bonus, 95);
    }
}
