//! Shared normalization functions for name matching.
//!
//! `normalize` produces the canonical form that fuzzy scores are computed on.
//! The remaining helpers are small text utilities shared by the name, artist
//! and album parsers.

use any_ascii::any_ascii;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

use crate::enclosure::{ends_with_enclosed, rsplit_enclosed_once};

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Any non-word character (Unicode aware).
pub static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").unwrap());

/// " OST" as a whole token; it would otherwise dominate scores of soundtrack titles.
static OST_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\sOST(?:$|\s|\)|\])").unwrap());

/// Regex to collapse multiple whitespace into single space
pub static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Characters treated as apostrophes in titles and credits.
pub const APOSTROPHES: &str = "'`\u{55a}\u{55b}\u{55c}\u{55d}\u{2018}\u{2019}";

const TITLE_CASE_SMALL_WORDS: &[&str] = &["an", "to", "in", "a", "by", "the", "and", "but", "for", "at", "of"];

// ============================================================================
// UNICODE HELPERS
// ============================================================================

/// Check if a character has a non-zero canonical combining class (accents, dakuten, etc).
pub fn is_combining_mark(c: char) -> bool {
    canonical_combining_class(c) != 0
}

/// Remove diacritics while leaving composed scripts such as Hangul intact.
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Fold text to lowercase ASCII: NFKD, drop combining marks, transliterate.
pub fn fold_to_ascii(s: &str) -> String {
    let stripped: String = s.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    any_ascii(&stripped).to_lowercase()
}

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Canonical form used for fuzzy comparison.
///
/// Non-word characters become spaces (when `strip_special`), whitespace runs
/// are joined with a single space (or removed entirely when `collapse_space`
/// is false), the "OST" token is dropped, and the result is lowercased and
/// stripped of diacritics. Text that is nothing but symbols keeps its symbols.
pub fn normalize(text: &str, strip_special: bool, collapse_space: bool) -> String {
    if text.is_empty() {
        return String::new();
    }
    let special_stripped = if strip_special {
        NON_WORD.replace_all(text, " ")
    } else {
        text.into()
    };
    let sep = if collapse_space { " " } else { "" };
    let joined = special_stripped.split_whitespace().collect::<Vec<_>>().join(sep);
    let mut result = OST_TOKEN.replace_all(&joined, "").to_lowercase().trim().to_string();
    if result.is_empty() {
        result = collapse_whitespace(text).to_lowercase();
    }
    strip_diacritics(&result)
}

/// `normalize` with the default options.
pub fn fuzz(text: &str) -> String {
    normalize(text, true, true)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn remove_whitespace(text: &str) -> String {
    text.split_whitespace().collect()
}

/// Replace typographic apostrophes with "'".
pub fn fix_apostrophes(text: &str) -> String {
    text.chars()
        .map(|c| if APOSTROPHES.contains(c) { '\'' } else { c })
        .collect()
}

/// Strip dash/quote/space padding left over after splitting a title.
pub fn clean(text: &str) -> &str {
    text.trim_matches(|c: char| matches!(c, ' ' | '-' | '"'))
}

// ============================================================================
// COMBINING / DISPLAY
// ============================================================================

/// Longest common suffix of all the given strings.
pub fn common_suffix<S: AsRef<str>>(parts: &[S]) -> String {
    let Some((first, rest)) = parts.split_first() else {
        return String::new();
    };
    let mut suffix: Vec<char> = first.as_ref().chars().rev().collect();
    for part in rest {
        let matched = suffix
            .iter()
            .zip(part.as_ref().chars().rev())
            .take_while(|(a, b)| *a == b)
            .count();
        suffix.truncate(matched);
    }
    suffix.into_iter().rev().collect()
}

/// Join parts as "a (b) (c)".
///
/// An enclosed suffix shared by every part ("X (Live)", "Y (Live)") is only
/// written once, at the end.
pub fn combine_with_parens<S: AsRef<str>>(parts: &[S]) -> String {
    match parts {
        [] => return String::new(),
        [only] => return only.as_ref().to_string(),
        _ => {}
    }

    let suffix = common_suffix(parts);
    let mut hoisted = None;
    if !suffix.is_empty() && ends_with_enclosed(&suffix, None).is_some() {
        if let Some(inner) = rsplit_enclosed_once(&suffix).last() {
            let enclosed = format!("({inner})");
            let slen = enclosed.chars().count();
            if parts.iter().all(|p| p.as_ref().chars().count() > slen) {
                hoisted = Some(enclosed);
            }
        }
    }

    let trimmed: Vec<String> = match &hoisted {
        Some(enclosed) => {
            let slen = enclosed.chars().count();
            parts
                .iter()
                .map(|p| {
                    let chars: Vec<char> = p.as_ref().chars().collect();
                    chars[..chars.len() - slen].iter().collect::<String>().trim().to_string()
                })
                .collect()
        }
        None => parts.iter().map(|p| p.as_ref().to_string()).collect(),
    };

    let rest: Vec<String> = trimmed[1..].iter().map(|p| format!("({p})")).collect();
    let combined = format!("{} {}", trimmed[0], rest.join(" "));
    match hoisted {
        Some(enclosed) => format!("{combined} {enclosed}"),
        None => combined,
    }
}

/// Capitalize words, keeping short articles/prepositions lowercase after the first word.
pub fn title_case(text: &str) -> String {
    let mut num = 0;
    WORD.replace_all(text, |caps: &regex::Captures| {
        let word = &caps[0];
        num += 1;
        let lower = word.to_lowercase();
        if num > 1 && TITLE_CASE_SMALL_WORDS.contains(&lower.as_str()) {
            return lower;
        }
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
            None => String::new(),
        }
    })
    .to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(fuzz("foo$"), "foo");
        assert_eq!(normalize("foo$", false, true), "foo$");
        assert_eq!(fuzz("! @\n#   $%"), "! @ # $%");
        assert_eq!(fuzz("  Red   Velvet  "), "red velvet");
        assert_eq!(normalize("Red Velvet", true, false), "redvelvet");
    }

    #[test]
    fn test_normalize_strips_ost() {
        assert_eq!(fuzz("Goblin OST"), "goblin");
        assert_eq!(fuzz("Goblin OST Part 1"), "goblinpart 1");
        assert_eq!(fuzz("Ghost Story"), "ghost story");
    }

    #[test]
    fn test_normalize_diacritics() {
        assert_eq!(fuzz("Beyoncé"), "beyonce");
        assert_eq!(fuzz("Motörhead"), "motorhead");
        assert_eq!(fuzz("소녀시대"), "소녀시대");
        assert_eq!(fuzz("Taeyeon (태연)"), "taeyeon 태연");
    }

    #[test]
    fn test_normalize_idempotent() {
        for text in [
            "Red Velvet - The ReVe Festival 'Finale' (Special Album)",
            "Goblin OST Part 1",
            "a ost ost b",
            "!!!",
            "Beyoncé & 소녀시대",
            "",
        ] {
            let once = fuzz(text);
            assert_eq!(fuzz(&once), once, "{text}");
        }
    }

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(fold_to_ascii("Björk"), "bjork");
        assert_eq!(fold_to_ascii("Beyoncé"), "beyonce");
    }

    #[test]
    fn test_fix_apostrophes_and_clean() {
        assert_eq!(fix_apostrophes("Girls\u{2019} Generation"), "Girls' Generation");
        assert_eq!(fix_apostrophes("`a`"), "'a'");
        assert_eq!(clean(" - \"Finale\" - "), "Finale");
    }

    #[test]
    fn test_combine_with_parens() {
        assert_eq!(combine_with_parens(&["a", "b"]), "a (b)");
        assert_eq!(combine_with_parens(&["a", "b", "c"]), "a (b) (c)");
        assert_eq!(combine_with_parens(&["only"]), "only");
        assert_eq!(combine_with_parens(&["Apink (Live)", "에이핑크 (Live)"]), "Apink (에이핑크) (Live)");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("the reve festival"), "The Reve Festival");
        assert_eq!(title_case("into THE new world"), "Into the New World");
        assert_eq!(title_case("a song of ice and fire"), "A Song of Ice and Fire");
    }
}
