//! English word detection used to tell English titles from romanized ones.
//!
//! Backed by an embedded word list; see `data/words.txt`.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

const WORD_LIST: &str = include_str!("../data/words.txt");

/// Words further than this from every list entry count as fully misspelled.
pub const MAX_EDIT_DISTANCE: usize = 2;

static WORD_FINDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

static SPELL_CHECKER: Lazy<SpellChecker> = Lazy::new(SpellChecker::embedded);

pub struct SpellChecker {
    words: FxHashSet<String>,
}

impl SpellChecker {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn embedded() -> Self {
        let checker = Self::new(WORD_LIST.lines());
        log::debug!("Loaded spellcheck word list with {} words", checker.words.len());
        checker
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// True when every word in the text is a known English word.
    pub fn is_english(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        WORD_FINDER.find_iter(&lower).all(|m| self.contains(m.as_str()))
    }

    /// Edit distance to the closest known word, if within `MAX_EDIT_DISTANCE`.
    fn distance(&self, word: &str) -> Option<usize> {
        if self.contains(word) {
            return Some(0);
        }
        let word_len = word.chars().count();
        self.words
            .iter()
            .filter(|known| known.chars().count().abs_diff(word_len) <= MAX_EDIT_DISTANCE)
            .map(|known| strsim::levenshtein(word, known))
            .filter(|&dist| dist <= MAX_EDIT_DISTANCE)
            .min()
    }

    /// Share of word characters that would stay unchanged when correcting
    /// each word to its closest known word, in 0.0..=1.0.
    pub fn english_probability(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut total_dist = 0;
        let mut char_count = 0;
        for word in lower.split_whitespace() {
            let len = word.chars().count();
            char_count += len;
            total_dist += self.distance(word).unwrap_or(len).min(len);
        }
        if char_count == 0 {
            return 0.0;
        }
        (char_count - total_dist) as f64 / char_count as f64
    }
}

pub fn is_english(text: &str) -> bool {
    SPELL_CHECKER.is_english(text)
}

pub fn english_probability(text: &str) -> f64 {
    SPELL_CHECKER.english_probability(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_english() {
        assert!(is_english("Into the New World"));
        assert!(is_english("Special Album"));
        assert!(!is_english("Dasi Mannan Segye"));
        assert!(!is_english("Sonyeosidae"));
    }

    #[test]
    fn test_english_probability() {
        assert_eq!(english_probability("love"), 1.0);
        assert_eq!(english_probability(""), 0.0);
        // one substitution away from "love"
        assert_eq!(english_probability("lave"), 0.75);
        assert_eq!(english_probability("xqzxqzxqz"), 0.0);
    }

    #[test]
    fn test_custom_word_list() {
        let checker = SpellChecker::new(["Hello", " world ", ""]);
        assert!(checker.is_english("hello, world!"));
        assert!(!checker.is_english("hello there"));
        assert_eq!(checker.english_probability("hello there"), 0.5);
    }
}
