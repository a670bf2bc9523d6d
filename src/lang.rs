//! Script-based language classification.
//!
//! Classification is per character: Hangul, kana, CJK ideographs, Latin, and
//! "other" alphabetic scripts. Digits, whitespace and punctuation are neutral
//! and do not affect the category of a string unless nothing else is present.

use std::collections::BTreeSet;

use serde::Serialize;

/// Ordering matters: it is used when sorting name parts by script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LangCat {
    Nul,
    Mix,
    Eng,
    Han,
    Jpn,
    Cjk,
    Other,
}

pub const NON_ENG: &[LangCat] = &[LangCat::Han, LangCat::Jpn, LangCat::Cjk, LangCat::Other];
pub const ASIAN: &[LangCat] = &[LangCat::Han, LangCat::Jpn, LangCat::Cjk];

impl LangCat {
    /// Category of a single character, or None for neutral characters.
    pub fn of_char(c: char) -> Option<LangCat> {
        match c as u32 {
            0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F | 0xA960..=0xA97F | 0xD7B0..=0xD7FF => {
                Some(LangCat::Han)
            }
            0x3040..=0x30FF | 0x31F0..=0x31FF | 0xFF66..=0xFF9F => Some(LangCat::Jpn),
            0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0xF900..=0xFAFF | 0x20000..=0x2FA1F => Some(LangCat::Cjk),
            0x0300..=0x036F => None,
            _ if c.is_ascii() => c.is_ascii_alphabetic().then_some(LangCat::Eng),
            0x00C0..=0x024F | 0x1E00..=0x1EFF | 0x2C60..=0x2C7F | 0xA720..=0xA7FF | 0xFF21..=0xFF3A
            | 0xFF41..=0xFF5A => Some(LangCat::Eng),
            _ if c.is_alphabetic() => Some(LangCat::Other),
            _ => None,
        }
    }

    /// The set of categories present in the given text.
    ///
    /// Non-empty text with only neutral characters is treated as English.
    pub fn categorize_set(text: &str) -> BTreeSet<LangCat> {
        let mut cats: BTreeSet<LangCat> = text.chars().filter_map(LangCat::of_char).collect();
        if cats.is_empty() && !text.trim().is_empty() {
            cats.insert(LangCat::Eng);
        }
        cats
    }

    pub fn categorize(text: &str) -> LangCat {
        LangCat::from_set(&LangCat::categorize_set(text))
    }

    /// Collapse a category set: kana plus ideographs is Japanese, anything else mixed is `Mix`.
    pub fn from_set(cats: &BTreeSet<LangCat>) -> LangCat {
        match cats.len() {
            0 => LangCat::Nul,
            1 => cats.iter().next().copied().unwrap_or(LangCat::Nul),
            2 if cats.contains(&LangCat::Jpn) && cats.contains(&LangCat::Cjk) => LangCat::Jpn,
            _ => LangCat::Mix,
        }
    }

    pub fn contains_any(text: &str, cats: &[LangCat]) -> bool {
        LangCat::categorize_set(text).iter().any(|cat| cats.contains(cat))
    }

    /// Split text into runs of English and non-English script.
    ///
    /// Neutral characters stay with the run they follow. Kana and ideographs
    /// share a run so mixed Japanese text is not broken apart.
    pub fn split(text: &str) -> Vec<String> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut current_key = None;
        for c in text.chars() {
            let key = LangCat::of_char(c).map(run_key);
            if let (Some(key), Some(prev)) = (key, current_key) {
                if key != prev {
                    parts.push(std::mem::take(&mut current));
                }
            }
            if key.is_some() {
                current_key = key;
            }
            current.push(c);
        }
        parts.push(current);
        parts
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }

    pub fn is_asian(self) -> bool {
        ASIAN.contains(&self)
    }
}

fn run_key(cat: LangCat) -> u8 {
    match cat {
        LangCat::Eng => 0,
        LangCat::Han => 1,
        LangCat::Jpn | LangCat::Cjk => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize() {
        assert_eq!(LangCat::categorize(""), LangCat::Nul);
        assert_eq!(LangCat::categorize("Taeyeon"), LangCat::Eng);
        assert_eq!(LangCat::categorize("2019"), LangCat::Eng);
        assert_eq!(LangCat::categorize("태연"), LangCat::Han);
        assert_eq!(LangCat::categorize("少女時代"), LangCat::Cjk);
        assert_eq!(LangCat::categorize("ほほえみ"), LangCat::Jpn);
        assert_eq!(LangCat::categorize("時をかける少女"), LangCat::Jpn);
        assert_eq!(LangCat::categorize("Taeyeon (태연)"), LangCat::Mix);
        assert_eq!(LangCat::categorize("Beyoncé"), LangCat::Eng);
        assert_eq!(LangCat::categorize("кино"), LangCat::Other);
    }

    #[test]
    fn test_contains_any() {
        assert!(LangCat::contains_any("(여자)아이들", NON_ENG));
        assert!(!LangCat::contains_any("(G)I-DLE", NON_ENG));
        assert!(LangCat::contains_any("(G)I-DLE", &[LangCat::Eng]));
        assert!(!LangCat::contains_any("", &[LangCat::Eng]));
    }

    #[test]
    fn test_split() {
        assert_eq!(
            LangCat::split("Heart 2 Heart with 소녀시대"),
            vec!["Heart 2 Heart with".to_string(), "소녀시대".to_string()]
        );
        assert_eq!(LangCat::split("Red Velvet"), vec!["Red Velvet".to_string()]);
        assert_eq!(LangCat::split("ちょこっとLOVE"), vec!["ちょこっと".to_string(), "LOVE".to_string()]);
    }
}
