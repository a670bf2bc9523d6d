//! Romanization of Hangul and Japanese text.
//!
//! Hangul is matched with a regex built from per-syllable alternatives (every
//! common spelling of each lead, vowel and tail jamo), so both "annyeong"
//! and "annyung" match 안녕. Kana is romanized into a bounded set
//! of Hepburn/Kunrei spellings; ideographs fall back to `any_ascii`.

use any_ascii::any_ascii;
use regex::Regex;
use rustc_hash::FxHashSet;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// HANGUL
// ============================================================================

const HANGUL_BASE: u32 = 0xAC00;
const HANGUL_LAST: u32 = 0xD7A3;
const VOWEL_COUNT: u32 = 21;
const TAIL_COUNT: u32 = 28;

const LEADS: [&str; 19] = [
    "g|k", "kk|gg", "n", "d|t", "tt|dd", "r|l", "m", "b|p", "pp|bb", "s|sh", "ss", "", "j|ch", "jj", "ch", "k", "t",
    "p", "h",
];

const VOWELS: [&str; 21] = [
    "a", "ae", "ya", "yae", "eo|u|o", "e", "yeo|yu|yo", "ye", "o", "wa", "wae", "oe|we", "yo", "u|oo", "wo", "we",
    "wi", "yu", "eu|u", "ui|eui|i", "i|ee",
];

const TAILS: [&str; 28] = [
    "", "k|g", "k|kk", "k|ks", "n", "n|nj", "n|nh", "t|d", "l|r", "k|lk", "m|lm", "l|lb", "l|ls", "l|lt", "p|lp",
    "l|lh", "m", "p|b", "p|ps", "t|s", "t|ss", "ng", "t|j", "t|ch", "k", "t", "p", "t|h",
];

fn push_group(pattern: &mut String, alternatives: &str) {
    if alternatives.is_empty() {
        return;
    }
    pattern.push_str("(?:");
    pattern.push_str(alternatives);
    pattern.push(')');
}

/// Regex source matching the romanized spellings of `text` (lowercase, no spaces).
pub fn hangul_pattern_source(text: &str) -> String {
    let mut pattern = String::from("^");
    for c in text.chars() {
        let code = c as u32;
        if (HANGUL_BASE..=HANGUL_LAST).contains(&code) {
            let offset = code - HANGUL_BASE;
            let lead = offset / (VOWEL_COUNT * TAIL_COUNT);
            let vowel = (offset % (VOWEL_COUNT * TAIL_COUNT)) / TAIL_COUNT;
            let tail = offset % TAIL_COUNT;
            push_group(&mut pattern, LEADS[lead as usize]);
            push_group(&mut pattern, VOWELS[vowel as usize]);
            push_group(&mut pattern, TAILS[tail as usize]);
        } else {
            let lower: String = c.to_lowercase().collect();
            pattern.push_str(&regex::escape(&lower));
        }
    }
    pattern.push('$');
    pattern
}

/// Compiled romanization matcher for Hangul text; None for empty text.
pub fn hangul_pattern(text: &str) -> Option<Regex> {
    if text.is_empty() {
        return None;
    }
    Regex::new(&hangul_pattern_source(text)).ok()
}

// ============================================================================
// KANA
// ============================================================================

/// Upper bound on the number of spellings generated for one string.
pub const MAX_ROMANIZATIONS: usize = 256;

const HIRAGANA_START: u32 = 0x3041;
const KATAKANA_START: u32 = 0x30A1;
const KATAKANA_END: u32 = 0x30F6;
const KANA_OFFSET: u32 = KATAKANA_START - HIRAGANA_START;

fn to_hiragana(c: char) -> char {
    let code = c as u32;
    if (KATAKANA_START..=KATAKANA_END).contains(&code) {
        char::from_u32(code - KANA_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

fn kana_romaji(c: char) -> Option<&'static [&'static str]> {
    let romaji: &'static [&'static str] = match c {
        'あ' => &["a"],
        'い' => &["i"],
        'う' => &["u"],
        'え' => &["e"],
        'お' => &["o"],
        'か' => &["ka"],
        'き' => &["ki"],
        'く' => &["ku"],
        'け' => &["ke"],
        'こ' => &["ko"],
        'が' => &["ga"],
        'ぎ' => &["gi"],
        'ぐ' => &["gu"],
        'げ' => &["ge"],
        'ご' => &["go"],
        'さ' => &["sa"],
        'し' => &["shi", "si"],
        'す' => &["su"],
        'せ' => &["se"],
        'そ' => &["so"],
        'ざ' => &["za"],
        'じ' => &["ji", "zi"],
        'ず' => &["zu"],
        'ぜ' => &["ze"],
        'ぞ' => &["zo"],
        'た' => &["ta"],
        'ち' => &["chi", "ti"],
        'つ' => &["tsu", "tu"],
        'て' => &["te"],
        'と' => &["to"],
        'だ' => &["da"],
        'ぢ' => &["ji", "di"],
        'づ' => &["zu", "du"],
        'で' => &["de"],
        'ど' => &["do"],
        'な' => &["na"],
        'に' => &["ni"],
        'ぬ' => &["nu"],
        'ね' => &["ne"],
        'の' => &["no"],
        'は' => &["ha", "wa"],
        'ひ' => &["hi"],
        'ふ' => &["fu", "hu"],
        'へ' => &["he", "e"],
        'ほ' => &["ho"],
        'ば' => &["ba"],
        'び' => &["bi"],
        'ぶ' => &["bu"],
        'べ' => &["be"],
        'ぼ' => &["bo"],
        'ぱ' => &["pa"],
        'ぴ' => &["pi"],
        'ぷ' => &["pu"],
        'ぺ' => &["pe"],
        'ぽ' => &["po"],
        'ま' => &["ma"],
        'み' => &["mi"],
        'む' => &["mu"],
        'め' => &["me"],
        'も' => &["mo"],
        'や' => &["ya"],
        'ゆ' => &["yu"],
        'よ' => &["yo"],
        'ら' => &["ra"],
        'り' => &["ri"],
        'る' => &["ru"],
        'れ' => &["re"],
        'ろ' => &["ro"],
        'わ' | 'ゎ' => &["wa"],
        'ゐ' => &["wi", "i"],
        'ゑ' => &["we", "e"],
        'を' => &["wo", "o"],
        'ん' => &["n"],
        'ゔ' => &["vu", "bu"],
        _ => return None,
    };
    Some(romaji)
}

fn small_y_vowel(c: char) -> Option<&'static str> {
    match c {
        'ゃ' => Some("a"),
        'ゅ' => Some("u"),
        'ょ' => Some("o"),
        _ => None,
    }
}

fn small_vowel(c: char) -> Option<char> {
    match c {
        'ぁ' => Some('a'),
        'ぃ' => Some('i'),
        'ぅ' => Some('u'),
        'ぇ' => Some('e'),
        'ぉ' => Some('o'),
        _ => None,
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'i' | 'u' | 'e' | 'o')
}

/// "ki" + "ゃ" -> "kya"; "shi" + "ゃ" -> "sha"
fn apply_yoon(unit: &mut [String], vowel: &str) {
    for alt in unit.iter_mut() {
        if alt.len() < 2 || !alt.ends_with('i') {
            alt.push('y');
            alt.push_str(vowel);
            continue;
        }
        alt.pop();
        if !(alt.ends_with("sh") || alt.ends_with("ch") || alt.ends_with('j')) {
            alt.push('y');
        }
        alt.push_str(vowel);
    }
}

/// "fu" + "ぁ" -> "fa"; "te" + "ぃ" -> "ti"
fn apply_small_vowel(unit: &mut [String], vowel: char) {
    for alt in unit.iter_mut() {
        if alt.chars().last().is_some_and(is_vowel) {
            alt.pop();
        }
        alt.push(vowel);
    }
}

fn apply_sokuon(alternatives: Vec<String>) -> Vec<String> {
    let mut doubled = Vec::with_capacity(alternatives.len() * 2);
    for alt in alternatives {
        match alt.chars().next() {
            Some(first) if !is_vowel(first) => {
                if alt.starts_with("ch") {
                    doubled.push(format!("t{alt}"));
                }
                doubled.push(format!("{first}{alt}"));
            }
            _ => doubled.push(alt),
        }
    }
    doubled
}

/// Split text into romanization units, each with its alternative spellings.
fn romaji_units(text: &str) -> Vec<Vec<String>> {
    let mut units: Vec<Vec<String>> = Vec::new();
    let mut sokuon = false;
    for c in text.nfkc().map(to_hiragana) {
        if let Some(vowel) = small_y_vowel(c) {
            match units.last_mut() {
                Some(last) => apply_yoon(last, vowel),
                None => units.push(vec![format!("y{vowel}")]),
            }
            continue;
        }
        if let Some(vowel) = small_vowel(c) {
            match units.last_mut() {
                Some(last) => apply_small_vowel(last, vowel),
                None => units.push(vec![vowel.to_string()]),
            }
            continue;
        }
        if c == 'っ' {
            sokuon = true;
            continue;
        }
        if c == 'ー' {
            let prev_vowel = units
                .last()
                .and_then(|last| last.first())
                .and_then(|alt| alt.chars().last())
                .filter(|v| is_vowel(*v));
            match prev_vowel {
                Some(v) => units.push(vec![v.to_string(), String::new()]),
                None => units.push(vec![String::new()]),
            }
            continue;
        }

        let alternatives: Vec<String> = match kana_romaji(c) {
            Some(romaji) => romaji.iter().map(|r| r.to_string()).collect(),
            None if c.is_alphanumeric() => vec![any_ascii(&c.to_string()).to_lowercase()],
            None => continue,
        };
        if std::mem::take(&mut sokuon) {
            units.push(apply_sokuon(alternatives));
        } else {
            units.push(alternatives);
        }
    }
    units
}

fn cartesian(units: &[Vec<String>], limit: usize) -> Vec<String> {
    let mut results = vec![String::new()];
    for unit in units {
        let mut next = Vec::with_capacity(results.len() * unit.len());
        'outer: for prefix in &results {
            for alt in unit {
                if next.len() >= limit {
                    break 'outer;
                }
                next.push(format!("{prefix}{alt}"));
            }
        }
        results = next;
    }
    results
}

/// Romanized spellings of Japanese (or other CJK) text, lowercased with only
/// alphanumerics kept.
pub fn japanese_romanizations(text: &str) -> FxHashSet<String> {
    let units = romaji_units(text);
    let mut romanizations = FxHashSet::default();
    if units.is_empty() {
        return romanizations;
    }
    for spelling in cartesian(&units, MAX_ROMANIZATIONS) {
        for variant in [
            spelling.clone(),
            spelling.replace("ou", "o"),
            spelling.replace("uu", "u"),
            spelling.replace("ou", "o").replace("uu", "u"),
        ] {
            let cleaned: String = variant.chars().filter(|c| c.is_alphanumeric()).collect();
            if !cleaned.is_empty() {
                romanizations.insert(cleaned);
            }
        }
    }
    romanizations
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hangul_matches(hangul: &str, text: &str) -> bool {
        hangul_pattern(hangul).is_some_and(|p| p.is_match(text))
    }

    #[test]
    fn test_hangul_pattern() {
        assert!(hangul_matches("안녕", "annyeong"));
        assert!(hangul_matches("안녕", "annyung"));
        assert!(!hangul_matches("안녕", "goodbye"));
        assert!(!hangul_matches("안녕", "annyeonghaseyo"));
        assert!(hangul_matches("태연", "taeyeon"));
        assert!(hangul_matches("소녀시대", "sonyeosidae"));
        assert!(hangul_matches("소녀시대", "sonyeoshidae"));
        assert!(hangul_pattern("").is_none());
    }

    #[test]
    fn test_hangul_pattern_keeps_other_chars() {
        assert_eq!(hangul_pattern_source("a1"), "^a1$");
        assert!(hangul_matches("2am", "2am"));
    }

    #[test]
    fn test_japanese_romanizations() {
        assert!(japanese_romanizations("さくら").contains("sakura"));
        assert!(japanese_romanizations("ほほえみ").contains("hohoemi"));
        let tokyo = japanese_romanizations("トウキョウ");
        assert!(tokyo.contains("toukyou"));
        assert!(tokyo.contains("tokyo"));
        let choko = japanese_romanizations("ちょこっと");
        assert!(choko.contains("chokotto"));
        assert!(choko.contains("tyokotto"));
    }

    #[test]
    fn test_japanese_romanizations_small_kana() {
        assert!(japanese_romanizations("ファン").contains("fan"));
        assert!(japanese_romanizations("シャイ").contains("shai"));
        assert!(japanese_romanizations("ラーメン").contains("raamen"));
        assert!(japanese_romanizations("ラーメン").contains("ramen"));
    }

    #[test]
    fn test_romanizations_capped() {
        let text = "しちしちしちしちしちしちしちしちしちしち";
        assert!(japanese_romanizations(text).len() <= MAX_ROMANIZATIONS * 4);
        assert!(japanese_romanizations("").is_empty());
    }
}
