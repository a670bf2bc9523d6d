//! Spelled-out numbers and ordinals in album titles.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::error::NumberError;

const SINGLES: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven", "twelve",
    "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
];

const TENS: &[&str] = &["", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety"];

const MAGNITUDES: &[(&str, i64)] = &[
    ("hundred", 100),
    ("thousand", 1_000),
    ("million", 1_000_000),
    ("billion", 1_000_000_000),
    ("trillion", 1_000_000_000_000),
];

const ORDINAL_WORDS: &[&str] = &[
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth", "tenth", "eleventh",
    "twelfth", "thirteenth", "fourteenth", "fifteenth", "sixteenth", "seventeenth", "eighteenth", "nineteenth",
    "twentieth",
];

static WORD_VALUES: Lazy<FxHashMap<&'static str, i64>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    for (i, word) in SINGLES.iter().enumerate() {
        map.insert(*word, i as i64);
    }
    for (i, word) in TENS.iter().enumerate().filter(|(_, w)| !w.is_empty()) {
        map.insert(*word, i as i64 * 10);
    }
    map
});

static NUMBER_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"-|\s").unwrap());

/// Ordinal keys in match priority order: "debut", the words, then "1st".."20th".
static ORDINAL_KEYS: Lazy<Vec<(String, u32)>> = Lazy::new(|| {
    let mut keys = vec![("debut".to_string(), 1)];
    keys.extend(ORDINAL_WORDS.iter().zip(1..).map(|(w, i)| (w.to_string(), i)));
    keys.extend((1..=20).map(|i| (format!("{i}{}", ordinal_suffix(i)), i)));
    keys
});

static ORDINAL_SEARCH: Lazy<Regex> = Lazy::new(|| {
    let alternation = ORDINAL_KEYS.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>().join("|");
    Regex::new(&format!("({alternation})")).unwrap()
});

/// Every word `parse_int_words` understands, magnitudes included.
pub fn number_words() -> impl Iterator<Item = &'static str> {
    SINGLES
        .iter()
        .chain(TENS.iter().filter(|w| !w.is_empty()))
        .chain(MAGNITUDES.iter().map(|(name, _)| name))
        .copied()
}

/// Parse "42", "forty-two" or "one hundred and five".
pub fn parse_int_words(text: &str) -> Result<i64, NumberError> {
    if let Ok(value) = text.trim().parse::<i64>() {
        return Ok(value);
    }

    let mut current = 0i64;
    let mut result = 0i64;
    for word in NUMBER_SEP.split(text).map(str::trim).filter(|w| !w.is_empty()) {
        let word = word.to_lowercase();
        if let Some(&(_, scale)) = MAGNITUDES.iter().find(|(name, _)| *name == word) {
            result += current * scale;
            current = 0;
        } else if let Some(value) = WORD_VALUES.get(word.as_str()) {
            current += value;
        } else if word != "and" {
            return Err(NumberError::InvalidWord { word });
        }
    }
    Ok(result + current)
}

/// First ordinal ("debut", "third", "5th") found in the text.
pub fn find_ordinal(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let found = ORDINAL_SEARCH.find(&lower)?;
    ORDINAL_KEYS
        .iter()
        .find(|(key, _)| key == found.as_str())
        .map(|(_, value)| *value)
}

/// English ordinal suffix: 1 -> "st", 12 -> "th", 23 -> "rd".
pub fn ordinal_suffix(num: u32) -> &'static str {
    if (11..=13).contains(&(num % 100)) {
        return "th";
    }
    match num % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_words() {
        assert_eq!(parse_int_words("42"), Ok(42));
        assert_eq!(parse_int_words(" 7 "), Ok(7));
        assert_eq!(parse_int_words("two"), Ok(2));
        assert_eq!(parse_int_words("Forty-Two"), Ok(42));
        assert_eq!(parse_int_words("one hundred and five"), Ok(105));
        assert_eq!(parse_int_words("two thousand nineteen"), Ok(2019));
    }

    #[test]
    fn test_parse_int_words_invalid() {
        assert_eq!(
            parse_int_words("two bananas"),
            Err(NumberError::InvalidWord { word: "bananas".to_string() })
        );
    }

    #[test]
    fn test_find_ordinal() {
        assert_eq!(find_ordinal("5th Mini Album"), Some(5));
        assert_eq!(find_ordinal("The Third Album"), Some(3));
        assert_eq!(find_ordinal("Debut Single"), Some(1));
        assert_eq!(find_ordinal("11th Single"), Some(11));
        assert_eq!(find_ordinal("Fourteenth"), Some(14));
        assert_eq!(find_ordinal("Special Album"), None);
    }

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(113), "th");
    }
}
