//! Balanced bracket/quote extraction for free-text titles.
//!
//! Several opener characters may close with the same closer (and the reverse),
//! so the lookup tables map each character to a list of counterparts. Scans
//! work on `char` indices; reverse scans run over the reversed string and
//! swap the tables, then reverse the pieces back before returning them.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::error::EnclosureError;

// ============================================================================
// CHARACTER TABLES
// ============================================================================

/// Openers, paired position-wise with [`CLOSERS`].
pub const OPENERS: &str = "([{~`\"'\u{ff5e}\u{201c}\u{55a}\u{55b}\u{55c}\u{55d}\u{201c}\u{207d}\u{208d}\u{2308}\u{230a}\
\u{2329}\u{3008}\u{300a}\u{300c}\u{300e}\u{3010}\u{3014}\u{3016}\u{3018}\u{301a}\u{301d}\u{301d}\u{fe59}\u{fe5b}\
\u{fe5d}\u{ff08}\u{ff3b}\u{ff5b}\u{ff5f}\u{ff62}\u{2010}\u{2018}-<";

pub const CLOSERS: &str = ")]}~`\"'\u{ff5e}\u{201c}\u{55a}\u{55b}\u{55c}\u{55d}\u{201d}\u{207e}\u{208e}\u{2309}\u{230b}\
\u{232a}\u{3009}\u{300b}\u{300d}\u{300f}\u{3011}\u{3015}\u{3017}\u{3019}\u{301b}\u{301e}\u{301f}\u{fe5a}\u{fe5c}\
\u{fe5e}\u{ff09}\u{ff3d}\u{ff5d}\u{ff60}\u{ff63}\u{2010}\u{2019}->";

/// Characters that are ignored by default when looking for unpaired enclosers.
pub const DASH_CHARS: &str = "~\u{2010}-";

pub const QUOTE_CHARS: &str = "`\"'\u{201c}\u{55a}\u{55b}\u{55c}\u{55d}\u{201d}\u{301e}\u{301f}\u{301d}\u{2019}";

type CharMap = FxHashMap<char, Vec<char>>;

fn build_char_map(keys: &str, values: &str) -> CharMap {
    let mut map = CharMap::default();
    for (k, v) in keys.chars().zip(values.chars()) {
        map.entry(k).or_default().push(v);
    }
    map
}

pub static OPENER_TO_CLOSER: Lazy<CharMap> = Lazy::new(|| build_char_map(OPENERS, CLOSERS));
pub static CLOSER_TO_OPENER: Lazy<CharMap> = Lazy::new(|| build_char_map(CLOSERS, OPENERS));

/// An apostrophe inside a word ("don't") or a possessive "'s" is not a quote.
static APOSTROPHE_IN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:\S's\b|\w'\w)").unwrap());

/// Returns (opener→closer, closer→opener) for the given scan direction.
fn scan_maps(reverse: bool) -> (&'static CharMap, &'static CharMap) {
    if reverse {
        (&CLOSER_TO_OPENER, &OPENER_TO_CLOSER)
    } else {
        (&OPENER_TO_CLOSER, &CLOSER_TO_OPENER)
    }
}

fn scan_chars(text: &str, reverse: bool) -> Vec<char> {
    let mut chars: Vec<char> = text.chars().collect();
    if reverse {
        chars.reverse();
    }
    chars
}

fn collect_trimmed(chars: &[char]) -> String {
    chars.iter().collect::<String>().trim().to_string()
}

fn reversed(text: &str) -> String {
    text.chars().rev().collect()
}

/// Checks the 3-char window around `i`, in reading order, for an in-word apostrophe.
fn should_skip(chars: &[char], i: usize, reverse: bool) -> bool {
    if chars[i] != '\'' {
        return false;
    }
    let window: String = if reverse {
        if i + 1 >= chars.len() {
            return false;
        }
        let mut w = vec![chars[i + 1], chars[i]];
        if i > 0 {
            w.push(chars[i - 1]);
        }
        w.into_iter().collect()
    } else {
        if i == 0 {
            return false;
        }
        chars[i - 1..(i + 2).min(chars.len())].iter().collect()
    };
    APOSTROPHE_IN_WORD.is_match(&window)
}

// ============================================================================
// PARTITIONING
// ============================================================================

/// Location of an enclosed region within the (possibly reversed) scan buffer.
struct Located {
    chars: Vec<char>,
    /// Index of the first enclosed character (one past the opener).
    first_k: usize,
    /// Index of the closer.
    end: usize,
}

fn locate(text: &str, reverse: bool, inner: bool) -> Option<Located> {
    let chars = scan_chars(text, reverse);
    let (opener_to_closer, closer_to_opener) = scan_maps(reverse);

    let mut opened: FxHashMap<char, usize> = FxHashMap::default();
    let mut closed: FxHashMap<char, usize> = FxHashMap::default();
    // LIFO of start indices per opener
    let mut first: FxHashMap<char, Vec<usize>> = FxHashMap::default();
    let mut pairs: Vec<(usize, usize)> = Vec::new();

    for i in 0..chars.len() {
        let c = chars[i];
        if let Some(openers) = closer_to_opener.get(&c) {
            if should_skip(&chars, i, reverse) {
                continue;
            }
            for &opener in openers {
                let open_count = opened.get(&opener).copied().unwrap_or(0);
                let close_count = closed.entry(opener).or_insert(0);
                if open_count > *close_count {
                    *close_count += 1;
                }
                if open_count == 0 || open_count != *close_count {
                    continue;
                }
                let Some(first_k) = first.get_mut(&opener).and_then(Vec::pop) else {
                    continue;
                };
                if inner {
                    return Some(Located { chars, first_k, end: i });
                }
                if first.get(&opener).is_some_and(Vec::is_empty) {
                    first.remove(&opener);
                }
                match first.values().filter_map(|starts| starts.first()).min() {
                    Some(&earliest) if first_k >= earliest => pairs.push((first_k, i)),
                    _ => return Some(Located { chars, first_k, end: i }),
                }
            }
        }
        if opener_to_closer.contains_key(&c) {
            let open_count = opened.entry(c).or_insert(0);
            if *open_count == closed.get(&c).copied().unwrap_or(0) {
                first.entry(c).or_default().push(i + 1);
            }
            *open_count += 1;
        }
    }

    pairs
        .into_iter()
        .min()
        .map(|(first_k, end)| Located { chars, first_k, end })
}

impl Located {
    fn pieces(&self, reverse: bool) -> (String, String, String) {
        let a = collect_trimmed(&self.chars[..self.first_k - 1]);
        let b = collect_trimmed(&self.chars[self.first_k..self.end]);
        let c = collect_trimmed(&self.chars[self.end + 1..]);
        if reverse {
            (reversed(&c), reversed(&b), reversed(&a))
        } else {
            (a, b, c)
        }
    }
}

/// Split text into (before, enclosed, after) around the first complete enclosed region.
///
/// Regions that start earliest win, unless `inner` is set, in which case the
/// first region to close is returned. With `reverse`, the scan runs right to
/// left but the returned pieces keep reading order.
pub fn partition_enclosed(text: &str, reverse: bool, inner: bool) -> Result<(String, String, String), EnclosureError> {
    locate(text, reverse, inner)
        .map(|loc| loc.pieces(reverse))
        .ok_or_else(|| EnclosureError::NotFound { text: text.to_string() })
}

// ============================================================================
// SPLITTING
// ============================================================================

/// Split out enclosed substrings, dropping empty pieces.
///
/// `recurse` controls how many levels of enclosed text are split further.
/// When `maxsplit` is at least 1 it bounds the number of splits; an enclosed
/// region that would exceed the bound stays attached to its neighbour.
/// Text without any enclosed region comes back as a single piece.
pub fn split_enclosed(text: &str, reverse: bool, inner: bool, recurse: i32, maxsplit: i32) -> Vec<String> {
    if maxsplit < 1 {
        return split_unbounded(text, reverse, inner, recurse);
    }
    let Some(loc) = locate(text, reverse, inner) else {
        return vec![text.to_string()];
    };

    let (mut a, mut b, mut c) = loc.pieces(reverse);
    let mut piece_count = [&a, &b, &c].iter().filter(|p| !p.is_empty()).count() as i32;
    if maxsplit == 1 && piece_count > 2 {
        let opener_idx = loc.first_k - 1;
        let head = collect_trimmed(&loc.chars[..opener_idx]);
        let tail = collect_trimmed(&loc.chars[opener_idx..]);
        (a, b) = if reverse { (reversed(&tail), reversed(&head)) } else { (head, tail) };
        c = String::new();
        piece_count = 2;
    }

    let mut maxsplit = maxsplit - (piece_count - 1);
    let mut combined = Vec::new();
    for (part, do_split) in [(a, true), (b, recurse != 0), (c, true)] {
        if part.is_empty() {
            continue;
        }
        if !do_split {
            combined.push(part);
        } else if maxsplit != 0 {
            let split = split_enclosed(&part, reverse, inner, recurse - 1, maxsplit);
            maxsplit -= split.len() as i32 - 1;
            combined.extend(split);
        } else {
            let split = split_enclosed(&part, reverse, inner, recurse - 1, 1);
            if split.len() == 1 {
                combined.extend(split);
            } else {
                combined.push(part);
            }
        }
    }
    combined
}

fn split_unbounded(text: &str, reverse: bool, inner: bool, recurse: i32) -> Vec<String> {
    let Ok((a, b, c)) = partition_enclosed(text, reverse, inner) else {
        return vec![text.to_string()];
    };
    let mut parts = Vec::new();
    if recurse > 0 {
        for part in [a, b, c] {
            parts.extend(split_unbounded(&part, reverse, inner, recurse - 1));
        }
    } else {
        parts.extend(split_unbounded(&a, reverse, inner, 0));
        parts.push(b);
        parts.extend(split_unbounded(&c, reverse, inner, 0));
    }
    parts.retain(|p| !p.is_empty());
    parts
}

/// Split at most once, scanning from the end: "a (b)" → ["a", "b"].
pub fn rsplit_enclosed_once(text: &str) -> Vec<String> {
    split_enclosed(text, true, false, 0, 1)
}

// ============================================================================
// ENDINGS / UNPAIRED CHARACTERS
// ============================================================================

/// The (opener, closer) pair when text ends with a closer whose opener appears earlier.
pub fn ends_with_enclosed(text: &str, exclude: Option<&str>) -> Option<(char, char)> {
    let mut chars: Vec<char> = text.chars().collect();
    if chars.len() < 2 {
        return None;
    }
    let closer = chars.pop()?;
    if exclude.is_some_and(|ex| ex.contains(closer)) {
        return None;
    }
    let openers = CLOSER_TO_OPENER.get(&closer)?;
    openers
        .iter()
        .find(|&&opener| chars.contains(&opener))
        .map(|&opener| (opener, closer))
}

pub fn is_enclosed(text: &str, opener: char, closer: char) -> bool {
    text.starts_with(opener) && text.ends_with(closer)
}

/// Remove the enclosing pair if the whole string is enclosed.
///
/// With `unpaired`, a lone opener/closer at either end is removed as well.
pub fn strip_enclosed(text: &str, unpaired: bool, exclude: Option<&str>) -> String {
    if let Some((opener, _)) = ends_with_enclosed(text, exclude) {
        if text.starts_with(opener) {
            let mut chars = text.chars();
            chars.next();
            chars.next_back();
            return chars.as_str().trim().to_string();
        }
    }
    if unpaired {
        return strip_unpaired(text, false, DASH_CHARS);
    }
    text.to_string()
}

/// Char index of the earliest unpaired opener/closer, ignoring `exclude`.
fn unpaired_index(text: &str, reverse: bool, exclude: &str) -> Option<usize> {
    let chars = scan_chars(text, reverse);
    let (opener_to_closer, closer_to_opener) = scan_maps(reverse);

    let mut opened: FxHashMap<char, usize> = FxHashMap::default();
    let mut closed: FxHashMap<char, usize> = FxHashMap::default();
    let mut last: FxHashMap<char, Vec<usize>> = FxHashMap::default();
    let count = |map: &FxHashMap<char, usize>, c: char| map.get(&c).copied().unwrap_or(0);

    for (i, &c) in chars.iter().enumerate() {
        if opener_to_closer.contains_key(&c) {
            let mut is_open = true;
            if let Some(keys) = closer_to_opener.get(&c) {
                for &k in keys {
                    if count(&opened, k) > count(&closed, k) {
                        is_open = false;
                        if let Some(starts) = last.get_mut(&k) {
                            starts.pop();
                        }
                        *closed.entry(k).or_insert(0) += 1;
                    }
                }
            }
            if is_open {
                *opened.entry(c).or_insert(0) += 1;
                last.entry(c).or_default().push(i);
            }
        } else if let Some(keys) = closer_to_opener.get(&c) {
            for &k in keys {
                if count(&opened, k) > count(&closed, k) {
                    if let Some(starts) = last.get_mut(&k) {
                        starts.pop();
                    }
                    *closed.entry(k).or_insert(0) += 1;
                } else if !exclude.contains(k) {
                    last.entry(c).or_default().push(i);
                    break;
                }
            }
        }
    }

    let i = last
        .iter()
        .filter(|(k, starts)| !starts.is_empty() && !exclude.contains(**k))
        .map(|(_, starts)| starts[0])
        .min()?;
    Some(if reverse { chars.len() - 1 - i } else { i })
}

/// The earliest opener/closer that has no counterpart.
pub fn get_unpaired(text: &str, reverse: bool, exclude: &str) -> Option<char> {
    unpaired_index(text, reverse, exclude).and_then(|i| text.chars().nth(i))
}

pub fn has_unpaired(text: &str, reverse: bool, exclude: &str) -> bool {
    unpaired_index(text, reverse, exclude).is_some()
}

/// Drop an unpaired opener/closer when it is the first or last character.
pub fn strip_unpaired(text: &str, reverse: bool, exclude: &str) -> String {
    if let Some(i) = unpaired_index(text, reverse, exclude) {
        let len = text.chars().count();
        if i == 0 {
            return text.chars().skip(1).collect::<String>().trim().to_string();
        } else if i == len - 1 {
            return text.chars().take(len - 1).collect::<String>().trim().to_string();
        }
    }
    text.to_string()
}

// ============================================================================
// SINGLE PAIR EXTRACTION
// ============================================================================

/// First top-level balanced interior for one opener/closer pair, stripped of quotes/spaces.
///
/// Returns the original text when no balanced region exists.
pub fn parenthesized(text: &str, opener: char, closer: char) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut opened = 0;
    let mut closed = 0;
    let mut first = 0;
    for (i, &c) in chars.iter().enumerate() {
        if c == opener {
            if opened == 0 {
                first = i + 1;
            }
            opened += 1;
        } else if c == closer {
            if opened > closed {
                closed += 1;
            }
            if opened > 0 && opened == closed {
                return chars[first..i]
                    .iter()
                    .collect::<String>()
                    .trim_matches(|c: char| matches!(c, '\'' | '"' | ' '))
                    .to_string();
            }
        }
    }
    text.to_string()
}

// ============================================================================
// TESTS
// ============================================================================
