//! Artist credit splitting: "A, B (of Group) & C (feat. D, E)" -> [Name].
//!
//! Delimiters are `;`, `,`, `&` and " x " / " × " (unless followed by "(").
//! A delimiter inside an unclosed bracket does not split. Credits written as
//! two parallel lists ("A, B (GroupA, GroupB)") are paired up positionally.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::enclosure::{ends_with_enclosed, get_unpaired, has_unpaired, rsplit_enclosed_once, DASH_CHARS};
use crate::error::ArtistListError;
use crate::lang::LangCat;
use crate::models::Extra;
use crate::name::Name;
use crate::normalize::fix_apostrophes;

static DELIMITER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[;,&]| [x×] ").unwrap());

/// One credit entry before it becomes a `Name`: raw text, or already-paired parts.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CreditPart {
    Text(String),
    Parts(Vec<String>),
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Split a raw artist credit string into names.
///
/// When the list is unbalanced and the text looks like it lost a final ")",
/// the split is retried once with the bracket restored.
pub fn split_artists(text: &str) -> Result<Vec<Name>, ArtistListError> {
    match split_artists_inner(text) {
        Err(err @ ArtistListError::UnexpectedListFormat { .. }) => {
            if ends_with_enclosed(text, None).is_some() && get_unpaired(text, true, DASH_CHARS) == Some('(') {
                log::debug!("Retrying artist split with a closing bracket appended to {text:?}");
                split_artists_inner(&format!("{text})"))
            } else {
                Err(err)
            }
        }
        result => result,
    }
}

/// Split a delimited list, keeping enclosed sub-lists together.
///
/// With `reverse`, the entries are returned last to first.
pub fn split_str_list(text: &str, reverse: bool) -> Result<Vec<String>, ArtistListError> {
    let mut processed: Vec<String> = Vec::new();
    let mut processing: Vec<String> = Vec::new();

    for (i, part) in split_on_delimiters(text).into_iter().enumerate() {
        let part = fix_apostrophes(part);
        let exclude = if part.matches('\'').count() % 2 == 1 {
            format!("'{DASH_CHARS}")
        } else {
            DASH_CHARS.to_string()
        };

        if has_unpaired(&part, true, &exclude) {
            processing.push(part);
            if processing.len() > 1 {
                processed.push(processing.concat());
                processing.clear();
            }
        } else if !processing.is_empty() {
            processing.push(part);
        } else if i % 2 == 0 {
            processed.push(part);
        }
    }

    if !processing.is_empty() {
        return Err(ArtistListError::UnexpectedListFormat {
            text: text.to_string(),
            processed,
            processing,
        });
    }

    let mut parts: Vec<String> = processed.iter().map(|p| p.trim().to_string()).collect();
    if reverse {
        parts.reverse();
    }
    Ok(parts)
}

// ============================================================================
// DELIMITERS
// ============================================================================

fn delimiter_spans(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    DELIMITER
        .find_iter(text)
        .filter(move |m| !(m.as_str().starts_with(' ') && text[m.end()..].starts_with('(')))
        .map(|m| (m.start(), m.end()))
}

fn contains_delimiter(text: &str) -> bool {
    delimiter_spans(text).next().is_some()
}

/// Alternating [before, delimiter, before, delimiter, ..., after] slices.
fn split_on_delimiters(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for (start, end) in delimiter_spans(text) {
        pieces.push(&text[last..start]);
        pieces.push(&text[start..end]);
        last = end;
    }
    if last == 0 {
        pieces.push(text);
    } else if last < text.len() {
        pieces.push(&text[last..]);
    }
    pieces
}

/// A delimiter, then an opening bracket, then the same delimiter again.
fn looks_unzipped(text: &str) -> bool {
    DELIMITER.find_iter(text).any(|m| {
        let rest = &text[m.end()..];
        let delim = m.as_str().to_lowercase();
        rest.find(['(', '['])
            .is_some_and(|pos| rest[pos + 1..].to_lowercase().contains(&delim))
    })
}

// ============================================================================
// UNZIPPED LISTS
// ============================================================================

fn split_artists_inner(text: &str) -> Result<Vec<Name>, ArtistListError> {
    let entries = match unzipped_list_pairs(text)? {
        Some(pairs) => pairs,
        None => split_str_list(text, false)?.into_iter().map(CreditPart::Text).collect(),
    };
    entries.into_iter().map(artist_name).collect()
}

fn unzipped_list_pairs(text: &str) -> Result<Option<Vec<CreditPart>>, ArtistListError> {
    if !looks_unzipped(text) {
        return Ok(None);
    }
    let Some((names, groups)) = split_pair(text) else {
        return Ok(None);
    };

    if names.matches(',').count() == groups.matches(',').count() {
        let pairs = split_str_list(&names, false)?
            .into_iter()
            .zip(split_str_list(&groups, false)?)
            .map(|(a, b)| CreditPart::Parts(vec![a, b]))
            .collect();
        Ok(Some(pairs))
    } else if contains_delimiter(&groups) {
        unzip_unbalanced(&names, &groups)
    } else {
        Ok(None)
    }
}

/// Pair up two lists whose lengths differ because one side nests a member list.
fn unzip_unbalanced(names: &str, groups: &str) -> Result<Option<Vec<CreditPart>>, ArtistListError> {
    let mut parts_a = split_str_list(names, true)?;
    let mut parts_b = split_str_list(groups, true)?;
    let mut pairs = Vec::new();

    loop {
        let (a, b) = match (parts_a.pop(), parts_b.pop()) {
            (Some(a), Some(b)) => (a, b),
            (a, b) => {
                // Entries left over on the longer side stay as plain credits.
                let leftover_a = a.into_iter().chain(parts_a.into_iter().rev());
                let leftover_b = b.into_iter().chain(parts_b.into_iter().rev());
                pairs.extend(leftover_a.chain(leftover_b).map(CreditPart::Text));
                return Ok(Some(pairs));
            }
        };
        if a == b {
            pairs.push(CreditPart::Parts(vec![a]));
        } else if ends_with_enclosed(&a, None).is_some() && ends_with_enclosed(&b, None).is_some() {
            let balanced = if contains_delimiter(&a) {
                balance_unzipped_parts(&mut parts_b, &a, b)
            } else if contains_delimiter(&b) {
                balance_unzipped_parts(&mut parts_a, &b, a)
            } else {
                Ok(vec![CreditPart::Parts(vec![a, b])])
            };
            match balanced {
                Ok(balanced) => pairs.extend(balanced),
                Err(ArtistListError::UnexpectedListLength { text }) => {
                    log::debug!("Unexpected end of unbalanced unzipped list for {text:?}");
                    return Ok(None);
                }
                Err(err) => return Err(err),
            }
        } else {
            pairs.push(CreditPart::Parts(vec![a, b]));
        }
    }
}

/// Expand "Group (m1, m2)" against successive "member (other group)" entries.
fn balance_unzipped_parts(parts: &mut Vec<String>, a: &str, b: String) -> Result<Vec<CreditPart>, ArtistListError> {
    let too_short = || ArtistListError::UnexpectedListLength { text: a.to_string() };
    let [group_a, a_members]: [String; 2] = rsplit_enclosed_once(a).try_into().map_err(|_| too_short())?;

    let mut members = split_str_list(&a_members, true)?;
    let mut b = Some(b);
    let mut pairs = Vec::new();
    while let Some(member_x) = members.pop().filter(|m| !m.is_empty()) {
        let current = b.take().ok_or_else(too_short)?;
        let [member_y, group_b]: [String; 2] = rsplit_enclosed_once(&current).try_into().map_err(|_| too_short())?;
        pairs.push(CreditPart::Parts(vec![
            format!("{member_x} ({member_y})"),
            format!("of {group_a} ({group_b})"),
        ]));
        if !members.is_empty() {
            b = parts.pop();
        }
    }
    Ok(pairs)
}

// ============================================================================
// NAME CONSTRUCTION
// ============================================================================

fn group_extra(name: Name) -> Extra {
    Extra::Name(Box::new(name))
}

fn split_pair(text: &str) -> Option<(String, String)> {
    let [a, b]: [String; 2] = rsplit_enclosed_once(text).try_into().ok()?;
    Some((a, b))
}

fn artist_name(part: CreditPart) -> Result<Name, ArtistListError> {
    let parts = match &part {
        CreditPart::Text(text) => rsplit_enclosed_once(text),
        CreditPart::Parts(parts) => parts.clone(),
    };
    let [primary, enclosed] = parts.as_slice() else {
        return Ok(default_artist_name(&part, &parts));
    };

    if contains_delimiter(enclosed) {
        let members = split_artists(enclosed)?;
        return Ok(Name::from_enclosed(primary).with_extra("members", Extra::Names(members)));
    }
    if let Some(group) = enclosed.strip_prefix("from ").or_else(|| enclosed.strip_prefix("of ")) {
        let group = Name::from_enclosed(group.trim());
        return Ok(Name::from_enclosed(primary).with_extra("group", group_extra(group)));
    }

    let primary_enclosed = ends_with_enclosed(primary, None).is_some();
    if primary_enclosed && ends_with_enclosed(enclosed, None).is_some() {
        let both_mixed = [primary, enclosed].iter().all(|p| LangCat::categorize(p) == LangCat::Mix);
        let split = split_pair(primary).zip(split_pair(enclosed)).map(|((p0, p1), (e0, e1))| {
            if both_mixed {
                // "artist (ARTIST) (group (GROUP))"
                ((p0, p1), (e0, e1))
            } else {
                // "artist (group) (ARTIST (GROUP))"
                ((p0, e0), (p1, e1))
            }
        });
        if let Some(((artist_a, artist_b), (group_a, group_b))) = split {
            let group = Name::from_parts(&[group_a, group_b]);
            return Ok(Name::from_parts(&[artist_a, artist_b]).with_extra("group", group_extra(group)));
        }
    } else if primary_enclosed && LangCat::categorize(primary) == LangCat::Mix {
        let group = Name::from_enclosed(enclosed);
        return Ok(Name::from_parts(&rsplit_enclosed_once(primary)).with_extra("group", group_extra(group)));
    }

    Ok(default_artist_name(&part, &parts))
}

/// Plain name, with an "X of Group" / "X (Group)" English form split into a group.
fn default_artist_name(part: &CreditPart, parts: &[String]) -> Name {
    let name = match part {
        CreditPart::Text(text) => Name::from_enclosed(text),
        CreditPart::Parts(_) => Name::from_parts(parts),
    };
    if !name.extra().is_empty() {
        return name;
    }
    let Some(english) = name.english().map(str::to_string) else {
        return name;
    };

    if let Some((artist, group)) = english.split_once(" of ") {
        let group = Name::from_enclosed(group);
        name.with_english(artist).with_extra("group", group_extra(group))
    } else if english.contains(" (") {
        match split_pair(&english) {
            Some((artist, group)) => {
                let group = Name::from_enclosed(&group);
                name.with_english(&artist).with_extra("group", group_extra(group))
            }
            None => name,
        }
    } else {
        name
    }
}
