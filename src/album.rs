//! Album title parsing.
//!
//! A raw title such as `"Hotel Del Luna (호텔 델루나) OST Part.2"` or
//! `"The ReVe Festival 2019 - Finale (Special Album)"` is reduced to a
//! structured [`AlbumName`]. A pre-pass strips whole-string suffixes (dash
//! types, OST parts). The remaining text is split into enclosed parts, which
//! are fed last to first through the ordered [`RULES`] table; the first rule
//! that claims a part wins, and unclaimed parts become title text.

use std::collections::VecDeque;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::artists::split_artists;
use crate::enclosure::{split_enclosed, strip_unpaired, DASH_CHARS};
use crate::error::ArtistListError;
use crate::lang::LangCat;
use crate::models::DiscoEntryType;
use crate::name::{sort_name_parts, Name};
use crate::normalize::{clean, fix_apostrophes, APOSTROPHES};
use crate::numbers::{find_ordinal, number_words, parse_int_words};

const CHANNELS: [&str; 4] = ["sbs", "kbs", "tvn", "mbc"];
const VERSION_SUFFIXES: [&str; 4] = [" version", " ver.", " ver", " 버전"];
const OST_SUFFIXES: [&str; 2] = ["original soundtrack", " ost"];
const FILM: &str = "영화";
const DRAMA: &str = "드라마";
const SPECIAL: &str = "특별";

// ============================================================================
// PATTERNS
// ============================================================================

static DASH_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.*)\s[-X]\s*((?:EP|Single|SM[\s-]?STATION))$").unwrap());

static CHANNEL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^((?:{})\d*)\s+([\p{{Hangul}}\s]+)$", CHANNELS.join("|"))).unwrap()
});

static NTH_ALBUM_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(.*?)(?:the)?\s*((?:(?:japan|china?)(?:ese)?|korean?)?\s*[0-9]+(?:st|nd|rd|th))\s+(.*?album\s*(?:repackage)?)(.*)$",
    )
    .unwrap()
});

static OST_PART: Lazy<Regex> = Lazy::new(|| {
    let words = number_words().collect::<Vec<_>>().join("|");
    Regex::new(&format!(
        r"(?i)^(.*?)\s((?:O\.?S\.?T\.?)?)\s*[:-]?\s*((?:Part|Code No)?)\.?\s*(\d+|{words})$"
    ))
    .unwrap()
});

static OST_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i) ost ").unwrap());

static REPACKAGE_ALBUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^re:?package\salbum\s(.*)$").unwrap());

static SPECIAL_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\S+\s+special)\s+(.*)$").unwrap());

/// `text` without `suffix`, compared ASCII case-insensitively.
fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = text.len().checked_sub(suffix.len())?;
    let tail = text.get(cut..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &text[..cut])
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// (title, whether it is an OST/part suffix, number) for a trailing "OST Part 2"-style suffix.
fn ost_part(text: &str) -> Option<(String, bool, Option<i64>)> {
    let caps = OST_PART.captures(text)?;
    let group = |i: usize| caps.get(i).map_or("", |m| clean(m.as_str()));
    let is_ost = !group(2).is_empty() || !group(3).is_empty();
    let number = parse_int_words(group(4)).ok();
    Some((group(1).to_string(), is_ost, number))
}

// ============================================================================
// ALBUM NAME
// ============================================================================

/// Structured form of one raw album title.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlbumName {
    pub name: Name,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_name: Option<Name>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alb_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alb_num: Option<String>,
    pub sm_station: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub ost: bool,
    pub repackage: bool,
    pub remastered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_info: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub feat: Vec<Name>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collabs: Vec<Name>,
}

impl AlbumName {
    pub fn new(name: Name) -> Self {
        Self { name, ..Default::default() }
    }

    /// Album from loosely ordered title parts, sorted English-first.
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Self {
        Self::new(Name::from_sorted_parts(sort_name_parts(parts)))
    }

    pub fn entry_type(&self) -> DiscoEntryType {
        if self.ost {
            return DiscoEntryType::Soundtrack;
        }
        match &self.alb_type {
            Some(alb_type) => DiscoEntryType::for_name(alb_type),
            None => DiscoEntryType::Unknown,
        }
    }

    /// Release number from `alb_num` ("3rd Mini Album" -> 3).
    pub fn number(&self) -> Option<u32> {
        self.alb_num.as_deref().and_then(find_ordinal)
    }

    /// Parse a raw album title, optionally knowing the album artist.
    ///
    /// The only failure is an unparseable featured/collaborating artist list.
    pub fn parse(title: &str, artist: Option<&Name>) -> Result<AlbumName, ArtistListError> {
        let mut album = AlbumName::default();
        let title = album.pre_pass(title);

        let parts: VecDeque<String> = split_enclosed(&title, true, false, 0, 0)
            .iter()
            .rev()
            .map(|p| clean(p).to_string())
            .filter(|p| !p.is_empty())
            .collect();

        let mut cascade = Cascade::new(album, parts, artist, &title);
        cascade.run()?;
        let Cascade { mut album, name_parts, real_album, versions, feat, collabs, .. } = cascade;
        album.feat = feat;
        album.collabs = collabs;

        let name_parts: Vec<String> = name_parts.into_iter().rev().collect();
        let name_parts = match real_album {
            Some(real_album) => {
                if !name_parts.is_empty() {
                    album.song_name = Some(Name::from_sorted_parts(sort_name_parts(&split_name(name_parts))));
                }
                vec![real_album]
            }
            None => split_name(name_parts),
        };

        album.name = Name::from_sorted_parts(sort_name_parts(&name_parts));
        for version in versions {
            album.name.add_version(version);
        }
        if album.entry_type() == DiscoEntryType::Soundtrack {
            album.ost = true;
        }
        Ok(album)
    }

    /// Whole-string markers: repackage, dash suffix types, OST part suffixes.
    fn pre_pass(&mut self, title: &str) -> String {
        let mut title = title.to_string();
        if title.to_lowercase().contains("repackage") {
            self.repackage = true;
        }

        if let Some(caps) = DASH_SUFFIX.captures(&title) {
            let alb_type = clean(&caps[2]).to_string();
            let rest = clean(&caps[1]).to_string();
            if alb_type.to_lowercase().contains("station") {
                self.sm_station = true;
            } else {
                self.alb_type = Some(alb_type);
            }
            title = rest;
        }

        if let Some(rest) = title.strip_suffix(" OST") {
            title = clean(rest).to_string();
            self.ost = true;
        } else if let Some((rest, true, number)) = ost_part(&title) {
            self.ost = true;
            self.part = number;
            title = rest;
        }
        title
    }
}

impl fmt::Display for AlbumName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.entry_type())
    }
}

/// Both parts are written in the same single script.
fn same_script(a: &str, b: &str) -> bool {
    let cat = LangCat::categorize(a);
    !matches!(cat, LangCat::Mix | LangCat::Nul) && cat == LangCat::categorize(b)
}

/// Merge leftover title parts: re-split a lone mixed-script part, join two same-script parts.
fn split_name(parts: Vec<String>) -> Vec<String> {
    match parts.as_slice() {
        [name] if LangCat::categorize(name) == LangCat::Mix => {
            let split = split_enclosed(name, false, false, 0, 0);
            if split.len() == 1 && name.contains(" - ") {
                name.split(" - ").map(|p| clean(p).to_string()).collect()
            } else {
                split
            }
        }
        [a, b] if same_script(a, b) => vec![format!("{a} ({b})")],
        _ => parts,
    }
}

// ============================================================================
// RULE CASCADE
// ============================================================================

/// Parse state shared by the rules while the title parts are consumed.
struct Cascade<'a> {
    album: AlbumName,
    parts: VecDeque<String>,
    orig_parts: Vec<String>,
    /// Number of parts taken from `parts` so far, minus one.
    index: usize,
    artist: Option<&'a Name>,
    title: &'a str,
    name_parts: Vec<String>,
    real_album: Option<String>,
    versions: Vec<Name>,
    feat: Vec<Name>,
    collabs: Vec<Name>,
}

type RuleFn = fn(&mut Cascade<'_>, &str, &str) -> Result<bool, ArtistListError>;

/// A named handler; returns true when it consumed the part.
pub struct Rule {
    pub name: &'static str,
    apply: RuleFn,
}

/// Rules in evaluation order: keywords, OST/version, ordinal/type, credits.
pub const RULES: &[Rule] = &[
    Rule { name: "film_marker", apply: film_marker },
    Rule { name: "repackage", apply: repackage_keyword },
    Rule { name: "remastered", apply: remastered_keyword },
    Rule { name: "edition", apply: edition_keyword },
    Rule { name: "remix", apply: remix_keyword },
    Rule { name: "single", apply: single_suffix },
    Rule { name: "version", apply: version_suffix },
    Rule { name: "channel_prefix", apply: channel_prefix },
    Rule { name: "channel_special", apply: channel_special },
    Rule { name: "ost_suffix", apply: ost_suffix },
    Rule { name: "ost_part", apply: ost_part_suffix },
    Rule { name: "drama_prefix", apply: drama_prefix },
    Rule { name: "nth_album", apply: nth_album_type },
    Rule { name: "repackage_album", apply: repackage_album },
    Rule { name: "special_prefix", apply: special_prefix },
    Rule { name: "album_type", apply: album_type_phrase },
    Rule { name: "mixed_version", apply: mixed_script_version },
    Rule { name: "featuring", apply: featuring },
    Rule { name: "artist_restatement", apply: artist_restatement },
    Rule { name: "artist_collab", apply: artist_collab },
];

impl<'a> Cascade<'a> {
    fn new(album: AlbumName, parts: VecDeque<String>, artist: Option<&'a Name>, title: &'a str) -> Self {
        let orig_parts = parts.iter().cloned().collect();
        Self {
            album,
            parts,
            orig_parts,
            index: 0,
            artist,
            title,
            name_parts: Vec::new(),
            real_album: None,
            versions: Vec::new(),
            feat: Vec::new(),
            collabs: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<(), ArtistListError> {
        let mut taken = 0;
        while let Some(part) = self.parts.pop_front() {
            self.index = taken;
            taken += 1;
            let part = fix_apostrophes(&part);
            let lc_part = part.to_lowercase();
            if !self.apply_rules(&part, &lc_part)? {
                self.name_parts.push(part);
            }
        }

        if self.name_parts.len() == 2 && langs_match(&self.name_parts) && distinct_apostrophes(self.title) == 2 {
            self.name_parts = vec![format!("'{}' {}", self.name_parts[1], self.name_parts[0])];
        }
        Ok(())
    }

    fn apply_rules(&mut self, part: &str, lc_part: &str) -> Result<bool, ArtistListError> {
        for rule in RULES {
            if (rule.apply)(self, part, lc_part)? {
                log::debug!("Album title part {part:?} handled by rule={}", rule.name);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The other part when there are exactly two parts.
    fn other_part(&self) -> Option<&str> {
        if self.orig_parts.len() != 2 {
            return None;
        }
        let other = if self.index == 0 { 1 } else { 0 };
        Some(self.orig_parts[other].as_str())
    }

    /// An OST title becomes the real album when the only other part is not an OST.
    fn claim_real_album(&mut self, title: String) {
        if self.other_part().is_some_and(|other| !other.contains("OST")) {
            self.real_album = non_empty(&title);
        } else if !title.is_empty() {
            self.name_parts.push(title);
        }
    }
}

fn langs_match(parts: &[String]) -> bool {
    let mut cats = parts.iter().map(|p| LangCat::categorize(p));
    match cats.next() {
        Some(first) => cats.all(|cat| cat == first),
        None => true,
    }
}

fn distinct_apostrophes(text: &str) -> usize {
    APOSTROPHES.chars().filter(|&c| text.contains(c)).count()
}

// ----------------------------------------------------------------------------
// Keywords
// ----------------------------------------------------------------------------

fn film_marker(c: &mut Cascade<'_>, part: &str, _lc: &str) -> Result<bool, ArtistListError> {
    Ok(c.album.ost && part == FILM)
}

fn repackage_keyword(c: &mut Cascade<'_>, _part: &str, lc: &str) -> Result<bool, ArtistListError> {
    if lc == "repackage" {
        c.album.repackage = true;
        return Ok(true);
    }
    Ok(false)
}

fn remastered_keyword(c: &mut Cascade<'_>, _part: &str, lc: &str) -> Result<bool, ArtistListError> {
    if lc == "remastered" {
        c.album.remastered = true;
        return Ok(true);
    }
    Ok(false)
}

fn edition_keyword(c: &mut Cascade<'_>, part: &str, lc: &str) -> Result<bool, ArtistListError> {
    if lc.contains("edition") {
        c.album.edition = non_empty(part);
        return Ok(true);
    }
    Ok(false)
}

fn remix_keyword(c: &mut Cascade<'_>, part: &str, lc: &str) -> Result<bool, ArtistListError> {
    if lc.contains("remix") {
        c.album.remix = non_empty(part);
        return Ok(true);
    }
    Ok(false)
}

fn single_suffix(c: &mut Cascade<'_>, part: &str, lc: &str) -> Result<bool, ArtistListError> {
    if lc.ends_with("single") {
        c.album.alb_type = non_empty(part);
        return Ok(true);
    }
    Ok(false)
}

// ----------------------------------------------------------------------------
// OST / version / broadcast
// ----------------------------------------------------------------------------

/// "X Version", or "Real Album OST X Version".
fn version_suffix(c: &mut Cascade<'_>, part: &str, lc: &str) -> Result<bool, ArtistListError> {
    if !VERSION_SUFFIXES.iter().any(|suffix| lc.ends_with(suffix)) {
        return Ok(false);
    }
    match OST_WORD.find(part) {
        Some(m) if m.start() > 0 => {
            c.album.ost = true;
            c.album.version = non_empty(clean(&part[m.end()..]));
            if let Some(real_album) = non_empty(clean(&part[..m.start()])) {
                c.real_album = Some(real_album);
            }
        }
        _ => c.album.version = non_empty(part),
    }
    Ok(true)
}

fn is_drama_or_special(lc: &str) -> bool {
    lc.ends_with(DRAMA) || lc.contains(SPECIAL)
}

/// "SBS 낭만닥터" -> network "SBS", title "낭만닥터".
fn channel_prefix(c: &mut Cascade<'_>, part: &str, lc: &str) -> Result<bool, ArtistListError> {
    let Some(caps) = CHANNEL_PREFIX.captures(part) else {
        return Ok(false);
    };
    if is_drama_or_special(lc) {
        c.album.network_info = non_empty(part);
    } else {
        c.album.network_info = non_empty(&caps[1]);
        c.name_parts.push(caps[2].to_string());
    }
    Ok(true)
}

fn channel_special(c: &mut Cascade<'_>, part: &str, lc: &str) -> Result<bool, ArtistListError> {
    if CHANNELS.iter().any(|ch| lc.starts_with(ch)) && is_drama_or_special(lc) {
        c.album.network_info = non_empty(part);
        return Ok(true);
    }
    Ok(false)
}

fn ost_suffix(c: &mut Cascade<'_>, part: &str, _lc: &str) -> Result<bool, ArtistListError> {
    let Some(title) = OST_SUFFIXES.iter().find_map(|suffix| strip_suffix_ignore_case(part, suffix)) else {
        return Ok(false);
    };
    c.album.ost = true;
    c.claim_real_album(clean(title).to_string());
    Ok(true)
}

fn ost_part_suffix(c: &mut Cascade<'_>, part: &str, _lc: &str) -> Result<bool, ArtistListError> {
    let Some((title, is_ost, number)) = ost_part(part) else {
        return Ok(false);
    };
    if is_ost {
        c.album.ost = true;
        c.album.part = number;
        c.claim_real_album(title);
    } else {
        c.name_parts.push(part.to_string());
    }
    Ok(true)
}

fn drama_prefix(c: &mut Cascade<'_>, part: &str, _lc: &str) -> Result<bool, ArtistListError> {
    if !c.album.ost {
        return Ok(false);
    }
    match part.strip_prefix(DRAMA).filter(|rest| rest.starts_with(' ')) {
        Some(rest) => {
            c.name_parts.push(rest.trim().to_string());
            Ok(true)
        }
        None => Ok(false),
    }
}

// ----------------------------------------------------------------------------
// Album type / number
// ----------------------------------------------------------------------------

/// "Red Velvet 5th Mini Album" -> alb_num "5th Mini Album"; "Red Velvet" is re-queued.
fn nth_album_type(c: &mut Cascade<'_>, part: &str, _lc: &str) -> Result<bool, ArtistListError> {
    let Some(caps) = NTH_ALBUM_TYPE.captures(part) else {
        return Ok(false);
    };
    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str().trim());
    let (before, num, alb_type, after) = (group(1), group(2), group(3), group(4));
    c.album.alb_num = Some(format!("{num} {alb_type}"));
    c.album.alb_type = non_empty(alb_type);
    for leftover in [after, before] {
        let leftover = leftover.strip_suffix('-').map_or(leftover, str::trim);
        if !leftover.is_empty() {
            c.parts.push_front(leftover.to_string());
        }
    }
    Ok(true)
}

fn repackage_album(c: &mut Cascade<'_>, part: &str, _lc: &str) -> Result<bool, ArtistListError> {
    let Some(caps) = REPACKAGE_ALBUM.captures(part) else {
        return Ok(false);
    };
    c.album.repackage = true;
    c.album.alb_type = Some("Album".to_string());
    let rest = caps[1].trim();
    if !rest.is_empty() {
        c.parts.push_front(rest.to_string());
    }
    Ok(true)
}

/// "Winter Special Gift" -> alb_type "Winter Special", title "Gift".
fn special_prefix(c: &mut Cascade<'_>, part: &str, _lc: &str) -> Result<bool, ArtistListError> {
    let Some(caps) = SPECIAL_PREFIX.captures(part) else {
        return Ok(false);
    };
    c.album.alb_type = non_empty(clean(&caps[1]));
    let rest = clean(&caps[2]);
    if !rest.is_empty() {
        c.name_parts.push(rest.to_string());
    }
    Ok(true)
}

/// A part that only names a release type: "(Special Album)".
fn album_type_phrase(c: &mut Cascade<'_>, part: &str, _lc: &str) -> Result<bool, ArtistListError> {
    if DiscoEntryType::for_phrase(part).is_none() {
        return Ok(false);
    }
    c.album.alb_type = non_empty(part);
    Ok(true)
}

/// "Ｄｏｕｂｌｅ.소녀시대" style single parts: keep the text before "." as the title.
fn mixed_script_version(c: &mut Cascade<'_>, part: &str, _lc: &str) -> Result<bool, ArtistListError> {
    if c.orig_parts.len() != 1 || LangCat::categorize(part) != LangCat::Mix || !part.contains('.') {
        return Ok(false);
    }
    c.versions.push(Name::from_enclosed(part));
    let title = part.split('.').next().unwrap_or_default();
    c.name_parts.push(title.to_string());
    Ok(true)
}

// ----------------------------------------------------------------------------
// Credits
// ----------------------------------------------------------------------------

fn featuring(c: &mut Cascade<'_>, part: &str, lc: &str) -> Result<bool, ArtistListError> {
    if !(lc.starts_with("feat") || lc.starts_with("with ")) {
        return Ok(false);
    }
    match part.split_once(char::is_whitespace) {
        Some((_, artists)) if !artists.trim().is_empty() => c.feat.extend(split_artists(artists.trim())?),
        _ => c.name_parts.push(part.to_string()),
    }
    Ok(true)
}

/// A part that just repeats the artist is dropped, except "Artist ~Title~".
fn artist_restatement(c: &mut Cascade<'_>, part: &str, _lc: &str) -> Result<bool, ArtistListError> {
    let Some(artist) = c.artist else {
        return Ok(false);
    };
    if c.name_parts.is_empty() || !artist.matches_str(part) {
        return Ok(false);
    }
    match c.name_parts.as_mut_slice() {
        [title] if c.title.ends_with(&format!("~{title}~")) => {
            *title = format!("{} ~{title}~", strip_unpaired(part, false, DASH_CHARS));
        }
        _ => log::debug!("Discarding album name part={part:?} that matches artist={artist}"),
    }
    Ok(true)
}

/// "Artist & Guest - Title" -> title "Title", collabs [Guest].
fn artist_collab(c: &mut Cascade<'_>, part: &str, _lc: &str) -> Result<bool, ArtistListError> {
    let Some(artist) = c.artist else {
        return Ok(false);
    };
    let Some(english) = artist.english() else {
        return Ok(false);
    };
    if c.orig_parts.len() != 1 || !part.contains(english) {
        return Ok(false);
    }
    let Some((first, second)) = part.split_once(" - ") else {
        return Ok(false);
    };
    let (first, second) = (first.trim(), second.trim());
    let (title, collab) = if first.contains(english) { (second, first) } else { (first, second) };
    c.name_parts.push(title.to_string());
    if !collab.to_lowercase().ends_with("repackage") {
        let guests = split_artists(collab)?;
        c.collabs.extend(guests.into_iter().filter(|guest| !artist.matches(guest)));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(title: &str) -> AlbumName {
        AlbumName::parse(title, None).unwrap()
    }

    fn run_rule(rule: RuleFn, part: &str) -> (bool, AlbumName, Vec<String>) {
        let mut cascade = Cascade::new(AlbumName::default(), VecDeque::new(), None, part);
        let handled = rule(&mut cascade, part, &part.to_lowercase()).unwrap();
        (handled, cascade.album, cascade.name_parts)
    }

    #[test]
    fn test_special_album() {
        let album = parse("The ReVe Festival 2019 - Finale (Special Album)");
        assert_eq!(album.alb_type.as_deref(), Some("Special Album"));
        assert_eq!(album.entry_type(), DiscoEntryType::SpecialAlbum);
        assert!(album.entry_type().real_name().contains("Special"));
        assert!(!album.repackage);
        assert!(!album.ost);
        assert_eq!(album.name.english(), Some("The ReVe Festival 2019 - Finale"));
    }

    #[test]
    fn test_ost_part() {
        let album = parse("Hotel Del Luna OST Part.2");
        assert!(album.ost);
        assert_eq!(album.part, Some(2));
        assert_eq!(album.name.english(), Some("Hotel Del Luna"));
        assert_eq!(album.entry_type(), DiscoEntryType::Soundtrack);

        let album = parse("Hotel Del Luna (호텔 델루나) OST Part Two");
        assert!(album.ost);
        assert_eq!(album.part, Some(2));
        assert_eq!(album.name.english(), Some("Hotel Del Luna"));
        assert_eq!(album.name.non_english(), Some("호텔 델루나"));
    }

    #[test]
    fn test_trailing_ost() {
        let album = parse("Goblin OST");
        assert!(album.ost);
        assert_eq!(album.part, None);
        assert_eq!(album.name.english(), Some("Goblin"));
    }

    #[test]
    fn test_dash_suffix() {
        let album = parse("Rookie - EP");
        assert_eq!(album.alb_type.as_deref(), Some("EP"));
        assert_eq!(album.entry_type(), DiscoEntryType::ExtendedPlay);
        assert_eq!(album.name.english(), Some("Rookie"));

        let album = parse("Wish List - SM STATION");
        assert!(album.sm_station);
        assert_eq!(album.alb_type, None);
        assert_eq!(album.name.english(), Some("Wish List"));
    }

    #[test]
    fn test_nth_album() {
        let album = parse("Red Velvet 5th Mini Album");
        assert_eq!(album.alb_num.as_deref(), Some("5th Mini Album"));
        assert_eq!(album.number(), Some(5));
        assert_eq!(album.entry_type(), DiscoEntryType::MiniAlbum);
        assert_eq!(album.name.english(), Some("Red Velvet"));
    }

    #[test]
    fn test_repackage() {
        let album = parse("Love Shot (The 1st Album Repackage)");
        assert!(album.repackage);
        assert_eq!(album.number(), Some(1));
        assert_eq!(album.name.english(), Some("Love Shot"));

        let album = parse("Repackage Album Into the New World");
        assert!(album.repackage);
        assert_eq!(album.alb_type.as_deref(), Some("Album"));
        assert_eq!(album.name.english(), Some("Into the New World"));
    }

    #[test]
    fn test_keywords() {
        let album = parse("Dreams Come True (Remastered) (Deluxe Edition)");
        assert!(album.remastered);
        assert_eq!(album.edition.as_deref(), Some("Deluxe Edition"));
        assert_eq!(album.name.english(), Some("Dreams Come True"));

        let album = parse("Power (Remix Ver.)");
        assert_eq!(album.remix.as_deref(), Some("Remix Ver."));
    }

    #[test]
    fn test_two_english_parts_are_joined() {
        let album = parse("Feel My Rhythm (Orchestra Version) (Stage)");
        assert_eq!(album.version.as_deref(), Some("Orchestra Version"));
        assert_eq!(album.name.english(), Some("Feel My Rhythm (Stage)"));
    }

    #[test]
    fn test_real_album_from_version() {
        let album = parse("Lonely (Goblin OST Piano Version)");
        assert!(album.ost);
        assert_eq!(album.version.as_deref(), Some("Piano Version"));
        assert_eq!(album.name.english(), Some("Goblin"));
        assert_eq!(album.song_name.as_ref().and_then(|n| n.english()), Some("Lonely"));
    }

    #[test]
    fn test_real_album_from_ost_suffix() {
        let album = parse("Stay With Me (Goblin OST)");
        assert!(album.ost);
        assert_eq!(album.name.english(), Some("Goblin"));
        assert_eq!(album.song_name.as_ref().and_then(|n| n.english()), Some("Stay With Me"));
    }

    #[test]
    fn test_featuring() {
        let album = parse("Dear Me (feat. Taeyeon & Wendy)");
        assert_eq!(album.feat.len(), 2);
        assert_eq!(album.feat[0].english(), Some("Taeyeon"));
        assert_eq!(album.feat[1].english(), Some("Wendy"));
        assert_eq!(album.name.english(), Some("Dear Me"));
    }

    #[test]
    fn test_featuring_error_propagates() {
        assert!(matches!(
            AlbumName::parse("Song [with A (B, C]", None),
            Err(ArtistListError::UnexpectedListFormat { .. })
        ));
    }

    #[test]
    fn test_artist_restatement_dropped() {
        let artist = Name::eng("Red Velvet");
        let album = AlbumName::parse("(Red Velvet) Finale", Some(&artist)).unwrap();
        assert_eq!(album.name.english(), Some("Finale"));
    }

    #[test]
    fn test_artist_collab_split() {
        let artist = Name::eng("Taeyeon");
        let album = AlbumName::parse("Taeyeon & Wendy - Duet", Some(&artist)).unwrap();
        assert_eq!(album.name.english(), Some("Duet"));
        assert_eq!(album.collabs.len(), 1);
        assert_eq!(album.collabs[0].english(), Some("Wendy"));
    }

    #[test]
    fn test_soundtrack_type_sets_ost() {
        let album = parse("Goblin (OST)");
        assert!(album.ost);
        assert_eq!(album.name.english(), Some("Goblin"));
    }

    #[test]
    fn test_from_parts() {
        let album = AlbumName::from_parts(&["다시 만난 세계", "Into the New World"]);
        assert_eq!(album.name.english(), Some("Into the New World"));
        assert_eq!(album.name.non_english(), Some("다시 만난 세계"));
        assert_eq!(album.to_string(), "Into the New World (다시 만난 세계) [UNKNOWN]");
    }

    #[test]
    fn test_rule_channel_prefix() {
        let (handled, album, name_parts) = run_rule(channel_prefix, "SBS 낭만닥터");
        assert!(handled);
        assert_eq!(album.network_info.as_deref(), Some("SBS"));
        assert_eq!(name_parts, vec!["낭만닥터"]);

        let (handled, album, name_parts) = run_rule(channel_prefix, "KBS2 드라마");
        assert!(handled);
        assert_eq!(album.network_info.as_deref(), Some("KBS2 드라마"));
        assert!(name_parts.is_empty());

        let (handled, _, _) = run_rule(channel_prefix, "SBS Inkigayo");
        assert!(!handled);
    }

    #[test]
    fn test_rule_special_prefix() {
        let (handled, album, name_parts) = run_rule(special_prefix, "Winter Special Gift");
        assert!(handled);
        assert_eq!(album.alb_type.as_deref(), Some("Winter Special"));
        assert_eq!(name_parts, vec!["Gift"]);
    }

    #[test]
    fn test_rule_nth_album_requeues() {
        let mut cascade = Cascade::new(AlbumName::default(), VecDeque::new(), None, "");
        let part = "Girls' Generation The 3rd Album - Oh!";
        assert!(nth_album_type(&mut cascade, part, &part.to_lowercase()).unwrap());
        assert_eq!(cascade.parts, vec!["Girls' Generation", "- Oh!"]);
        assert_eq!(cascade.album.alb_num.as_deref(), Some("3rd Album"));
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        let pos = |name: &str| names.iter().position(|n| *n == name).unwrap();
        assert!(pos("single") < pos("ost_suffix"));
        assert!(pos("ost_part") < pos("nth_album"));
        assert!(pos("special_prefix") < pos("featuring"));
        assert_eq!(names.last(), Some(&"artist_collab"));
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name(vec!["a".into(), "b".into()]), vec!["a (b)"]);
        assert_eq!(split_name(vec!["Wish 소원".into()]), vec!["Wish 소원"]);
        assert_eq!(split_name(vec!["Wish - 소원".into()]), vec!["Wish", "소원"]);
        assert_eq!(split_name(vec!["Wish".into(), "소원".into()]), vec!["Wish", "소원"]);
        assert_eq!(split_name(vec!["소원".into(), "소녀시대".into()]), vec!["소원 (소녀시대)"]);
        assert_eq!(
            split_name(vec!["Wish 소원".into(), "Heart 소녀시대".into()]),
            vec!["Wish 소원", "Heart 소녀시대"]
        );
    }

    #[test]
    fn test_same_script_parts_are_joined() {
        let album = parse("다시 만난 세계 (소녀시대)");
        assert_eq!(album.name.non_english(), Some("다시 만난 세계 (소녀시대)"));
        assert_eq!(album.name.english(), None);
        assert_eq!(album.name.romanized(), None);
    }
}
