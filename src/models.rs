//! Shared data models: discography entry types, `Name` annotations and
//! candidate ranking records.

use std::fmt;

use serde::Serialize;

use crate::name::Name;
use crate::numbers::ordinal_suffix;

// ============================================================================
// Discography Entry Types
// ============================================================================

/// Release category of an album/single, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DiscoEntryType {
    Unknown,
    MiniAlbum,
    ExtendedPlay,
    SingleAlbum,
    SpecialAlbum,
    Compilation,
    Feature,
    Live,
    Competition,
    MixTape,
    CoverAlbum,
    Soundtrack,
    Single,
    Album,
    Collaboration,
    Christmas,
    Holiday,
    Other,
}

impl DiscoEntryType {
    pub const ALL: [DiscoEntryType; 18] = [
        DiscoEntryType::Unknown,
        DiscoEntryType::MiniAlbum,
        DiscoEntryType::ExtendedPlay,
        DiscoEntryType::SingleAlbum,
        DiscoEntryType::SpecialAlbum,
        DiscoEntryType::Compilation,
        DiscoEntryType::Feature,
        DiscoEntryType::Live,
        DiscoEntryType::Competition,
        DiscoEntryType::MixTape,
        DiscoEntryType::CoverAlbum,
        DiscoEntryType::Soundtrack,
        DiscoEntryType::Single,
        DiscoEntryType::Album,
        DiscoEntryType::Collaboration,
        DiscoEntryType::Christmas,
        DiscoEntryType::Holiday,
        DiscoEntryType::Other,
    ];

    /// (display name, category keywords, directory, numbered)
    fn info(self) -> (&'static str, &'static [&'static str], &'static str, bool) {
        use DiscoEntryType::*;
        match self {
            Unknown => ("UNKNOWN", &[], "Other", false),
            MiniAlbum => ("Mini Album", &["mini album"], "Mini Albums", true),
            ExtendedPlay => ("EP", &["extended play", "digital eps"], "EPs", false),
            SingleAlbum => ("Single Album", &["single album"], "Single Albums", true),
            SpecialAlbum => ("Special Album", &["special album"], "Special Albums", true),
            Compilation => ("Compilation", &["compilation", "best album"], "Compilations", false),
            Feature => ("Feature", &["feature"], "Collaborations", false),
            Live => ("Live Album", &["live album"], "Live", false),
            Competition => ("Competition", &["participation release"], "Other", false),
            MixTape => ("MixTape", &["mixtape"], "Other", false),
            CoverAlbum => ("Cover Album", &["cover album", "remake album"], "Other", false),
            Soundtrack => ("Soundtrack", &["soundtrack", "ost"], "Soundtracks", false),
            Single => (
                "Single",
                &[
                    "single",
                    "song",
                    "digital single",
                    "promotional single",
                    "special single",
                    "other release",
                    "digital download",
                ],
                "Singles",
                false,
            ),
            Album => ("Album", &["studio album", "repackage album", "full-length album", "album"], "Albums", true),
            Collaboration => ("Collaboration", &["collaboration"], "Collaborations", false),
            Christmas => ("Christmas", &["christmas"], "Christmas", false),
            Holiday => ("Holiday", &["holiday"], "Holiday", false),
            Other => ("_OTHER", &["others"], "Other", false),
        }
    }

    pub fn real_name(self) -> &'static str {
        self.info().0
    }

    pub fn categories(self) -> &'static [&'static str] {
        self.info().1
    }

    pub fn directory(self) -> &'static str {
        self.info().2
    }

    pub fn numbered(self) -> bool {
        self.info().3
    }

    pub fn is_known(self) -> bool {
        self != DiscoEntryType::Unknown
    }

    fn variant_name(self) -> &'static str {
        use DiscoEntryType::*;
        match self {
            Unknown => "UNKNOWN",
            MiniAlbum => "MiniAlbum",
            ExtendedPlay => "ExtendedPlay",
            SingleAlbum => "SingleAlbum",
            SpecialAlbum => "SpecialAlbum",
            Compilation => "Compilation",
            Feature => "Feature",
            Live => "Live",
            Competition => "Competition",
            MixTape => "MixTape",
            CoverAlbum => "CoverAlbum",
            Soundtrack => "Soundtrack",
            Single => "Single",
            Album => "Album",
            Collaboration => "Collaboration",
            Christmas => "Christmas",
            Holiday => "Holiday",
            Other => "_OTHER",
        }
    }

    fn for_category(category: &str) -> Option<DiscoEntryType> {
        let category = category.trim().to_lowercase().replace(['-', '_'], " ");
        let found = DiscoEntryType::ALL
            .into_iter()
            .find(|entry_type| entry_type.categories().iter().any(|cat| category.contains(cat)));
        if found.is_some() {
            return found;
        }
        matches!(category.as_str(), "ep" | "eps").then_some(DiscoEntryType::ExtendedPlay)
    }

    fn resolve(candidate: Option<DiscoEntryType>) -> DiscoEntryType {
        match candidate {
            Some(DiscoEntryType::Other) | None => DiscoEntryType::Unknown,
            Some(entry_type) => entry_type,
        }
    }

    /// Entry type for a variant name ("MiniAlbum") or a category phrase ("5th Mini Album").
    pub fn for_name(name: &str) -> DiscoEntryType {
        if name.is_empty() {
            return DiscoEntryType::Unknown;
        }
        if let Some(exact) = DiscoEntryType::ALL.into_iter().find(|t| t.variant_name() == name) {
            return DiscoEntryType::resolve(Some(exact));
        }
        let found = DiscoEntryType::for_category(name);
        if found.is_none() && name != "UNKNOWN" {
            log::debug!("No DiscoEntryType exists for name={name:?}");
        }
        DiscoEntryType::resolve(found)
    }

    /// Earliest-declared entry type matching any of the given category phrases.
    pub fn for_names<I, S>(names: I) -> DiscoEntryType
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let found = names
            .into_iter()
            .filter_map(|name| DiscoEntryType::for_category(name.as_ref()))
            .min();
        DiscoEntryType::resolve(found)
    }

    /// Entry type for text that is nothing but a type phrase ("Special Album", "OST").
    pub fn for_phrase(text: &str) -> Option<DiscoEntryType> {
        let phrase = text.trim().to_lowercase();
        DiscoEntryType::ALL
            .into_iter()
            .filter(|t| t.is_known() && *t != DiscoEntryType::Other)
            .find(|t| t.real_name().to_lowercase() == phrase || t.categories().contains(&phrase.as_str()))
    }

    pub fn for_directory(dir_name: &str) -> Option<DiscoEntryType> {
        DiscoEntryType::ALL.into_iter().find(|t| t.directory() == dir_name)
    }

    /// EPs are interchangeable with mini and single albums.
    pub fn compatible_with(self, other: DiscoEntryType) -> bool {
        if self == other {
            return true;
        }
        let pair = [self, other];
        pair.contains(&DiscoEntryType::ExtendedPlay)
            && (pair.contains(&DiscoEntryType::MiniAlbum) || pair.contains(&DiscoEntryType::SingleAlbum))
    }

    /// "3rd Mini Album"
    pub fn format(self, num: u32) -> String {
        format!("{num}{} {}", ordinal_suffix(num), self.real_name())
    }
}

impl fmt::Display for DiscoEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.real_name())
    }
}

// ============================================================================
// Name Annotations
// ============================================================================

/// Value stored in `Name::extra` ("group", "members", "feat", "unknown").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Extra {
    Name(Box<Name>),
    Names(Vec<Name>),
    Texts(Vec<String>),
}

impl Extra {
    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Extra::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_names(&self) -> Option<&[Name]> {
        match self {
            Extra::Names(names) => Some(names),
            _ => None,
        }
    }

    pub fn as_texts(&self) -> Option<&[String]> {
        match self {
            Extra::Texts(texts) => Some(texts),
            _ => None,
        }
    }
}

impl fmt::Display for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extra::Name(name) => write!(f, "{name}"),
            Extra::Names(names) => {
                let parts: Vec<String> = names.iter().map(|n| n.to_string()).collect();
                f.write_str(&parts.join(", "))
            }
            Extra::Texts(texts) => f.write_str(&texts.join(", ")),
        }
    }
}

// ============================================================================
// Candidate Ranking
// ============================================================================

/// A candidate title scored against a query name.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub line: usize,
    pub candidate: String,
    pub name: Name,
    pub score: i32,
}

/// Counters for one ranking run.
#[derive(Default, Debug, Clone, Serialize)]
pub struct RankStats {
    pub total_candidates: usize,
    pub skipped_blank: usize,
    pub total_matches: usize,

    // Score distribution of matches
    pub score_100: usize,
    pub score_90_to_99: usize,
    pub score_below_90: usize,

    pub elapsed_seconds: f64,
}

impl RankStats {
    /// Calculate match rate as a percentage
    pub fn match_rate(&self) -> f64 {
        if self.total_candidates == 0 {
            0.0
        } else {
            100.0 * self.total_matches as f64 / self.total_candidates as f64
        }
    }

    pub fn record_match(&mut self, score: i32) {
        self.total_matches += 1;
        match score {
            100.. => self.score_100 += 1,
            90..=99 => self.score_90_to_99 += 1,
            _ => self.score_below_90 += 1,
        }
    }

    /// Log stats to stderr in JSON format
    pub fn log_phase(&self, phase: &str) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            eprintln!("[STATS:{}]\n{}", phase, json);
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
