//! The `Name` entity: a possibly bilingual proper name with fuzzy,
//! romanization-aware matching.
//!
//! A name has up to four text forms (English, non-English, romanized and
//! literal translation), alternate `versions` of itself, and free-form
//! `extra` annotations. Equality and hashing only consider the four text
//! forms; `matches` is the fuzzy relation used for cross-source matching.
//!
//! Normalized forms, language categories and romanization matchers are
//! computed lazily and cached per instance. Every method that changes a text
//! field resets the cache.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::sync::OnceCell;
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::enclosure::split_enclosed;
use crate::lang::{LangCat, ASIAN, NON_ENG};
use crate::models::Extra;
use crate::normalize::{combine_with_parens, fuzz, normalize, remove_whitespace, NON_WORD};
use crate::romanize::{hangul_pattern, japanese_romanizations};
use crate::scoring::{weighted_ratio, MatchOptions};
use crate::spellcheck::{english_probability, is_english};

const OST_SUFFIX: &str = " ost";

// ============================================================================
// Derived value cache
// ============================================================================

#[derive(Clone, Default)]
struct NameCache {
    eng_fuzzed_nospace: OnceCell<Option<String>>,
    eng_langs: OnceCell<BTreeSet<LangCat>>,
    non_eng_nospace: OnceCell<Option<String>>,
    non_eng_nospecial: OnceCell<Option<String>>,
    non_eng_langs: OnceCell<BTreeSet<LangCat>>,
    romanization_pattern: OnceCell<Option<Regex>>,
    romanizations: OnceCell<FxHashSet<String>>,
    no_suffix_version: OnceCell<Option<Box<Name>>>,
}

fn non_empty(text: impl Into<String>) -> Option<String> {
    let text = text.into();
    (!text.is_empty()).then_some(text)
}

/// Some(a == b) when both sides are present, None otherwise.
fn field_match(a: Option<&str>, b: Option<&str>) -> Option<bool> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a == b),
        _ => None,
    }
}

// ============================================================================
// Name
// ============================================================================

#[derive(Clone, Default, Serialize)]
pub struct Name {
    #[serde(skip_serializing_if = "Option::is_none")]
    english: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    non_english: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    romanized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    literal_translation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    versions: Vec<Name>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    extra: BTreeMap<String, Extra>,
    #[serde(skip)]
    cache: NameCache,
}

impl Name {
    // ------------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------------

    pub fn new(english: Option<&str>, non_english: Option<&str>) -> Self {
        Self {
            english: english.and_then(non_empty),
            non_english: non_english.and_then(non_empty),
            ..Default::default()
        }
    }

    pub fn eng(english: &str) -> Self {
        Self::new(Some(english), None)
    }

    pub fn non_eng(non_english: &str) -> Self {
        Self::new(None, Some(non_english))
    }

    /// Parse the string form of a name: "English (한국어)" or just "Title".
    pub fn parse(text: &str) -> Self {
        Self::from_parts(&split_enclosed(text, true, false, 0, 1))
    }

    /// Split a mixed-script string on its trailing enclosed part, then build from the parts.
    pub fn from_enclosed(text: &str) -> Self {
        if LangCat::categorize(text) == LangCat::Mix {
            Self::from_parts(&split_enclosed(text, true, false, 0, 1))
        } else {
            Self::from_parts(&[text])
        }
    }

    /// Build a name from loosely ordered parts.
    ///
    /// The first part containing non-English script becomes the non-English
    /// form and the first with English script becomes the English form. A
    /// later all-English part is kept as the romanization when it romanizes
    /// the non-English form (or swapped with the English form when that is the
    /// romanization instead). Everything else is kept under `extra["unknown"]`.
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Self {
        let mut eng: Option<&str> = None;
        let mut non_eng: Option<&str> = None;
        let mut unknown: Vec<String> = Vec::new();
        let mut name: Option<Name> = None;

        for part in parts.iter().map(|p| p.as_ref()).filter(|p| !p.is_empty()) {
            if name.is_some() {
                unknown.push(part.to_string());
            } else if non_eng.is_none() && LangCat::contains_any(part, NON_ENG) {
                non_eng = Some(part);
            } else if eng.is_none() && LangCat::contains_any(part, &[LangCat::Eng]) {
                eng = Some(part);
            } else if let (Some(e), Some(_)) = (eng, non_eng) {
                if LangCat::categorize(part) != LangCat::Eng {
                    unknown.push(part.to_string());
                    continue;
                }
                let mut candidate = Name::new(eng, non_eng);
                if candidate.has_romanization(part, true) {
                    candidate.romanized = Some(part.to_string());
                    candidate.invalidate_cache();
                    name = Some(candidate);
                } else if candidate.has_romanization(e, true) && !is_english(e) && is_english(part) {
                    candidate.english = Some(part.to_string());
                    candidate.romanized = Some(e.to_string());
                    candidate.invalidate_cache();
                    name = Some(candidate);
                } else {
                    unknown.push(part.to_string());
                }
            } else {
                unknown.push(part.to_string());
            }
        }

        let mut name = match name {
            Some(name) => name,
            None if eng.is_some() || non_eng.is_some() => Name::new(eng, non_eng),
            None if unknown.len() == 1 => return Name::eng(&unknown[0]),
            None => Name::default(),
        };
        if !unknown.is_empty() {
            name.extra.insert("unknown".to_string(), Extra::Texts(unknown));
        }
        name
    }

    /// Build from the output of [`sort_name_parts`]: English, non-English,
    /// romanized, literal translation. Surplus parts go to `extra["unknown"]`,
    /// as does a would-be romanization that is not in Latin script.
    pub fn from_sorted_parts(parts: Vec<Option<String>>) -> Self {
        let mut parts = parts.into_iter();
        let mut next = || parts.next().flatten().and_then(non_empty);
        let english = next();
        let non_english = next();
        let (romanized, stray) = match next() {
            Some(text) if LangCat::categorize(&text) != LangCat::Eng => (None, Some(text)),
            romanized => (romanized, None),
        };
        let mut name = Self {
            english,
            non_english,
            romanized,
            literal_translation: next(),
            ..Default::default()
        };
        let unknown: Vec<String> = stray.into_iter().chain(parts.flatten().filter(|p| !p.is_empty())).collect();
        if !unknown.is_empty() {
            name.extra.insert("unknown".to_string(), Extra::Texts(unknown));
        }
        name
    }

    // ------------------------------------------------------------------------
    // Builders / mutation
    // ------------------------------------------------------------------------

    fn invalidate_cache(&mut self) {
        self.cache = NameCache::default();
    }

    pub fn with_english(mut self, text: &str) -> Self {
        self.english = non_empty(text);
        self.invalidate_cache();
        self
    }

    pub fn with_non_english(mut self, text: &str) -> Self {
        self.non_english = non_empty(text);
        self.invalidate_cache();
        self
    }

    pub fn with_romanized(mut self, text: &str) -> Self {
        self.romanized = non_empty(text);
        self.invalidate_cache();
        self
    }

    pub fn with_literal_translation(mut self, text: &str) -> Self {
        self.literal_translation = non_empty(text);
        self.invalidate_cache();
        self
    }

    pub fn with_version(mut self, version: Name) -> Self {
        self.add_version(version);
        self
    }

    pub fn with_extra(mut self, key: &str, value: Extra) -> Self {
        self.add_extra(key, value);
        self
    }

    /// Add an alternate rendering, ignoring exact duplicates.
    pub fn add_version(&mut self, version: Name) {
        if !self.versions.contains(&version) {
            self.versions.push(version);
            self.invalidate_cache();
        }
    }

    pub fn add_extra(&mut self, key: &str, value: Extra) {
        self.extra.insert(key.to_string(), value);
        self.invalidate_cache();
    }

    /// Store text as the English form if it looks English, else as the romanization.
    ///
    /// With a `probability`, text counts as English when `english_probability`
    /// reaches it; otherwise every word must be a known English word.
    pub fn set_eng_or_rom(&mut self, text: &str, probability: Option<f64>) {
        let is_eng = match probability {
            Some(min) => english_probability(text) >= min,
            None => is_english(text),
        };
        if is_eng {
            self.english = non_empty(text);
        } else {
            self.romanized = non_empty(text);
        }
        self.invalidate_cache();
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn english(&self) -> Option<&str> {
        self.english.as_deref()
    }

    pub fn non_english(&self) -> Option<&str> {
        self.non_english.as_deref()
    }

    pub fn romanized(&self) -> Option<&str> {
        self.romanized.as_deref()
    }

    pub fn literal_translation(&self) -> Option<&str> {
        self.literal_translation.as_deref()
    }

    pub fn versions(&self) -> &[Name] {
        &self.versions
    }

    pub fn extra(&self) -> &BTreeMap<String, Extra> {
        &self.extra
    }

    pub fn is_empty(&self) -> bool {
        self.english.is_none()
            && self.non_english.is_none()
            && self.romanized.is_none()
            && self.literal_translation.is_none()
    }

    /// English form for display: English, then literal translation, then the
    /// romanization when there is no non-English form.
    pub fn english_display(&self) -> Option<&str> {
        self.english
            .as_deref()
            .or(self.literal_translation.as_deref())
            .or_else(|| match self.non_english {
                None => self.romanized.as_deref(),
                Some(_) => None,
            })
    }

    fn text_fields(&self) -> [Option<&str>; 4] {
        [
            self.english.as_deref(),
            self.non_english.as_deref(),
            self.romanized.as_deref(),
            self.literal_translation.as_deref(),
        ]
    }

    fn sort_key(&self) -> (&str, &str) {
        (self.english_display().unwrap_or(""), self.non_english.as_deref().unwrap_or(""))
    }

    fn eng_parts(&self) -> BTreeSet<&str> {
        [
            self.english.as_deref(),
            self.literal_translation.as_deref(),
            self.romanized.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    // ------------------------------------------------------------------------
    // Normalized forms
    // ------------------------------------------------------------------------

    fn eng_fuzzed_nospace(&self) -> Option<&str> {
        self.cache
            .eng_fuzzed_nospace
            .get_or_init(|| {
                self.english_display()
                    .map(|eng| remove_whitespace(&fuzz(eng)))
                    .and_then(non_empty)
            })
            .as_deref()
    }

    fn non_eng_nospace(&self) -> Option<&str> {
        self.cache
            .non_eng_nospace
            .get_or_init(|| self.non_english.as_deref().map(remove_whitespace).and_then(non_empty))
            .as_deref()
    }

    fn non_eng_nospecial(&self) -> Option<&str> {
        self.cache
            .non_eng_nospecial
            .get_or_init(|| {
                self.non_eng_nospace()
                    .map(|text| NON_WORD.replace_all(text, "").into_owned())
                    .and_then(non_empty)
            })
            .as_deref()
    }

    fn eng_langs(&self) -> &BTreeSet<LangCat> {
        self.cache
            .eng_langs
            .get_or_init(|| LangCat::categorize_set(self.english_display().unwrap_or("")))
    }

    fn eng_lang(&self) -> LangCat {
        LangCat::from_set(self.eng_langs())
    }

    pub fn non_eng_langs(&self) -> &BTreeSet<LangCat> {
        self.cache
            .non_eng_langs
            .get_or_init(|| LangCat::categorize_set(self.non_english.as_deref().unwrap_or("")))
    }

    pub fn non_eng_lang(&self) -> LangCat {
        LangCat::from_set(self.non_eng_langs())
    }

    fn non_eng_if(&self, expected: LangCat) -> Option<&str> {
        let lang = self.non_eng_lang();
        if lang == expected || (lang == LangCat::Mix && self.non_eng_langs().contains(&expected)) {
            self.non_english.as_deref()
        } else {
            None
        }
    }

    pub fn korean(&self) -> Option<&str> {
        self.non_eng_if(LangCat::Han)
    }

    pub fn japanese(&self) -> Option<&str> {
        self.non_eng_if(LangCat::Jpn)
    }

    pub fn cjk(&self) -> Option<&str> {
        self.non_eng_if(LangCat::Cjk)
    }

    // ------------------------------------------------------------------------
    // Romanization
    // ------------------------------------------------------------------------

    fn romanization_pattern(&self) -> Option<&Regex> {
        self.cache
            .romanization_pattern
            .get_or_init(|| self.non_eng_nospecial().and_then(hangul_pattern))
            .as_ref()
    }

    fn romanizations(&self) -> &FxHashSet<String> {
        self.cache.romanizations.get_or_init(|| {
            match (self.japanese().or(self.cjk()), self.non_eng_nospace()) {
                (Some(_), Some(text)) => japanese_romanizations(text),
                _ => FxHashSet::default(),
            }
        })
    }

    /// True if `text` is a romanization of this name's non-English form.
    ///
    /// With `fuzz`, the text is normalized (lowercase, no spaces or special
    /// characters) first; otherwise it must already be in that form.
    pub fn has_romanization(&self, text: &str, fuzz: bool) -> bool {
        let fuzzed = if fuzz { normalize(text, true, false) } else { text.to_string() };
        if fuzzed.is_empty() {
            return false;
        }
        if self.korean().is_some() && self.romanization_pattern().is_some_and(|p| p.is_match(&fuzzed)) {
            return true;
        }
        if self.japanese().is_some() || self.cjk().is_some() {
            return self.romanizations().contains(&fuzzed);
        }
        false
    }

    // ------------------------------------------------------------------------
    // OST handling
    // ------------------------------------------------------------------------

    pub fn is_ost(&self) -> bool {
        [self.english_display(), self.non_english.as_deref()]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().ends_with(OST_SUFFIX))
    }

    /// Copy with a trailing " OST" removed from every text form.
    fn no_suffix_version(&self) -> Option<&Name> {
        self.cache
            .no_suffix_version
            .get_or_init(|| {
                if !self.is_ost() {
                    return None;
                }
                let strip = |field: &Option<String>| -> Option<String> {
                    field.as_ref().map(|text| {
                        let cut = text.len().saturating_sub(OST_SUFFIX.len());
                        match text.get(cut..) {
                            Some(tail) if tail.eq_ignore_ascii_case(OST_SUFFIX) => text[..cut].trim().to_string(),
                            _ => text.clone(),
                        }
                    })
                };
                Some(Box::new(Name {
                    english: strip(&self.english).and_then(non_empty),
                    non_english: strip(&self.non_english).and_then(non_empty),
                    romanized: strip(&self.romanized).and_then(non_empty),
                    literal_translation: strip(&self.literal_translation).and_then(non_empty),
                    versions: self.versions.clone(),
                    extra: self.extra.clone(),
                    cache: NameCache::default(),
                }))
            })
            .as_deref()
    }

    // ------------------------------------------------------------------------
    // Scoring
    // ------------------------------------------------------------------------

    /// Every candidate similarity score between this name and `other`.
    ///
    /// Non-English forms are only compared when both use the same scripts.
    /// English forms are compared fuzzily, and a romanization hit in either
    /// direction scores `romanization_bonus`. Versions of this name are always
    /// tried; versions of `other` only with `include_other_versions`.
    pub fn scores(&self, other: &Name, romanization_bonus: i32, include_other_versions: bool) -> Vec<i32> {
        let mut scores = Vec::new();
        self.score_into(other, romanization_bonus, include_other_versions, true, true, &mut scores);
        scores
    }

    fn score_into(
        &self,
        other: &Name,
        bonus: i32,
        other_versions: bool,
        try_alt: bool,
        try_ost: bool,
        scores: &mut Vec<i32>,
    ) {
        let mut ep_score = None;
        if let (Some(a), Some(b)) = (self.non_eng_nospace(), other.non_eng_nospace()) {
            if self.non_eng_langs() == other.non_eng_langs() {
                let mut score = weighted_ratio(a, b);
                if score == 100 && self.english.is_some() && other.english.is_some() {
                    let eng_score = self.score_eng_parts(other);
                    ep_score = Some(eng_score);
                    score = (score + eng_score) / 2;
                }
                scores.push(score);
            }
        }

        if let (Some(a), Some(b)) = (self.eng_fuzzed_nospace(), other.eng_fuzzed_nospace()) {
            scores.push(weighted_ratio(a, b));
        }

        for (a, b) in [(self, other), (other, self)] {
            let Some(b_eng) = b.eng_fuzzed_nospace() else {
                continue;
            };
            if a.non_eng_nospace().is_some() && a.has_romanization(b_eng, false) {
                scores.push(match ep_score {
                    Some(ep) => (bonus + ep) / 2,
                    None => bonus,
                });
            }
        }

        if try_alt {
            if self.is_asian_misclassified_as_eng() {
                if self.split_scripts().is_alt_romanization_match(other) {
                    scores.push(bonus);
                }
            } else if other.is_asian_misclassified_as_eng() && other.split_scripts().is_alt_romanization_match(self) {
                scores.push(bonus);
            }
        }

        for version in &self.versions {
            version.score_into(other, bonus, true, try_alt, try_ost, scores);
        }
        if other_versions {
            for version in &other.versions {
                self.score_into(version, bonus, false, try_alt, try_ost, scores);
            }
        }

        if try_ost {
            if let Some(stripped) = self.no_suffix_version() {
                stripped.score_into(other, bonus, other_versions, try_alt, false, scores);
            } else if let Some(stripped) = other.no_suffix_version() {
                self.score_into(stripped, bonus, other_versions, try_alt, false, scores);
            }
        }
    }

    fn score_eng_parts(&self, other: &Name) -> i32 {
        let other_parts = other.eng_parts();
        self.eng_parts()
            .iter()
            .flat_map(|a| other_parts.iter().map(move |b| weighted_ratio(a, b)))
            .max()
            .unwrap_or(100)
    }

    /// English text that contains Asian script with no separate non-English form.
    fn is_asian_misclassified_as_eng(&self) -> bool {
        self.non_english.is_none()
            && self.eng_lang() == LangCat::Mix
            && self.eng_langs().iter().any(|cat| ASIAN.contains(cat))
    }

    /// Re-split the English form into its script runs.
    pub fn split_scripts(&self) -> Name {
        Name::from_parts(&LangCat::split(self.english_display().unwrap_or("")))
    }

    /// "Heart 2 Heart with 소녀시대" vs "Heart 2 Heart with Sonyeosidae"
    fn is_alt_romanization_match(&self, other: &Name) -> bool {
        match (other.eng_fuzzed_nospace(), self.eng_fuzzed_nospace()) {
            (Some(theirs), Some(ours)) => theirs
                .strip_prefix(ours)
                .is_some_and(|rest| self.has_romanization(rest, true)),
            _ => false,
        }
    }

    /// Highest score against `other`, or 0 when nothing is comparable.
    pub fn match_score(&self, other: &Name, romanization_bonus: i32) -> i32 {
        self.scores(other, romanization_bonus, true).into_iter().max().unwrap_or(0)
    }

    pub fn matches(&self, other: &Name) -> bool {
        self.matches_with(other, &MatchOptions::default())
    }

    pub fn matches_with(&self, other: &Name, opts: &MatchOptions) -> bool {
        self.matches_aggregate(other, opts, |scores| scores.iter().copied().max().unwrap_or(0))
    }

    /// Like `matches_with`, with a custom aggregate over the score list.
    pub fn matches_aggregate<F>(&self, other: &Name, opts: &MatchOptions, aggregate: F) -> bool
    where
        F: Fn(&[i32]) -> i32,
    {
        let scores = self.scores(other, opts.romanization_bonus, true);
        !scores.is_empty() && aggregate(&scores) >= opts.threshold
    }

    /// Match against the string form of a name.
    pub fn matches_str(&self, text: &str) -> bool {
        self.matches(&Name::parse(text))
    }

    pub fn matches_any<'a, I>(&self, others: I, opts: &MatchOptions) -> bool
    where
        I: IntoIterator<Item = &'a Name>,
    {
        others.into_iter().any(|other| self.matches_with(other, opts))
    }

    /// Highest-scoring candidate at or above the threshold.
    pub fn best_match<'a>(&self, candidates: &'a [Name], opts: &MatchOptions) -> Option<(&'a Name, i32)> {
        candidates
            .iter()
            .map(|candidate| (candidate, self.match_score(candidate, opts.romanization_bonus)))
            .filter(|(_, score)| *score >= opts.threshold)
            .max_by_key(|(_, score)| *score)
    }

    // ------------------------------------------------------------------------
    // Versions / merging
    // ------------------------------------------------------------------------

    fn basic_matches(&self, other: &Name) -> [Option<bool>; 2] {
        [
            field_match(self.english_display(), other.english_display()),
            field_match(self.non_english.as_deref(), other.non_english.as_deref()),
        ]
    }

    /// Same title with a different script pairing: one of the English and
    /// non-English forms is equal and the other differs, all four present.
    pub fn is_version_of(&self, other: &Name) -> bool {
        matches!(
            self.basic_matches(other),
            [Some(true), Some(false)] | [Some(false), Some(true)]
        )
    }

    /// Either the English or the non-English form is equal.
    pub fn is_partial_version_of(&self, other: &Name) -> bool {
        self.basic_matches(other).contains(&Some(true))
    }

    /// At least one form is equal, none conflict, and the names are not identical.
    pub fn should_merge(&self, other: &Name) -> bool {
        let matches = self.basic_matches(other);
        matches.contains(&Some(true)) && !matches.contains(&Some(false)) && self != other
    }

    /// Merge two names.
    ///
    /// A version of this name is appended to `versions` as is, keeping its
    /// own versions nested. Otherwise fields are merged preferring this
    /// name's values, versions are concatenated, and `extra` is merged with
    /// `other` winning on key collisions.
    pub fn combine(&self, other: &Name) -> Name {
        let mut combined = self.clone();
        if self.is_version_of(other) {
            combined.add_version(other.clone());
            return combined;
        }

        for version in &other.versions {
            combined.add_version(version.clone());
        }

        let fill = |ours: &mut Option<String>, theirs: &Option<String>| {
            if ours.is_none() {
                ours.clone_from(theirs);
            }
        };
        fill(&mut combined.english, &other.english);
        fill(&mut combined.non_english, &other.non_english);
        fill(&mut combined.romanized, &other.romanized);
        fill(&mut combined.literal_translation, &other.literal_translation);
        for (key, value) in &other.extra {
            combined.extra.insert(key.clone(), value.clone());
        }
        combined.invalidate_cache();
        combined
    }

    // ------------------------------------------------------------------------
    // Display helpers
    // ------------------------------------------------------------------------

    /// The name followed by "(group)" and "(member, member)" annotations.
    pub fn artist_str(&self) -> String {
        let mut parts = vec![self.to_string()];
        if let Some(group) = self.extra.get("group").and_then(Extra::as_name) {
            parts.push(format!("({group})"));
        }
        if let Some(members) = self.extra.get("members").and_then(Extra::as_names) {
            let members: Vec<String> = members.iter().map(Name::artist_str).collect();
            parts.push(format!("({})", members.join(", ")));
        }
        parts.join(" ")
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.english_display(), self.non_english.as_deref()) {
            (Some(eng), Some(non_eng)) => f.write_str(&combine_with_parens(&[eng, non_eng])),
            (Some(eng), None) => f.write_str(eng),
            (None, Some(non_eng)) => f.write_str(non_eng),
            (None, None) => f.write_str(
                self.romanized
                    .as_deref()
                    .or(self.literal_translation.as_deref())
                    .unwrap_or(""),
            ),
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Name");
        let labels = ["english", "non_english", "romanized", "literal_translation"];
        for (label, value) in labels.into_iter().zip(self.text_fields()) {
            if let Some(value) = value {
                s.field(label, &value);
            }
        }
        if !self.versions.is_empty() {
            s.field("versions", &self.versions);
        }
        if !self.extra.is_empty() {
            s.field("extra", &self.extra);
        }
        s.finish()
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.text_fields() == other.text_fields()
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text_fields().hash(state);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.text_fields().cmp(&other.text_fields()))
    }
}

// ============================================================================
// Part sorting
// ============================================================================

/// Sort name parts English-first: English before mixed script, then by
/// category, then by original position. When the first part has no English
/// script, an empty English slot is inserted before it.
pub fn sort_name_parts<S: AsRef<str>>(parts: &[S]) -> Vec<Option<String>> {
    let mut indexed: Vec<(usize, &str, LangCat)> = parts
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.as_ref(), LangCat::categorize(p.as_ref())))
        .collect();
    indexed.sort_by(|a, b| compare_parts((a.0, a.2), (b.0, b.2)));

    let needs_eng_slot = indexed
        .first()
        .is_some_and(|(_, first, _)| !LangCat::contains_any(first, &[LangCat::Eng]));
    let mut sorted: Vec<Option<String>> = indexed.into_iter().map(|(_, p, _)| Some(p.to_string())).collect();
    if needs_eng_slot {
        sorted.insert(0, None);
    }
    sorted
}

fn compare_parts((a_pos, a_cat): (usize, LangCat), (b_pos, b_cat): (usize, LangCat)) -> Ordering {
    if a_cat == b_cat {
        return a_pos.cmp(&b_pos);
    }
    match (a_cat, b_cat) {
        (LangCat::Eng, LangCat::Mix) => Ordering::Less,
        (LangCat::Mix, LangCat::Eng) => Ordering::Greater,
        _ => a_cat.cmp(&b_cat),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name() {
        let name = Name::default();
        assert!(name.is_empty());
        assert_eq!(name.to_string(), "");
        assert!(!Name::eng("X").is_empty());
        assert!(Name::eng("").is_empty());
    }

    #[test]
    fn test_english_display() {
        let name = Name::default().with_romanized("Dasi Mannan Segye");
        assert_eq!(name.english_display(), Some("Dasi Mannan Segye"));
        let name = name.with_non_english("다시 만난 세계");
        assert_eq!(name.english_display(), None);
        let name = name.with_literal_translation("Into the New World");
        assert_eq!(name.english_display(), Some("Into the New World"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Name::new(Some("Taeyeon"), Some("태연")).to_string(), "Taeyeon (태연)");
        assert_eq!(Name::non_eng("태연").to_string(), "태연");
        assert_eq!(Name::default().with_literal_translation("Lit").to_string(), "Lit");
    }

    #[test]
    fn test_equality_ignores_versions_and_extra() {
        let a = Name::eng("Apink").with_version(Name::eng("A Pink"));
        let b = Name::eng("Apink").with_extra("unknown", Extra::Texts(vec!["x".into()]));
        assert_eq!(a, b);
        assert_ne!(a, Name::eng("APINK"));

        let mut set = FxHashSet::default();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_parse() {
        let name = Name::parse("Taeyeon (태연)");
        assert_eq!(name.english(), Some("Taeyeon"));
        assert_eq!(name.non_english(), Some("태연"));

        let name = Name::parse("Red Velvet");
        assert_eq!(name.english(), Some("Red Velvet"));
        assert_eq!(name.non_english(), None);
    }

    #[test]
    fn test_from_parts_romanization() {
        let name = Name::from_parts(&["Girls' Generation", "소녀시대", "Sonyeosidae"]);
        assert_eq!(name.english(), Some("Girls' Generation"));
        assert_eq!(name.non_english(), Some("소녀시대"));
        assert_eq!(name.romanized(), Some("Sonyeosidae"));
        assert!(name.extra().is_empty());
    }

    #[test]
    fn test_from_parts_swaps_romanized_english() {
        let name = Name::from_parts(&["Dasi Mannan Segye", "다시 만난 세계", "Into the New World"]);
        assert_eq!(name.english(), Some("Into the New World"));
        assert_eq!(name.romanized(), Some("Dasi Mannan Segye"));
    }

    #[test]
    fn test_from_parts_unknown() {
        let name = Name::from_parts(&["Taeyeon", "태연", "Zzz"]);
        assert_eq!(name.english(), Some("Taeyeon"));
        assert_eq!(
            name.extra().get("unknown").and_then(Extra::as_texts),
            Some(&["Zzz".to_string()][..])
        );

        assert!(Name::from_parts(&["", ""]).is_empty());
        assert!(Name::from_parts::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_from_sorted_parts() {
        let sorted = |parts: &[&str]| parts.iter().map(|p| Some(p.to_string())).collect::<Vec<_>>();
        let name = Name::from_sorted_parts(sorted(&["Wish", "소원", "Sowon"]));
        assert_eq!(name.english(), Some("Wish"));
        assert_eq!(name.non_english(), Some("소원"));
        assert_eq!(name.romanized(), Some("Sowon"));

        let name = Name::from_sorted_parts(sorted(&["Wish", "소원", "소녀시대"]));
        assert_eq!(name.non_english(), Some("소원"));
        assert_eq!(name.romanized(), None);
        assert_eq!(
            name.extra().get("unknown").and_then(Extra::as_texts),
            Some(&["소녀시대".to_string()][..])
        );
    }

    #[test]
    fn test_from_enclosed() {
        let name = Name::from_enclosed("소녀시대 (Girls' Generation)");
        assert_eq!(name.english(), Some("Girls' Generation"));
        assert_eq!(name.non_english(), Some("소녀시대"));

        let name = Name::from_enclosed("Something (Else)");
        assert_eq!(name.english(), Some("Something (Else)"));
    }

    #[test]
    fn test_has_romanization() {
        let name = Name::non_eng("안녕");
        assert!(name.has_romanization("annyeong", true));
        assert!(name.has_romanization("Annyeong!", true));
        assert!(!name.has_romanization("goodbye", true));
        assert!(!name.has_romanization("", true));
        assert!(!Name::eng("Hello").has_romanization("hello", true));
    }

    #[test]
    fn test_has_romanization_japanese() {
        let name = Name::non_eng("さくら");
        assert_eq!(name.japanese(), Some("さくら"));
        assert!(name.has_romanization("Sakura", true));
        assert!(!name.has_romanization("cherry", true));
    }

    #[test]
    fn test_language_accessors() {
        let name = Name::non_eng("소녀시대");
        assert_eq!(name.korean(), Some("소녀시대"));
        assert_eq!(name.japanese(), None);
        let mixed = Name::non_eng("ちょこっとLOVE");
        assert_eq!(mixed.japanese(), Some("ちょこっとLOVE"));
        assert_eq!(mixed.korean(), None);
    }

    #[test]
    fn test_matches_reflexive() {
        for text in ["X", "Red Velvet", "소녀시대", "!!!"] {
            let name = Name::parse(text);
            assert!(name.matches(&name.clone()), "{text}");
        }
    }

    #[test]
    fn test_matches_fuzzy_english() {
        let a = Name::eng("Girls' Generation");
        let b = Name::eng("Girls Generation");
        assert_eq!(a.match_score(&b, 95), 100);
        assert!(!a.matches(&Name::eng("Red Velvet")));
    }

    #[test]
    fn test_matches_romanization_bonus() {
        let a = Name::eng("Sonyeosidae");
        let b = Name::non_eng("소녀시대");
        assert_eq!(a.scores(&b, 95, true), vec![95]);
        assert!(a.matches(&b));
        assert!(b.matches(&a));
    }

    #[test]
    fn test_matches_no_comparable_forms() {
        let eng = Name::eng("Into The New World");
        let other = Name::default()
            .with_romanized("Inthu Nyu Weoldeu")
            .with_non_english("다시 만난 세계");
        assert!(eng.scores(&other, 95, true).is_empty());
        assert!(!eng.matches(&other));
        assert_eq!(eng.match_score(&other, 95), 0);
    }

    #[test]
    fn test_matches_cross_script_never_compared() {
        let korean = Name::non_eng("소녀시대");
        let japanese = Name::non_eng("少女時代");
        assert!(korean.scores(&japanese, 95, true).is_empty());
    }

    #[test]
    fn test_ep_score_averaging() {
        let a = Name::new(Some("Into the New World"), Some("다시 만난 세계"));
        let b = Name::new(Some("Totally Different"), Some("다시 만난 세계"));
        let scores = a.scores(&b, 95, true);
        assert!(scores[0] < 100);
        assert!(scores[0] >= 50);
    }

    #[test]
    fn test_matches_versions() {
        let a = Name::eng("SNSD").with_version(Name::eng("Girls' Generation"));
        let b = Name::eng("Girls' Generation");
        assert!(a.matches(&b));
        assert!(b.matches(&a));
        assert!(!b.scores(&a, 95, false).contains(&100));
    }

    #[test]
    fn test_matches_ost_suffix() {
        let a = Name::eng("Goblin OST");
        assert!(a.is_ost());
        let b = Name::eng("Goblin");
        assert!(a.matches(&b));
        assert!(b.matches(&a));
    }

    #[test]
    fn test_alt_romanization_match() {
        let mixed = Name::eng("Heart 2 Heart with 소녀시대");
        let romanized = Name::eng("Heart 2 Heart with Sonyeosidae");
        assert!(mixed.scores(&romanized, 95, true).contains(&95));
        assert!(romanized.scores(&mixed, 95, true).contains(&95));
    }

    #[test]
    fn test_best_match() {
        let query = Name::eng("Red Velvet");
        let candidates = vec![Name::eng("Blue Velvet Band"), Name::eng("Red Velvet"), Name::eng("Apink")];
        let (best, score) = query
            .best_match(&candidates, &MatchOptions::default())
            .expect("match");
        assert_eq!(best, &Name::eng("Red Velvet"));
        assert_eq!(score, 100);
        assert!(query.matches_any(&candidates, &MatchOptions::default()));
        assert!(Name::eng("Twice")
            .best_match(&candidates, &MatchOptions::default())
            .is_none());
    }

    #[test]
    fn test_version_relations() {
        let a = Name::new(Some("Taeyeon"), Some("태연"));
        let b = Name::new(Some("TAEYEON"), Some("태연"));
        assert!(a.is_version_of(&b));
        assert!(a.is_partial_version_of(&b));
        assert!(!a.should_merge(&b));

        let c = Name::eng("Taeyeon");
        assert!(!a.is_version_of(&c));
        assert!(a.should_merge(&c));
        assert!(!a.should_merge(&a.clone()));
    }

    #[test]
    fn test_combine() {
        let a = Name::new(Some("Taeyeon"), Some("태연"));
        let b = Name::new(Some("TAEYEON"), Some("태연"));
        let combined = a.combine(&b);
        assert_eq!(combined, a);
        assert_eq!(combined.versions(), &[b][..]);

        let c = Name::eng("Taeyeon")
            .with_romanized("Taeyeon")
            .with_extra("group", Extra::Name(Box::new(Name::eng("SNSD"))));
        let merged = Name::non_eng("태연")
            .with_extra("group", Extra::Name(Box::new(Name::eng("Girls' Generation"))))
            .combine(&c);
        assert_eq!(merged.english(), Some("Taeyeon"));
        assert_eq!(merged.non_english(), Some("태연"));
        assert_eq!(merged.romanized(), Some("Taeyeon"));
        assert_eq!(merged.extra().get("group").and_then(Extra::as_name), Some(&Name::eng("SNSD")));
    }

    #[test]
    fn test_combine_version_keeps_its_versions_nested() {
        let a = Name::new(Some("Taeyeon"), Some("태연"));
        let mut b = Name::new(Some("TAEYEON"), Some("태연"));
        b.add_version(Name::new(Some("Tae Yeon"), Some("태연")));
        let combined = a.combine(&b);
        assert_eq!(combined.versions().len(), 1);
        assert_eq!(combined.versions()[0].english(), Some("TAEYEON"));
        assert_eq!(combined.versions()[0].versions().len(), 1);

        let c = Name::eng("Into the New World");
        let mut d = Name::non_eng("다시 만난 세계");
        d.add_version(Name::eng("Into The New World"));
        let merged = c.combine(&d);
        assert_eq!(merged.non_english(), Some("다시 만난 세계"));
        assert_eq!(merged.versions(), &[Name::eng("Into The New World")][..]);
    }

    #[test]
    fn test_set_eng_or_rom() {
        let mut name = Name::non_eng("다시 만난 세계");
        name.set_eng_or_rom("Into the New World", None);
        assert_eq!(name.english(), Some("Into the New World"));

        let mut name = Name::non_eng("다시 만난 세계");
        name.set_eng_or_rom("Dasi Mannan Segye", None);
        assert_eq!(name.romanized(), Some("Dasi Mannan Segye"));
        assert_eq!(name.english(), None);

        let mut name = Name::default();
        name.set_eng_or_rom("Lave Songs", Some(0.5));
        assert_eq!(name.english(), Some("Lave Songs"));
    }

    #[test]
    fn test_artist_str() {
        let member = Name::eng("Taeyeon");
        let group = Name::new(Some("Girls' Generation"), Some("소녀시대"))
            .with_extra("members", Extra::Names(vec![member.clone(), Name::eng("Tiffany")]));
        assert_eq!(group.artist_str(), "Girls' Generation (소녀시대) (Taeyeon, Tiffany)");

        let member = member.with_extra("group", Extra::Name(Box::new(Name::eng("SNSD"))));
        assert_eq!(member.artist_str(), "Taeyeon (SNSD)");
    }

    #[test]
    fn test_sort_name_parts() {
        assert_eq!(
            sort_name_parts(&["소녀시대", "Girls' Generation"]),
            vec![Some("Girls' Generation".to_string()), Some("소녀시대".to_string())]
        );
        assert_eq!(
            sort_name_parts(&["Heart 2 Heart with 소녀시대", "Title"]),
            vec![Some("Title".to_string()), Some("Heart 2 Heart with 소녀시대".to_string())]
        );
        assert_eq!(sort_name_parts(&["태연"]), vec![None, Some("태연".to_string())]);
        assert!(sort_name_parts::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_sort_name_parts_english_before_mixed() {
        assert_eq!(
            sort_name_parts(&["Wish 소원", "Wish"]),
            vec![Some("Wish".to_string()), Some("Wish 소원".to_string())]
        );
        assert_eq!(compare_parts((1, LangCat::Eng), (0, LangCat::Mix)), Ordering::Less);
        assert_eq!(compare_parts((0, LangCat::Mix), (1, LangCat::Eng)), Ordering::Greater);
        assert_eq!(compare_parts((1, LangCat::Eng), (0, LangCat::Han)), Ordering::Less);
        assert_eq!(compare_parts((0, LangCat::Eng), (1, LangCat::Eng)), Ordering::Less);
    }

    #[test]
    fn test_serialize() {
        let name = Name::new(Some("Taeyeon"), Some("태연"));
        let json = serde_json::to_string(&name).expect("serialize");
        assert_eq!(json, r#"{"english":"Taeyeon","non_english":"태연"}"#);
    }
}
