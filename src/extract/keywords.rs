//! Keyword derivation from free text
//!
//! Ranking combines plain term frequency with two capitalization signals:
//! proper nouns (capitalized words that do not start a sentence) and
//! acronyms (runs of uppercase letters). Selection fills the result in three
//! passes: acronyms, then proper nouns, then the boosted frequency table.
//! The boost magnitudes and thresholds below are fixed.

use crate::extract::stopwords::is_stopword;
use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Score added to a term per proper-noun occurrence
pub const PROPER_NOUN_BOOST: u32 = 5;
/// Score added to a term per acronym occurrence
pub const ACRONYM_BOOST: u32 = 3;
/// Shortest term (in characters) counted in the frequency table
pub const MIN_TERM_CHARS: usize = 4;
/// Fewest raw occurrences for a term to be used as frequency fill
pub const MIN_FILL_OCCURRENCES: u32 = 2;
/// Most acronyms selected per text
pub const MAX_ACRONYMS: usize = 2;
/// Most proper nouns selected per text
pub const MAX_PROPER_NOUNS: usize = 3;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\p{L}{3,}\b").expect("word pattern"));

static PROPER_NOUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\p{Lu}\p{Ll}{2,}\b").expect("proper noun pattern"));

static ACRONYM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\p{Lu}{2,}\b").expect("acronym pattern"));

static MEASUREMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d+(?:[.,]\d+)?\s*(?:kg|mg|km|cm|mm|ml|g|t|m|l|°C|°F|%)").expect("measurement pattern")
});

/// Raw signals detected in a text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSignals {
    /// Lowercase words of at least three letters, in order
    pub tokens: Vec<String>,
    /// Capitalized words not at a sentence start, original casing, in order
    pub proper_nouns: Vec<String>,
    /// Uppercase runs of at least two letters, in order
    pub acronyms: Vec<String>,
    /// Numbers directly followed by a recognized unit
    ///
    /// Detected only; these never take part in keyword ranking.
    pub measurements: Vec<String>,
}

impl TextSignals {
    pub fn analyze(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let tokens = WORD
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect();

        let proper_nouns = PROPER_NOUN
            .find_iter(text)
            .filter(|m| !is_sentence_start(text, m.start()))
            .map(|m| m.as_str().to_string())
            .collect();

        let acronyms = ACRONYM
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();

        let measurements = MEASUREMENT
            .find_iter(text)
            .filter(|m| {
                !text[m.end()..]
                    .chars()
                    .next()
                    .is_some_and(char::is_alphanumeric)
            })
            .map(|m| m.as_str().to_string())
            .collect();

        Self {
            tokens,
            proper_nouns,
            acronyms,
            measurements,
        }
    }
}

/// Sentence start: start of the text or directly after ". "
fn is_sentence_start(text: &str, offset: usize) -> bool {
    offset == 0 || text[..offset].ends_with(". ")
}

/// One entry of the boosted frequency table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCandidate {
    /// Lowercase term
    pub term: String,
    /// Occurrences plus boosts; accumulated, not normalized
    pub score: u32,
    /// Raw occurrences in the token stream
    pub occurrences: u32,
}

/// Deterministic keyword extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Returns up to `max_keywords` keywords for the text
    ///
    /// # Example
    ///
    /// ```
    /// use convo_archiver::extract::KeywordExtractor;
    ///
    /// let keywords = KeywordExtractor::new().extract("rust rust tokio tokio serde", 5);
    /// assert_eq!(keywords, vec!["Rust".to_string(), "Tokio".to_string()]);
    /// ```
    pub fn extract(&self, text: &str, max_keywords: usize) -> Vec<String> {
        let signals = TextSignals::analyze(text);
        let candidates = rank_candidates(&signals);
        let mut selection = Selection::new(max_keywords);

        let mut acronyms_taken = 0;
        for acronym in signals.acronyms.iter().collect::<IndexSet<_>>() {
            if acronyms_taken == MAX_ACRONYMS || selection.is_full() {
                break;
            }
            if selection.push(acronym.clone()) {
                acronyms_taken += 1;
            }
        }

        let mut proper_counts: IndexMap<&str, usize> = IndexMap::new();
        for noun in &signals.proper_nouns {
            *proper_counts.entry(noun.as_str()).or_default() += 1;
        }
        let mut proper_ranked: Vec<(&str, usize)> = proper_counts.into_iter().collect();
        proper_ranked.sort_by(|a, b| b.1.cmp(&a.1));
        for (noun, _) in proper_ranked.into_iter().take(MAX_PROPER_NOUNS) {
            selection.push(noun.to_string());
        }

        for candidate in candidates
            .iter()
            .filter(|c| c.occurrences >= MIN_FILL_OCCURRENCES)
        {
            if selection.is_full() {
                break;
            }
            selection.push(capitalize(&candidate.term));
        }

        selection.into_terms()
    }

    /// The boosted frequency table, highest score first
    ///
    /// Ties keep first-seen order.
    pub fn candidates(&self, text: &str) -> Vec<KeywordCandidate> {
        rank_candidates(&TextSignals::analyze(text))
    }
}

fn rank_candidates(signals: &TextSignals) -> Vec<KeywordCandidate> {
    let mut table: IndexMap<String, (u32, u32)> = IndexMap::new();

    for token in &signals.tokens {
        if token.chars().count() < MIN_TERM_CHARS || is_stopword(token) {
            continue;
        }
        let entry = table.entry(token.clone()).or_default();
        entry.0 += 1;
        entry.1 += 1;
    }

    for (terms, boost) in [
        (&signals.proper_nouns, PROPER_NOUN_BOOST),
        (&signals.acronyms, ACRONYM_BOOST),
    ] {
        for term in terms {
            let lowered = term.to_lowercase();
            if is_stopword(&lowered) {
                continue;
            }
            table.entry(lowered).or_default().1 += boost;
        }
    }

    let mut candidates: Vec<KeywordCandidate> = table
        .into_iter()
        .map(|(term, (occurrences, score))| KeywordCandidate {
            term,
            score,
            occurrences,
        })
        .collect();
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

/// Ordered selection without case-insensitive duplicates
struct Selection {
    max: usize,
    terms: Vec<String>,
    seen: HashSet<String>,
}

impl Selection {
    fn new(max: usize) -> Self {
        Self {
            max,
            terms: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.terms.len() >= self.max
    }

    fn push(&mut self, term: String) -> bool {
        if self.is_full() || !self.seen.insert(term.to_lowercase()) {
            return false;
        }
        self.terms.push(term);
        true
    }

    fn into_terms(self) -> Vec<String> {
        self.terms
    }
}

fn capitalize(term: &str) -> String {
    let mut chars = term.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
