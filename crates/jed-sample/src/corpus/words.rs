//! Random words, name combinations, and company names.

use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;

use super::{CorpusError, load_list, parse_list};
use crate::sampling::biased_accept;

const ADJECTIVES_JSON: &str = include_str!("../../data/adjectives.json");
const NOUNS_JSON: &str = include_str!("../../data/nouns.json");
const WORDS_JSON: &str = include_str!("../../data/words.json");

/// Legal-form suffixes appended to generated company names.
const COMPANY_SUFFIXES: [&str; 19] = [
    " Ltd", " SàRL", " SA", " LP", " GP", " Pty Ltd", " Pty", " LLC", " Corp.", " KGaA", " GmbH",
    " K/S", " e.V.", " A.G.", " Ky", " Oy", " Oyj", " OOD", " SD",
];

/// Immutable adjective, noun and generic word lists.
///
/// The corpus never remembers what it handed out; callers that need unique
/// values keep their own registry.
#[derive(Debug, Clone)]
pub struct WordCorpus {
    adjectives: Vec<String>,
    nouns: Vec<String>,
    words: Vec<String>,
}

impl WordCorpus {
    pub fn new(
        adjectives: Vec<String>,
        nouns: Vec<String>,
        words: Vec<String>,
    ) -> Result<Self, CorpusError> {
        for (name, list) in [("adjectives", &adjectives), ("nouns", &nouns), ("words", &words)] {
            if list.is_empty() {
                return Err(CorpusError::Empty(name.to_string()));
            }
        }
        Ok(Self {
            adjectives,
            nouns,
            words,
        })
    }

    /// Lists compiled into the crate.
    pub fn builtin() -> Result<Self, CorpusError> {
        Self::new(
            parse_list("adjectives.json", ADJECTIVES_JSON)?,
            parse_list("nouns.json", NOUNS_JSON)?,
            parse_list("words.json", WORDS_JSON)?,
        )
    }

    /// Loads `adjectives.json`, `nouns.json` and `words.json` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, CorpusError> {
        Self::new(
            load_list(dir, "adjectives.json")?,
            load_list(dir, "nouns.json")?,
            load_list(dir, "words.json")?,
        )
    }

    pub fn adjective(&self, rng: &mut impl Rng) -> &str {
        draw(&self.adjectives, rng)
    }

    pub fn noun(&self, rng: &mut impl Rng) -> &str {
        draw(&self.nouns, rng)
    }

    pub fn word(&self, rng: &mut impl Rng) -> &str {
        draw(&self.words, rng)
    }

    /// "Adjective Noun", both capitalised.
    pub fn combo(&self, rng: &mut impl Rng) -> String {
        format!(
            "{} {}",
            capitalize(self.adjective(rng)),
            capitalize(self.noun(rng))
        )
    }

    /// A word or a combo followed by a legal-form suffix, e.g. "Brave Otter GmbH".
    pub fn company(&self, rng: &mut impl Rng) -> String {
        let base = if biased_accept(rng, 50.0) {
            capitalize(self.word(rng))
        } else {
            self.combo(rng)
        };
        let suffix = COMPANY_SUFFIXES.choose(rng).copied().unwrap_or(" Ltd");
        format!("{base}{suffix}")
    }
}

fn draw<'a>(list: &'a [String], rng: &mut impl Rng) -> &'a str {
    // Lists are checked non-empty at construction.
    list.choose(rng).map(String::as_str).unwrap_or_default()
}

/// Upper-cases the first character.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
