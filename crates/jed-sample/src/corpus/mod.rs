//! Word and media lists the generators draw from.
//!
//! Lists are flat JSON arrays of strings. Each one is available embedded in the
//! binary or loaded from a data directory holding files of the same name.

pub mod media;
pub mod words;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use media::MediaPool;
pub use words::WordCorpus;

const CATEGORIES_JSON: &str = include_str!("../../data/categories.json");

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid word list {name}: {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Word list {0} is empty")]
    Empty(String),
}

/// Parses a JSON string array, rejecting empty lists and blank entries.
pub(crate) fn parse_list(name: &str, text: &str) -> Result<Vec<String>, CorpusError> {
    let list: Vec<String> = serde_json::from_str(text).map_err(|source| CorpusError::Json {
        name: name.to_string(),
        source,
    })?;

    let list: Vec<String> = list
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect();

    if list.is_empty() {
        return Err(CorpusError::Empty(name.to_string()));
    }
    Ok(list)
}

/// Reads `<dir>/<file_name>` as a word list.
pub(crate) fn load_list(dir: &Path, file_name: &str) -> Result<Vec<String>, CorpusError> {
    let path = dir.join(file_name);
    let text = fs::read_to_string(&path).map_err(|source| CorpusError::Io {
        path: path.clone(),
        source,
    })?;
    parse_list(file_name, &text)
}

/// Category titles used when a store has no category tree yet.
pub fn default_categories() -> Result<Vec<String>, CorpusError> {
    parse_list("categories.json", CATEGORIES_JSON)
}
