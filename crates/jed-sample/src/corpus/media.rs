//! Photo and video URL pools.

use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;

use super::{CorpusError, load_list, parse_list};
use crate::sampling::pick_distinct;

const PHOTOS_JSON: &str = include_str!("../../data/photos.json");
const VIDEOS_JSON: &str = include_str!("../../data/videos.json");

#[derive(Debug, Clone)]
pub struct MediaPool {
    photos: Vec<String>,
    videos: Vec<String>,
}

impl MediaPool {
    pub fn new(photos: Vec<String>, videos: Vec<String>) -> Result<Self, CorpusError> {
        if photos.is_empty() {
            return Err(CorpusError::Empty("photos".into()));
        }
        if videos.is_empty() {
            return Err(CorpusError::Empty("videos".into()));
        }
        Ok(Self { photos, videos })
    }

    pub fn builtin() -> Result<Self, CorpusError> {
        Self::new(
            parse_list("photos.json", PHOTOS_JSON)?,
            parse_list("videos.json", VIDEOS_JSON)?,
        )
    }

    /// Loads `photos.json` and `videos.json` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, CorpusError> {
        Self::new(load_list(dir, "photos.json")?, load_list(dir, "videos.json")?)
    }

    pub fn photo(&self, rng: &mut impl Rng) -> &str {
        self.photos.choose(rng).map(String::as_str).unwrap_or_default()
    }

    /// Up to `count` distinct photo URLs.
    pub fn photos(&self, rng: &mut impl Rng, count: usize) -> Vec<String> {
        pick_distinct(rng, &self.photos, count)
    }

    pub fn video(&self, rng: &mut impl Rng) -> &str {
        self.videos.choose(rng).map(String::as_str).unwrap_or_default()
    }

    /// Up to `count` distinct video URLs.
    pub fn videos(&self, rng: &mut impl Rng, count: usize) -> Vec<String> {
        pick_distinct(rng, &self.videos, count)
    }
}
