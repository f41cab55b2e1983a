//! Core types shared by the pronunciation engine
//!
//! A [`Pattern`] names one dataset file. Word maps are keyed by lowercased
//! word. [`PronunciationSource`] is the seam between the batch annotator and
//! whatever resolves a word (normally a [`PronunciationCache`]).
//!
//! [`PronunciationCache`]: crate::services::pronunciation_cache::PronunciationCache

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Key reported for patterns without a variety segment
pub const DEFAULT_VARIETY_KEY: &str = "default";

/// Dataset identifier, e.g. `eng_latn_us_broad` or `deu_latn_broad`
///
/// Encodes ISO 639-3 code, script, optional variety and transcription type,
/// joined by underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Pattern(String);

impl Pattern {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// On-disk / remote file name (`<pattern>.tsv`)
    pub fn file_name(&self) -> String {
        format!("{}.tsv", self.0)
    }

    /// Variety key: third segment when the pattern has four or more
    /// segments, otherwise [`DEFAULT_VARIETY_KEY`]
    pub fn variety_key(&self) -> &str {
        let segments: Vec<&str> = self.0.split('_').collect();
        if segments.len() >= 4 {
            segments[2]
        } else {
            DEFAULT_VARIETY_KEY
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lowercased word → cleaned transcription for one dataset
pub type VarietyWordMap = HashMap<String, String>;

/// Lowercased word → formatted transcription (`/t/` or `/t1//t2/`)
pub type MergedPronunciation = HashMap<String, String>;

/// Failure while loading or querying pronunciation data
///
/// Distinct from "word not found", which is `Ok(None)`.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Dataset directory cannot be created or used
    #[error("Dataset directory {path} unavailable: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Background task failed (panic or cancellation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Anything that can resolve a word to its formatted transcription
#[async_trait]
pub trait PronunciationSource: Send + Sync {
    /// `Ok(None)` when the word is unknown; `Err` only for real failures
    async fn lookup(&self, word: &str) -> Result<Option<String>, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variety_key_from_four_segments() {
        assert_eq!(Pattern::from("eng_latn_us_broad").variety_key(), "us");
        assert_eq!(Pattern::from("eng_latn_us_broad_phonemic").variety_key(), "us");
    }

    #[test]
    fn test_variety_key_defaults_for_short_patterns() {
        assert_eq!(Pattern::from("deu_latn_broad").variety_key(), "default");
        assert_eq!(Pattern::from("short_pattern").variety_key(), "default");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(Pattern::from("dan_latn_narrow").file_name(), "dan_latn_narrow.tsv");
    }
}
