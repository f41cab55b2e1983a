//! Dataset Parser
//!
//! Reads one `<pattern>.tsv` file into a [`VarietyWordMap`].
//!
//! **Line format:** `word<TAB>ipa[<TAB>ignored...]`, UTF-8
//!
//! - Lines are trimmed; empty lines and lines without a tab are skipped
//! - Word key is lowercased
//! - All whitespace inside the transcription is removed
//! - Lines whose transcription is empty after cleaning are skipped
//! - First occurrence of a word wins
//!
//! Malformed lines never abort the parse. A file that cannot be read (or is
//! not valid UTF-8) fails as a whole so a dataset never contributes half of
//! its entries.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::VarietyWordMap;

/// Dataset file could not be read
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a dataset file
pub fn parse_dataset(path: &Path) -> Result<VarietyWordMap, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_reader(BufReader::new(file)).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse dataset lines from any buffered reader
pub fn parse_reader<R: BufRead>(reader: R) -> std::io::Result<VarietyWordMap> {
    let mut words = VarietyWordMap::new();

    for line in reader.lines() {
        let line = line?;
        if let Some((word, transcription)) = parse_line(&line) {
            words.entry(word).or_insert(transcription);
        }
    }

    Ok(words)
}

/// Split one line into (lowercased word, cleaned transcription)
fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut fields = line.split('\t');
    let word = fields.next()?;
    let transcription = clean_transcription(fields.next()?);
    if transcription.is_empty() {
        return None;
    }

    Some((word.to_lowercase(), transcription))
}

/// Strip every whitespace character (Wikipron separates segments with spaces)
pub fn clean_transcription(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}
