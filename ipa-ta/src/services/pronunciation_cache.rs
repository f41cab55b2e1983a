//! Pronunciation Cache
//!
//! Owns one language's merged pronunciation map. Loading runs the full
//! pipeline once (resolve → fetch → parse → merge) and is idempotent until
//! [`PronunciationCache::clear`] is called.
//!
//! The state lock is held for the whole load so concurrent first lookups on
//! one instance run the pipeline once. A completed load marks the cache as
//! loaded even when no dataset was available; it will not refetch until
//! cleared.

use async_trait::async_trait;
use ipa_common::config::SingleVarietyStrategy;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::dataset_fetcher::DatasetFetcher;
use super::dataset_parser::parse_dataset;
use super::variety_merger::{merge_single_variety, merge_varieties};
use super::variety_resolver::{self, ResolvedLanguage};
use crate::types::{LookupError, MergedPronunciation, Pattern, PronunciationSource, VarietyWordMap};

#[derive(Debug, Default)]
struct CacheState {
    loaded: bool,
    entries: MergedPronunciation,
    loaded_patterns: Vec<Pattern>,
}

/// Lazily loaded pronunciation data for one language
pub struct PronunciationCache {
    language: String,
    strategy: SingleVarietyStrategy,
    fetcher: Arc<DatasetFetcher>,
    state: RwLock<CacheState>,
}

impl PronunciationCache {
    pub fn new(
        language: impl Into<String>,
        fetcher: Arc<DatasetFetcher>,
        strategy: SingleVarietyStrategy,
    ) -> Self {
        Self {
            language: language.into().to_lowercase(),
            strategy,
            fetcher,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Variety key → label; empty for single-variety languages
    pub fn available_varieties(&self) -> HashMap<String, String> {
        variety_resolver::resolve_variety_labels(&self.language)
    }

    /// Load datasets unless already loaded
    pub async fn ensure_loaded(&self) -> Result<(), LookupError> {
        if self.state.read().await.loaded {
            return Ok(());
        }

        let mut state = self.state.write().await;
        if state.loaded {
            return Ok(());
        }

        let resolved = variety_resolver::resolve(&self.language);
        let (entries, loaded_patterns) = self.load(&resolved).await?;

        info!(
            language = %self.language,
            words = entries.len(),
            patterns = ?loaded_patterns.iter().map(Pattern::as_str).collect::<Vec<_>>(),
            "Pronunciation data loaded"
        );
        if entries.is_empty() {
            warn!(language = %self.language, "No pronunciation data available");
        }

        *state = CacheState {
            loaded: true,
            entries,
            loaded_patterns,
        };
        Ok(())
    }

    /// Formatted transcription for a word (case-insensitive)
    ///
    /// `Ok(None)` means the word is unknown.
    pub async fn lookup(&self, word: &str) -> Result<Option<String>, LookupError> {
        self.ensure_loaded().await?;
        let state = self.state.read().await;
        Ok(state.entries.get(&word.to_lowercase()).cloned())
    }

    /// Drop loaded data; the next lookup reloads
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        *state = CacheState::default();
        debug!(language = %self.language, "Pronunciation cache cleared");
    }

    /// Patterns that contributed to the current data
    pub async fn loaded_patterns(&self) -> Vec<Pattern> {
        self.state.read().await.loaded_patterns.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    /// Number of words with a transcription
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    async fn load(
        &self,
        resolved: &ResolvedLanguage,
    ) -> Result<(MergedPronunciation, Vec<Pattern>), LookupError> {
        let available = self.fetcher.ensure_available(&resolved.patterns).await?;
        if available.is_empty() {
            return Ok((MergedPronunciation::new(), Vec::new()));
        }

        let stop_after_first =
            !resolved.multi_variety && self.strategy == SingleVarietyStrategy::FirstAvailable;
        let files: Vec<(Pattern, PathBuf)> = available
            .into_iter()
            .map(|pattern| {
                let path = self.fetcher.dataset_path(&pattern);
                (pattern, path)
            })
            .collect();

        let parsed = tokio::task::spawn_blocking(move || parse_all(files, stop_after_first))
            .await
            .map_err(|e| LookupError::Internal(format!("Dataset parse task failed: {}", e)))?;

        let loaded_patterns: Vec<Pattern> =
            parsed.iter().map(|(pattern, _)| pattern.clone()).collect();

        let entries = if resolved.multi_variety {
            let maps: Vec<(String, VarietyWordMap)> = parsed
                .into_iter()
                .map(|(pattern, words)| (pattern.variety_key().to_string(), words))
                .collect();
            merge_varieties(&maps, &resolved.varieties)
        } else {
            let maps: Vec<VarietyWordMap> = parsed.into_iter().map(|(_, words)| words).collect();
            merge_single_variety(&maps, self.strategy)
        };

        Ok((entries, loaded_patterns))
    }
}

/// Parse files in order; unreadable files are skipped whole
fn parse_all(files: Vec<(Pattern, PathBuf)>, stop_after_first: bool) -> Vec<(Pattern, VarietyWordMap)> {
    let mut parsed = Vec::new();
    for (pattern, path) in files {
        match parse_dataset(&path) {
            Ok(words) => {
                debug!(pattern = %pattern, words = words.len(), "Parsed dataset");
                parsed.push((pattern, words));
                if stop_after_first {
                    break;
                }
            }
            Err(e) => warn!(pattern = %pattern, error = %e, "Skipping unreadable dataset"),
        }
    }
    parsed
}

#[async_trait]
impl PronunciationSource for PronunciationCache {
    async fn lookup(&self, word: &str) -> Result<Option<String>, LookupError> {
        PronunciationCache::lookup(self, word).await
    }
}
