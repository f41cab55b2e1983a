//! Per-language cache registry
//!
//! Creates one [`PronunciationCache`] per language on first use and keeps
//! it for the process lifetime (or until [`CacheRegistry::clear_all`]).

use ipa_common::config::SingleVarietyStrategy;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::dataset_fetcher::DatasetFetcher;
use super::pronunciation_cache::PronunciationCache;

pub struct CacheRegistry {
    fetcher: Arc<DatasetFetcher>,
    strategy: SingleVarietyStrategy,
    caches: RwLock<HashMap<String, Arc<PronunciationCache>>>,
}

impl CacheRegistry {
    pub fn new(fetcher: Arc<DatasetFetcher>, strategy: SingleVarietyStrategy) -> Self {
        Self {
            fetcher,
            strategy,
            caches: RwLock::new(HashMap::new()),
        }
    }

    /// Cache for a language, created (unloaded) if absent
    pub async fn get_or_create(&self, language: &str) -> Arc<PronunciationCache> {
        let language = language.to_lowercase();
        if let Some(cache) = self.caches.read().await.get(&language) {
            return Arc::clone(cache);
        }

        let mut caches = self.caches.write().await;
        Arc::clone(caches.entry(language.clone()).or_insert_with(|| {
            debug!(language = %language, "Creating pronunciation cache");
            Arc::new(PronunciationCache::new(
                language.clone(),
                Arc::clone(&self.fetcher),
                self.strategy,
            ))
        }))
    }

    /// Existing cache for a language, without creating one
    pub async fn get(&self, language: &str) -> Option<Arc<PronunciationCache>> {
        self.caches.read().await.get(&language.to_lowercase()).cloned()
    }

    /// Languages with a cache instance
    pub async fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.caches.read().await.keys().cloned().collect();
        languages.sort();
        languages
    }

    /// Clear and drop every cache; returns how many were dropped
    pub async fn clear_all(&self) -> usize {
        let mut caches = self.caches.write().await;
        for cache in caches.values() {
            cache.clear().await;
        }
        let dropped = caches.len();
        caches.clear();
        dropped
    }
}
