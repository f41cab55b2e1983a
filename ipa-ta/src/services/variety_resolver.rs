//! Variety Resolver
//!
//! Turns a language code into the ordered candidate datasets and the
//! variety → label map, using the static language table.
//!
//! - Configured with varieties: one pattern per variety, configuration order
//! - Configured without varieties: default transcription, then fallback
//!   (fallback omitted when identical)
//! - Unconfigured: `<guess>_latn_broad`, `<guess>_latn_narrow` (degraded, non-fatal)

use ipa_common::languages::{self, LanguageConfig, LanguageVariety, TranscriptionType};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::types::Pattern;

/// Everything the cache needs to know about a language's datasets
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLanguage {
    /// Normalized (lowercase) language code
    pub language: String,
    /// Whether the language is present in the configuration table
    pub configured: bool,
    /// Whether dialect datasets must be merged
    pub multi_variety: bool,
    /// Candidate datasets in preference order
    pub patterns: Vec<Pattern>,
    /// Variety key → human-readable label
    pub varieties: HashMap<String, String>,
}

/// Resolve datasets and labels for a language
pub fn resolve(language: &str) -> ResolvedLanguage {
    let language = language.to_lowercase();
    let config = languages::language_config(&language);

    ResolvedLanguage {
        configured: config.is_some(),
        multi_variety: config.map(LanguageConfig::has_varieties).unwrap_or(false),
        patterns: resolve_patterns(&language),
        varieties: resolve_variety_labels(&language),
        language,
    }
}

/// Ordered candidate patterns for a language
pub fn resolve_patterns(language: &str) -> Vec<Pattern> {
    let Some(config) = languages::language_config(language) else {
        let guess = languages::guess_iso639_3(language);
        warn!(
            language = %language,
            guess = %guess,
            "No configuration for language, guessing dataset names"
        );
        return vec![
            single_pattern(&guess, "latn", TranscriptionType::Broad),
            single_pattern(&guess, "latn", TranscriptionType::Narrow),
        ];
    };

    if config.has_varieties() {
        return config
            .varieties
            .iter()
            .map(|variety| variety_pattern(config, variety))
            .collect();
    }

    let mut patterns = vec![single_pattern(
        config.iso639_3,
        config.script,
        config.default_transcription,
    )];
    if config.fallback_transcription != config.default_transcription {
        patterns.push(single_pattern(
            config.iso639_3,
            config.script,
            config.fallback_transcription,
        ));
    }
    patterns
}

/// Variety key → label; empty for single-variety or unconfigured languages
pub fn resolve_variety_labels(language: &str) -> HashMap<String, String> {
    languages::language_config(language)
        .map(|config| {
            config
                .varieties
                .iter()
                .map(|variety| (variety.key().to_string(), variety.label.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn variety_pattern(config: &LanguageConfig, variety: &LanguageVariety) -> Pattern {
    if variety.variety.is_empty() {
        single_pattern(config.iso639_3, variety.script, variety.transcription_type)
    } else {
        Pattern::new(format!(
            "{}_{}_{}_{}",
            config.iso639_3, variety.script, variety.variety, variety.transcription_type
        ))
    }
}

fn single_pattern(iso639_3: &str, script: &str, transcription: TranscriptionType) -> Pattern {
    Pattern::new(format!("{}_{}_{}", iso639_3, script, transcription))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(patterns: &[Pattern]) -> Vec<&str> {
        patterns.iter().map(Pattern::as_str).collect()
    }

    #[test]
    fn test_multi_variety_patterns_in_config_order() {
        let patterns = resolve_patterns("en");
        assert_eq!(names(&patterns), vec!["eng_latn_uk_broad", "eng_latn_us_broad"]);
    }

    #[test]
    fn test_standard_variety_has_no_variety_segment() {
        let patterns = resolve_patterns("bn");
        assert_eq!(
            names(&patterns),
            vec!["ben_beng_broad", "ben_beng_dhaka_broad", "ben_beng_rarh_broad"]
        );
        assert_eq!(patterns[0].variety_key(), "default");
        assert_eq!(patterns[1].variety_key(), "dhaka");
    }

    #[test]
    fn test_single_variety_default_then_fallback() {
        assert_eq!(
            names(&resolve_patterns("da")),
            vec!["dan_latn_narrow", "dan_latn_broad"]
        );
        assert_eq!(
            names(&resolve_patterns("de")),
            vec!["deu_latn_broad", "deu_latn_narrow"]
        );
    }

    #[test]
    fn test_identical_fallback_omitted() {
        assert_eq!(names(&resolve_patterns("ko")), vec!["kor_hang_narrow"]);
    }

    #[test]
    fn test_unconfigured_language_guesses_patterns() {
        assert_eq!(
            names(&resolve_patterns("nb")),
            vec!["nob_latn_broad", "nob_latn_narrow"]
        );
        assert_eq!(
            names(&resolve_patterns("xx")),
            vec!["xx_latn_broad", "xx_latn_narrow"]
        );
    }

    #[test]
    fn test_variety_labels() {
        let labels = resolve_variety_labels("en");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["us"], "US General American");
        assert_eq!(labels["uk"], "UK Received Pronunciation");

        assert_eq!(resolve_variety_labels("bn")["default"], "Standard Bengali");
        assert!(resolve_variety_labels("de").is_empty());
        assert!(resolve_variety_labels("xx").is_empty());
    }

    #[test]
    fn test_resolve_normalizes_case() {
        let resolved = resolve("EN");
        assert_eq!(resolved.language, "en");
        assert!(resolved.configured);
        assert!(resolved.multi_variety);

        let unknown = resolve("xx");
        assert!(!unknown.configured);
        assert!(!unknown.multi_variety);
        assert_eq!(unknown.patterns.len(), 2);
    }
}
