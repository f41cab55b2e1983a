//! Variety Merger
//!
//! Combines per-variety word maps into one [`MergedPronunciation`].
//!
//! **Multi-variety rules** (per word):
//! - No variety with a non-empty transcription → word excluded
//! - One variety, or all identical → `/t/`
//! - Distinct transcriptions → `/t1//t2/...`, each once
//!
//! Varieties are visited in the order given (the resolved pattern order,
//! which follows the language configuration). Distinct transcriptions are
//! emitted in order of first appearance, so output is deterministic.

use ipa_common::config::SingleVarietyStrategy;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::types::{MergedPronunciation, VarietyWordMap};

/// Merge multi-variety datasets
///
/// `maps` pairs each variety key with its parsed words, in preference order.
/// `labels` maps variety key → human-readable label (used for logging).
pub fn merge_varieties(
    maps: &[(String, VarietyWordMap)],
    labels: &HashMap<String, String>,
) -> MergedPronunciation {
    let all_words: HashSet<&str> = maps
        .iter()
        .flat_map(|(_, words)| words.keys().map(String::as_str))
        .collect();

    let mut merged = MergedPronunciation::with_capacity(all_words.len());
    let mut multi_pronunciation = 0usize;

    for word in all_words {
        let transcriptions: Vec<&str> = maps
            .iter()
            .filter_map(|(_, words)| words.get(word))
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .collect();

        if transcriptions.is_empty() {
            continue;
        }

        let formatted = format_transcriptions(&transcriptions);
        if formatted.contains("//") {
            multi_pronunciation += 1;
        }
        merged.insert(word.to_string(), formatted);
    }

    for (key, words) in maps {
        let label = labels.get(key).map(String::as_str).unwrap_or(key.as_str());
        debug!(variety = %key, label = %label, words = words.len(), "Variety contributed");
    }
    info!(
        varieties = maps.len(),
        words = merged.len(),
        multi_pronunciation,
        "Merged variety datasets"
    );

    merged
}

/// Build the merged map for a single-variety language
///
/// `maps` holds successfully parsed datasets in preference order.
pub fn merge_single_variety(
    maps: &[VarietyWordMap],
    strategy: SingleVarietyStrategy,
) -> MergedPronunciation {
    let contributing: &[VarietyWordMap] = match strategy {
        SingleVarietyStrategy::FirstAvailable => &maps[..maps.len().min(1)],
        SingleVarietyStrategy::FillGaps => maps,
    };

    let mut merged = MergedPronunciation::new();
    for words in contributing {
        for (word, transcription) in words {
            if transcription.is_empty() {
                continue;
            }
            merged
                .entry(word.clone())
                .or_insert_with(|| format_transcriptions(&[transcription.as_str()]));
        }
    }
    merged
}

/// Wrap each distinct transcription in slashes, first appearance first
pub fn format_transcriptions(transcriptions: &[&str]) -> String {
    let mut distinct: Vec<&str> = Vec::with_capacity(transcriptions.len());
    for t in transcriptions {
        if !distinct.contains(t) {
            distinct.push(t);
        }
    }
    distinct.iter().map(|t| format!("/{}/", t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(entries: &[(&str, &str)]) -> VarietyWordMap {
        entries
            .iter()
            .map(|(w, t)| (w.to_string(), t.to_string()))
            .collect()
    }

    fn english_labels() -> HashMap<String, String> {
        HashMap::from([
            ("uk".to_string(), "UK Received Pronunciation".to_string()),
            ("us".to_string(), "US General American".to_string()),
        ])
    }

    #[test]
    fn test_single_variety_present() {
        let maps = vec![("us".to_string(), words(&[("tomato", "t1")]))];
        let merged = merge_varieties(&maps, &english_labels());
        assert_eq!(merged["tomato"], "/t1/");
    }

    #[test]
    fn test_identical_transcriptions_deduplicated() {
        let maps = vec![
            ("uk".to_string(), words(&[("cat", "t1")])),
            ("us".to_string(), words(&[("cat", "t1")])),
        ];
        let merged = merge_varieties(&maps, &english_labels());
        assert_eq!(merged["cat"], "/t1/");
    }

    #[test]
    fn test_distinct_transcriptions_joined_in_variety_order() {
        let maps = vec![
            ("us".to_string(), words(&[("tomato", "t1")])),
            ("uk".to_string(), words(&[("tomato", "t2")])),
        ];
        let merged = merge_varieties(&maps, &english_labels());
        assert_eq!(merged["tomato"], "/t1//t2/");

        let reversed = vec![maps[1].clone(), maps[0].clone()];
        let merged = merge_varieties(&reversed, &english_labels());
        assert_eq!(merged["tomato"], "/t2//t1/");
    }

    #[test]
    fn test_three_varieties_two_distinct() {
        let maps = vec![
            ("hanoi".to_string(), words(&[("xin", "a")])),
            ("hue".to_string(), words(&[("xin", "b")])),
            ("saigon".to_string(), words(&[("xin", "a")])),
        ];
        let merged = merge_varieties(&maps, &HashMap::new());
        assert_eq!(merged["xin"], "/a//b/");
    }

    #[test]
    fn test_empty_transcriptions_excluded() {
        let maps = vec![
            ("uk".to_string(), words(&[("blank", ""), ("half", "")])),
            ("us".to_string(), words(&[("blank", ""), ("half", "hæf")])),
        ];
        let merged = merge_varieties(&maps, &english_labels());
        assert!(!merged.contains_key("blank"));
        assert_eq!(merged["half"], "/hæf/");
    }

    #[test]
    fn test_word_in_one_variety_only() {
        let maps = vec![
            ("uk".to_string(), words(&[("lorry", "lɒɹi")])),
            ("us".to_string(), words(&[("truck", "tɹʌk")])),
        ];
        let merged = merge_varieties(&maps, &english_labels());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["lorry"], "/lɒɹi/");
        assert_eq!(merged["truck"], "/tɹʌk/");
    }

    #[test]
    fn test_no_varieties_yields_empty() {
        assert!(merge_varieties(&[], &english_labels()).is_empty());
    }

    #[test]
    fn test_first_available_uses_first_map_only() {
        let maps = vec![
            words(&[("hus", "huːˀs")]),
            words(&[("hus", "huːs"), ("bil", "biːl")]),
        ];
        let merged = merge_single_variety(&maps, SingleVarietyStrategy::FirstAvailable);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged["hus"], "/huːˀs/");
    }

    #[test]
    fn test_fill_gaps_uses_later_maps_for_missing_words() {
        let maps = vec![
            words(&[("hus", "huːˀs"), ("tom", "")]),
            words(&[("hus", "huːs"), ("bil", "biːl"), ("tom", "tʌm")]),
        ];
        let merged = merge_single_variety(&maps, SingleVarietyStrategy::FillGaps);
        assert_eq!(merged["hus"], "/huːˀs/");
        assert_eq!(merged["bil"], "/biːl/");
        assert_eq!(merged["tom"], "/tʌm/");
    }

    #[test]
    fn test_single_variety_without_maps() {
        assert!(merge_single_variety(&[], SingleVarietyStrategy::FirstAvailable).is_empty());
        assert!(merge_single_variety(&[], SingleVarietyStrategy::FillGaps).is_empty());
    }

    #[test]
    fn test_format_transcriptions() {
        assert_eq!(format_transcriptions(&["a"]), "/a/");
        assert_eq!(format_transcriptions(&["a", "a"]), "/a/");
        assert_eq!(format_transcriptions(&["a", "b", "a", "c"]), "/a//b//c/");
    }
}
