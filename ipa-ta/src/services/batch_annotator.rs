//! Batch Annotator
//!
//! Adds transcriptions to the tokens of a JSON document batch.
//!
//! **Input shape:** an array of documents, each optionally holding a
//! `tokens` array of objects. Anything else passes through unchanged.
//!
//! **Contract:**
//! - Each distinct field value across the whole batch is looked up once
//! - A transcription field is added only for non-empty results
//! - Any lookup error aborts the batch: the input comes back untouched,
//!   with one error message

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error};

use crate::types::{LookupError, PronunciationSource};

/// Key holding a document's token list
pub const TOKENS_KEY: &str = "tokens";

const DEFAULT_TRANSCRIPTION_FIELD: &str = "ipa";
const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Annotated documents plus the batch error, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationOutcome {
    pub result: Value,
    #[serde(rename = "ipa_error")]
    pub error: Option<String>,
}

impl AnnotationOutcome {
    fn success(result: Value) -> Self {
        Self { result, error: None }
    }
}

/// Annotates token batches from one pronunciation source
pub struct BatchAnnotator {
    source: Arc<dyn PronunciationSource>,
    token_field: String,
    transcription_field: String,
    max_concurrent_lookups: usize,
}

impl BatchAnnotator {
    pub fn new(source: Arc<dyn PronunciationSource>, token_field: impl Into<String>) -> Self {
        Self {
            source,
            token_field: token_field.into(),
            transcription_field: DEFAULT_TRANSCRIPTION_FIELD.to_string(),
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }

    pub fn with_transcription_field(mut self, field: impl Into<String>) -> Self {
        self.transcription_field = field.into();
        self
    }

    pub fn with_max_concurrent_lookups(mut self, limit: usize) -> Self {
        self.max_concurrent_lookups = limit.max(1);
        self
    }

    /// Annotate a document batch
    pub async fn annotate(&self, mut documents: Value) -> AnnotationOutcome {
        let Some(batch) = documents.as_array() else {
            debug!("Input is not a document list, returning unchanged");
            return AnnotationOutcome::success(documents);
        };

        let distinct = self.distinct_values(batch);
        debug!(
            documents = batch.len(),
            distinct_values = distinct.len(),
            field = %self.token_field,
            "Resolving token values"
        );

        let resolved: HashMap<String, Option<String>> = match stream::iter(distinct)
            .map(|value| {
                let source = Arc::clone(&self.source);
                async move {
                    let transcription = source.lookup(&value).await?;
                    Ok::<_, LookupError>((value, transcription))
                }
            })
            .buffer_unordered(self.max_concurrent_lookups)
            .try_collect()
            .await
        {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(error = %e, "Batch annotation aborted");
                return AnnotationOutcome {
                    result: documents,
                    error: Some(format!("Error processing IPA transcription: {}", e)),
                };
            }
        };

        if let Some(batch) = documents.as_array_mut() {
            for document in batch.iter_mut() {
                self.annotate_document(document, &resolved);
            }
        }

        AnnotationOutcome::success(documents)
    }

    fn distinct_values(&self, batch: &[Value]) -> HashSet<String> {
        batch
            .iter()
            .filter_map(|document| document.get(TOKENS_KEY)?.as_array())
            .flatten()
            .filter_map(|token| token.get(&self.token_field)?.as_str())
            .map(str::to_string)
            .collect()
    }

    fn annotate_document(&self, document: &mut Value, resolved: &HashMap<String, Option<String>>) {
        let Some(tokens) = document
            .get_mut(TOKENS_KEY)
            .and_then(Value::as_array_mut)
        else {
            return;
        };

        for token in tokens.iter_mut() {
            let Some(fields) = token.as_object_mut() else {
                continue;
            };
            let transcription = fields
                .get(&self.token_field)
                .and_then(Value::as_str)
                .and_then(|value| resolved.get(value))
                .and_then(Option::as_deref)
                .filter(|t| !t.is_empty())
                .map(str::to_string);

            if let Some(transcription) = transcription {
                fields.insert(self.transcription_field.clone(), Value::String(transcription));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted source recording every lookup
    #[derive(Default)]
    struct ScriptedSource {
        entries: HashMap<String, String>,
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn with(entries: &[(&str, &str)]) -> Self {
            Self {
                entries: entries
                    .iter()
                    .map(|(w, t)| (w.to_string(), t.to_string()))
                    .collect(),
                ..Self::default()
            }
        }

        fn failing_on(mut self, word: &str) -> Self {
            self.failing.insert(word.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PronunciationSource for ScriptedSource {
        async fn lookup(&self, word: &str) -> Result<Option<String>, LookupError> {
            self.calls.lock().unwrap().push(word.to_string());
            if self.failing.contains(word) {
                return Err(LookupError::Internal(format!("scripted failure for {}", word)));
            }
            Ok(self.entries.get(&word.to_lowercase()).cloned())
        }
    }

    fn annotator(source: Arc<ScriptedSource>) -> BatchAnnotator {
        BatchAnnotator::new(source, "lemma")
    }

    #[tokio::test]
    async fn test_annotates_tokens_with_transcription() {
        let source = Arc::new(ScriptedSource::with(&[("cat", "/kæt/")]));
        let input = json!([{"tokens": [{"lemma": "cat", "pos": "NOUN"}]}]);

        let outcome = annotator(source).annotate(input).await;

        assert_eq!(outcome.error, None);
        assert_eq!(
            outcome.result,
            json!([{"tokens": [{"lemma": "cat", "pos": "NOUN", "ipa": "/kæt/"}]}])
        );
    }

    #[tokio::test]
    async fn test_distinct_values_looked_up_once_across_documents() {
        let source = Arc::new(ScriptedSource::with(&[("cat", "/kæt/"), ("dog", "/dɒɡ/")]));
        let input = json!([
            {"tokens": [{"lemma": "cat"}, {"lemma": "dog"}, {"lemma": "cat"}]},
            {"tokens": [{"lemma": "cat"}, {"lemma": "dog"}, {"lemma": "bird"}]}
        ]);

        let outcome = annotator(source.clone()).annotate(input).await;

        assert_eq!(outcome.error, None);
        let mut calls = source.calls();
        calls.sort();
        assert_eq!(calls, vec!["bird", "cat", "dog"]);
    }

    #[tokio::test]
    async fn test_missing_field_and_unknown_word_left_unchanged() {
        let source = Arc::new(ScriptedSource::with(&[("cat", "/kæt/"), ("empty", "")]));
        let input = json!([{"tokens": [
            {"text": ","},
            {"lemma": "zzz"},
            {"lemma": "empty"},
            {"lemma": 42},
            "bare string",
            {"lemma": "cat"}
        ]}]);

        let outcome = annotator(source).annotate(input).await;

        assert_eq!(
            outcome.result,
            json!([{"tokens": [
                {"text": ","},
                {"lemma": "zzz"},
                {"lemma": "empty"},
                {"lemma": 42},
                "bare string",
                {"lemma": "cat", "ipa": "/kæt/"}
            ]}])
        );
    }

    #[tokio::test]
    async fn test_non_container_input_passes_through() {
        let source = Arc::new(ScriptedSource::with(&[("cat", "/kæt/")]));

        for input in [
            json!({"tokens": [{"lemma": "cat"}]}),
            json!("text"),
            json!([{"words": [{"lemma": "cat"}]}, {"tokens": "cat"}, 7]),
        ] {
            let outcome = annotator(source.clone()).annotate(input.clone()).await;
            assert_eq!(outcome.result, input);
            assert_eq!(outcome.error, None);
        }
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_error_returns_input_untouched() {
        let source = Arc::new(ScriptedSource::with(&[("cat", "/kæt/")]).failing_on("dog"));
        let input = json!([
            {"tokens": [{"lemma": "cat"}]},
            {"tokens": [{"lemma": "dog"}]}
        ]);

        let outcome = annotator(source)
            .with_max_concurrent_lookups(1)
            .annotate(input.clone())
            .await;

        assert_eq!(outcome.result, input);
        let message = outcome.error.unwrap();
        assert!(message.starts_with("Error processing IPA transcription:"));
        assert!(message.contains("dog"));
    }

    #[tokio::test]
    async fn test_custom_fields() {
        let source = Arc::new(ScriptedSource::with(&[("Haus", "/haʊs/"), ("haus", "/haʊs/")]));
        let input = json!([{"tokens": [{"word": "Haus"}]}]);

        let outcome = BatchAnnotator::new(source, "word")
            .with_transcription_field("pron")
            .annotate(input)
            .await;

        assert_eq!(outcome.result, json!([{"tokens": [{"word": "Haus", "pron": "/haʊs/"}]}]));
    }

    #[test]
    fn test_outcome_serialization() {
        let ok = AnnotationOutcome::success(json!([]));
        assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"result": [], "ipa_error": null}));

        let failed = AnnotationOutcome {
            result: json!([]),
            error: Some("boom".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"result": [], "ipa_error": "boom"})
        );
    }
}
