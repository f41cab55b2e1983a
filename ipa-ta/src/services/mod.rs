//! Pronunciation engine services
//!
//! Control flow on first lookup per language:
//! annotator → cache → (resolver → fetcher → parser → merger)

pub mod batch_annotator;
pub mod cache_purge;
pub mod cache_registry;
pub mod dataset_fetcher;
pub mod dataset_parser;
pub mod pronunciation_cache;
pub mod variety_merger;
pub mod variety_resolver;

pub use batch_annotator::{AnnotationOutcome, BatchAnnotator};
pub use cache_purge::{format_bytes, purge_dataset_cache, PurgeReport};
pub use cache_registry::CacheRegistry;
pub use dataset_fetcher::{DatasetFetcher, FetchError};
pub use dataset_parser::{parse_dataset, ParseError};
pub use pronunciation_cache::PronunciationCache;
pub use variety_merger::{merge_single_variety, merge_varieties};
pub use variety_resolver::{resolve_patterns, resolve_variety_labels, ResolvedLanguage};
