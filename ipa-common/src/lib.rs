//! # IPA Common Library
//!
//! Shared code for the IPA transcription services including:
//! - Common error type
//! - Bootstrap configuration loading (CLI → ENV → TOML → defaults)
//! - The static language → dataset configuration table

pub mod config;
pub mod error;
pub mod languages;

pub use error::{Error, Result};
pub use languages::{LanguageConfig, LanguageVariety, TranscriptionType};
