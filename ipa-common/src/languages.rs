//! Static language → pronunciation dataset configuration
//!
//! Maps ISO 639-1 codes to the Wikipron scrape datasets that cover them:
//! the ISO 639-3 code, script, preferred transcription granularity and, for
//! languages with regional pronunciations, the ordered list of varieties.
//!
//! The table prefers datasets with the higher word count, which is why some
//! languages default to `narrow` with `broad` as fallback. Variety order is
//! significant: it is the preference order used when merging dialects.
//!
//! The table is built once on first access and never mutated.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Transcription granularity of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionType {
    /// Phonemic transcription
    Broad,
    /// Phonetic transcription
    Narrow,
}

impl TranscriptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionType::Broad => "broad",
            TranscriptionType::Narrow => "narrow",
        }
    }
}

impl fmt::Display for TranscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dialect dataset of a language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageVariety {
    /// Variety key used in the dataset name (e.g. "us", "uk"); empty for the standard variety
    pub variety: &'static str,
    /// ISO 15924 script code, lowercase (e.g. "latn")
    pub script: &'static str,
    pub transcription_type: TranscriptionType,
    /// Human-readable label
    pub label: &'static str,
}

impl LanguageVariety {
    const fn new(
        variety: &'static str,
        script: &'static str,
        transcription_type: TranscriptionType,
        label: &'static str,
    ) -> Self {
        Self {
            variety,
            script,
            transcription_type,
            label,
        }
    }

    /// Key under which this variety is reported; "default" for the standard variety
    pub fn key(&self) -> &'static str {
        if self.variety.is_empty() {
            "default"
        } else {
            self.variety
        }
    }
}

/// Dataset configuration for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageConfig {
    /// ISO 639-3 code used in dataset names
    pub iso639_3: &'static str,
    /// Default script
    pub script: &'static str,
    pub default_transcription: TranscriptionType,
    /// Used when the default transcription dataset is unavailable
    pub fallback_transcription: TranscriptionType,
    /// Ordered varieties; empty for single-variety languages
    pub varieties: Vec<LanguageVariety>,
}

impl LanguageConfig {
    /// Single-variety language with the standard narrow fallback
    fn single(iso639_3: &'static str, script: &'static str, default: TranscriptionType) -> Self {
        Self::single_with_fallback(iso639_3, script, default, TranscriptionType::Narrow)
    }

    fn single_with_fallback(
        iso639_3: &'static str,
        script: &'static str,
        default: TranscriptionType,
        fallback: TranscriptionType,
    ) -> Self {
        Self {
            iso639_3,
            script,
            default_transcription: default,
            fallback_transcription: fallback,
            varieties: Vec::new(),
        }
    }

    fn multi(
        iso639_3: &'static str,
        script: &'static str,
        default: TranscriptionType,
        varieties: Vec<LanguageVariety>,
    ) -> Self {
        Self {
            iso639_3,
            script,
            default_transcription: default,
            fallback_transcription: TranscriptionType::Narrow,
            varieties,
        }
    }

    pub fn has_varieties(&self) -> bool {
        !self.varieties.is_empty()
    }
}

/// Look up the configuration for a language code (case-insensitive)
pub fn language_config(code: &str) -> Option<&'static LanguageConfig> {
    LANGUAGE_TABLE.get(code.to_lowercase().as_str())
}

/// All configured language codes, sorted
pub fn configured_languages() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = LANGUAGE_TABLE.keys().copied().collect();
    codes.sort_unstable();
    codes
}

/// Best-effort ISO 639-3 guess for an unmapped language code
pub fn guess_iso639_3(code: &str) -> String {
    let code = code.to_lowercase();
    match code.as_str() {
        "nb" => "nob".to_string(),
        "nn" => "nno".to_string(),
        "zh" => "zho".to_string(),
        "ja" => "jpn".to_string(),
        "ko" => "kor".to_string(),
        _ => code,
    }
}

static LANGUAGE_TABLE: Lazy<HashMap<&'static str, LanguageConfig>> = Lazy::new(build_table);

fn build_table() -> HashMap<&'static str, LanguageConfig> {
    use TranscriptionType::{Broad, Narrow};

    let v = LanguageVariety::new;
    let mut table = HashMap::new();

    // Multiple regional varieties, in preference order
    table.insert(
        "en",
        LanguageConfig::multi(
            "eng",
            "latn",
            Broad,
            vec![
                v("uk", "latn", Broad, "UK Received Pronunciation"),
                v("us", "latn", Broad, "US General American"),
            ],
        ),
    );
    table.insert(
        "es",
        LanguageConfig::multi(
            "spa",
            "latn",
            Broad,
            vec![
                v("ca", "latn", Broad, "Castilian Spain"),
                v("la", "latn", Broad, "Latin America"),
            ],
        ),
    );
    table.insert(
        "pt",
        LanguageConfig::multi(
            "por",
            "latn",
            Broad,
            vec![
                v("bz", "latn", Broad, "Brazil"),
                v("po", "latn", Broad, "Portugal"),
            ],
        ),
    );
    table.insert(
        "vi",
        LanguageConfig::multi(
            "vie",
            "latn",
            Narrow,
            vec![
                v("hanoi", "latn", Narrow, "Hà Nội"),
                v("hue", "latn", Narrow, "Huế"),
                v("saigon", "latn", Narrow, "Saigon"),
            ],
        ),
    );
    table.insert(
        "cy",
        LanguageConfig::multi(
            "cym",
            "latn",
            Broad,
            vec![
                v("nw", "latn", Broad, "North Wales"),
                v("sw", "latn", Broad, "South Wales"),
            ],
        ),
    );
    table.insert(
        "hy",
        LanguageConfig::multi(
            "hye",
            "armn",
            Broad,
            vec![
                v("e", "armn", Broad, "Eastern Armenian"),
                v("w", "armn", Broad, "Western Armenian"),
            ],
        ),
    );
    table.insert(
        "bn",
        LanguageConfig::multi(
            "ben",
            "beng",
            Broad,
            vec![
                v("", "beng", Broad, "Standard Bengali"),
                v("dhaka", "beng", Broad, "Dhaka"),
                v("rarh", "beng", Broad, "Rarh Standard Bengali"),
            ],
        ),
    );
    table.insert(
        "la",
        LanguageConfig::multi(
            "lat",
            "latn",
            Broad,
            vec![
                v("clas", "latn", Broad, "Classical"),
                v("eccl", "latn", Broad, "Ecclesiastical"),
            ],
        ),
    );

    // Narrow has noticeably more entries than broad for these
    for (code, iso, script) in [
        ("da", "dan", "latn"),
        ("hu", "hun", "latn"),
        ("cs", "ces", "latn"),
        ("ru", "rus", "cyrl"),
        ("fi", "fin", "latn"),
        ("et", "est", "latn"),
        ("lv", "lav", "latn"),
        ("lt", "lit", "latn"),
        ("sk", "slk", "latn"),
        ("sl", "slv", "latn"),
        ("mk", "mkd", "cyrl"),
        ("bg", "bul", "cyrl"),
        ("uk", "ukr", "cyrl"),
        ("be", "bel", "cyrl"),
    ] {
        table.insert(
            code,
            LanguageConfig::single_with_fallback(iso, script, Narrow, Broad),
        );
    }

    // Narrow only (or narrow clearly better)
    for (code, iso, script) in [
        ("ko", "kor", "hang"),
        ("ja", "jpn", "hira"),
        ("fa", "fas", "arab"),
        ("lo", "lao", "laoo"),
        ("ne", "nep", "deva"),
        ("xh", "xho", "latn"),
    ] {
        table.insert(code, LanguageConfig::single(iso, script, Narrow));
    }

    // Broad with the usual narrow fallback
    for (code, iso, script) in [
        ("de", "deu", "latn"),
        ("fr", "fra", "latn"),
        ("it", "ita", "latn"),
        ("nl", "nld", "latn"),
        ("pl", "pol", "latn"),
        ("sv", "swe", "latn"),
        ("is", "isl", "latn"),
        ("el", "ell", "grek"),
        ("tr", "tur", "latn"),
        ("hi", "hin", "deva"),
        ("ar", "ara", "arab"),
        ("zh", "zho", "hani"),
        ("th", "tha", "thai"),
        ("km", "khm", "khmr"),
        ("my", "mya", "mymr"),
        ("ka", "kat", "geor"),
        ("he", "heb", "hebr"),
        ("sa", "san", "deva"),
        ("ca", "cat", "latn"),
        ("eu", "eus", "latn"),
        ("gl", "glg", "latn"),
        ("ro", "ron", "latn"),
        ("ga", "gle", "latn"),
        ("gd", "gla", "latn"),
        ("mt", "mlt", "latn"),
        ("br", "bre", "latn"),
        ("az", "aze", "latn"),
        ("kk", "kaz", "cyrl"),
        ("tg", "tgk", "cyrl"),
        ("mn", "mon", "cyrl"),
        ("ky", "kir", "cyrl"),
        ("uz", "uzb", "latn"),
        ("tk", "tuk", "latn"),
        ("te", "tel", "telu"),
        ("ta", "tam", "taml"),
        ("ml", "mal", "mlym"),
        ("kn", "kan", "knda"),
        ("gu", "guj", "gujr"),
        ("mr", "mar", "deva"),
        ("ur", "urd", "arab"),
        ("pa", "pan", "guru"),
        ("si", "sin", "sinh"),
        ("id", "ind", "latn"),
        ("ms", "msa", "latn"),
        ("tl", "tgl", "latn"),
        ("sw", "swa", "latn"),
        ("am", "amh", "ethi"),
        ("yo", "yor", "latn"),
        ("ha", "hau", "latn"),
        ("zu", "zul", "latn"),
        ("af", "afr", "latn"),
        ("dv", "div", "thaa"),
        ("bo", "bod", "tibt"),
        ("haw", "haw", "latn"),
        ("ps", "pus", "arab"),
        ("eo", "epo", "latn"),
        ("vo", "vol", "latn"),
        ("no", "nor", "latn"),
        // Serbo-Croatian datasets are unified under hbs
        ("hr", "hbs", "latn"),
        ("sr", "hbs", "cyrl"),
        ("bs", "hbs", "latn"),
        ("sq", "sqi", "latn"),
    ] {
        table.insert(code, LanguageConfig::single(iso, script, Broad));
    }

    table
}
