//! Configuration loading and dataset folder resolution
//!
//! Bootstrap settings are resolved in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or malformed TOML file never stops startup: the caller logs a
//! warning and the compiled defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default HTTP port for ipa-ta
pub const DEFAULT_PORT: u16 = 5740;

/// Default bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Wikipron scrape data, one `<pattern>.tsv` per dataset
pub const DEFAULT_REMOTE_BASE_URL: &str =
    "https://raw.githubusercontent.com/CUNY-CL/wikipron/master/data/scrape/tsv";

pub const ENV_DATASET_DIR: &str = "IPA_DATASET_DIR";
pub const ENV_HOST: &str = "IPA_HOST";
pub const ENV_PORT: &str = "IPA_PORT";
pub const ENV_REMOTE_BASE_URL: &str = "IPA_REMOTE_BASE_URL";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent values fall through to the
/// environment or compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Directory holding downloaded `<pattern>.tsv` datasets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub annotation: AnnotationConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Remote dictionary source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL; datasets are fetched from `<base_url>/<pattern>.tsv`
    #[serde(default = "default_remote_base_url")]
    pub base_url: String,

    /// Per-download timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_remote_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Batch annotation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// Upper bound on lookups in flight for one batch
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,

    /// Field added to annotated tokens
    #[serde(default = "default_transcription_field")]
    pub transcription_field: String,

    /// Token field looked up when the request does not name one
    #[serde(default = "default_token_field")]
    pub default_token_field: String,

    #[serde(default)]
    pub single_variety: SingleVarietyStrategy,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: default_max_concurrent_lookups(),
            transcription_field: default_transcription_field(),
            default_token_field: default_token_field(),
            single_variety: SingleVarietyStrategy::default(),
        }
    }
}

/// How candidate datasets of a single-variety language are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleVarietyStrategy {
    /// First dataset that parses is used exclusively
    #[default]
    FirstAvailable,
    /// Every parsed dataset contributes; earlier datasets win per word
    FillGaps,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_remote_base_url() -> String {
    DEFAULT_REMOTE_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_lookups() -> usize {
    8
}

fn default_transcription_field() -> String {
    "ipa".to_string()
}

fn default_token_field() -> String {
    "lemma".to_string()
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub dataset_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub logging: LoggingConfig,
    pub remote: RemoteConfig,
    pub annotation: AnnotationConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dataset_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl ServiceConfig {
    /// Resolve every setting from CLI → ENV → TOML → defaults
    pub fn resolve(cli: &CliOverrides, toml_config: TomlConfig) -> Result<Self> {
        let dataset_dir = resolve_dataset_dir(cli.dataset_dir.as_deref(), &toml_config);

        let host = cli
            .host
            .clone()
            .or_else(|| std::env::var(ENV_HOST).ok())
            .or(toml_config.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match cli.port {
            Some(port) => port,
            None => match std::env::var(ENV_PORT) {
                Ok(value) => value.parse::<u16>().map_err(|e| {
                    Error::Config(format!("Invalid {} value '{}': {}", ENV_PORT, value, e))
                })?,
                Err(_) => toml_config.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let mut remote = toml_config.remote;
        if let Ok(url) = std::env::var(ENV_REMOTE_BASE_URL) {
            remote.base_url = url;
        }
        remote.base_url = remote.base_url.trim_end_matches('/').to_string();
        if remote.base_url.is_empty() {
            return Err(Error::Config("remote.base_url must not be empty".to_string()));
        }
        if remote.timeout_secs == 0 {
            return Err(Error::Config("remote.timeout_secs must be positive".to_string()));
        }

        let mut annotation = toml_config.annotation;
        if annotation.max_concurrent_lookups == 0 {
            warn!("annotation.max_concurrent_lookups = 0, using 1");
            annotation.max_concurrent_lookups = 1;
        }
        if annotation.transcription_field.is_empty() {
            return Err(Error::Config(
                "annotation.transcription_field must not be empty".to_string(),
            ));
        }

        Ok(Self {
            dataset_dir,
            host,
            port,
            logging: toml_config.logging,
            remote,
            annotation,
        })
    }

    /// Configuration for tests and embedding: defaults with an explicit dataset folder
    pub fn with_dataset_dir(dataset_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_dir: dataset_dir.into(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            logging: LoggingConfig::default(),
            remote: RemoteConfig::default(),
            annotation: AnnotationConfig::default(),
        }
    }
}

/// Dataset folder resolution: CLI → ENV → TOML → compiled default
pub fn resolve_dataset_dir(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ENV_DATASET_DIR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.dataset_dir {
        return path.clone();
    }

    // Priority 4: compiled default
    default_dataset_dir()
}

/// OS-dependent default dataset folder
pub fn default_dataset_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ipa").join("datasets"))
        .unwrap_or_else(|| PathBuf::from("./cache"))
}

/// Default TOML location (`<config_dir>/ipa/ipa-ta.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ipa").join("ipa-ta.toml"))
}

/// TOML file to read: the explicit path if given, else the default location when it exists
pub fn config_file_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|path| path.exists()),
    }
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Write TOML config atomically (temp file in the same folder, then rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(())
}
