//! Dataset Fetcher
//!
//! Ensures `<pattern>.tsv` files exist in the dataset directory, downloading
//! missing ones from `<base_url>/<pattern>.tsv`.
//!
//! **Behavior:**
//! - Existing local files are never re-fetched
//! - Downloads land in a temp file in the dataset directory and are renamed
//!   into place, so readers never observe a partial file
//! - Concurrent requests for the same pattern are serialized by a per-pattern
//!   lock; the loser re-checks and reuses the winner's file
//! - Network / HTTP / I/O failures drop the pattern (logged, never raised)
//! - No retries; each download is bounded by the configured timeout

use futures::future::join_all;
use ipa_common::config::RemoteConfig;
use reqwest::{header, Client, StatusCode};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::types::{LookupError, Pattern};

const USER_AGENT: &str = concat!("ipa-ta/", env!("CARGO_PKG_VERSION"));

/// Download failure for one pattern
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Remote returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background write failed: {0}")]
    Task(String),
}

/// Fetch-or-reuse access to the shared dataset directory
pub struct DatasetFetcher {
    http_client: Client,
    base_url: String,
    dataset_dir: PathBuf,
    pattern_locks: Mutex<HashMap<Pattern, Arc<Mutex<()>>>>,
    fetch_attempts: AtomicUsize,
}

impl DatasetFetcher {
    /// Create fetcher for a dataset directory and remote source
    pub fn new(dataset_dir: impl Into<PathBuf>, remote: &RemoteConfig) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );

        let http_client = Client::builder()
            .timeout(Duration::from_secs(remote.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: remote.base_url.trim_end_matches('/').to_string(),
            dataset_dir: dataset_dir.into(),
            pattern_locks: Mutex::new(HashMap::new()),
            fetch_attempts: AtomicUsize::new(0),
        })
    }

    pub fn dataset_dir(&self) -> &Path {
        &self.dataset_dir
    }

    /// Local path of a pattern's dataset file
    pub fn dataset_path(&self, pattern: &Pattern) -> PathBuf {
        self.dataset_dir.join(pattern.file_name())
    }

    /// Number of network downloads attempted since construction
    pub fn fetch_attempts(&self) -> usize {
        self.fetch_attempts.load(Ordering::SeqCst)
    }

    /// Create the dataset directory if needed
    ///
    /// An unusable directory is a storage failure, not a missing dataset.
    pub fn ensure_dataset_dir(&self) -> Result<(), LookupError> {
        std::fs::create_dir_all(&self.dataset_dir).map_err(|source| LookupError::Storage {
            path: self.dataset_dir.clone(),
            source,
        })
    }

    /// Make patterns available locally
    ///
    /// Returns the patterns whose files now exist, in input order.
    pub async fn ensure_available(&self, patterns: &[Pattern]) -> Result<Vec<Pattern>, LookupError> {
        self.ensure_dataset_dir()?;

        let outcomes = join_all(patterns.iter().map(|pattern| self.ensure_one(pattern))).await;

        Ok(patterns
            .iter()
            .zip(outcomes)
            .filter_map(|(pattern, available)| available.then(|| pattern.clone()))
            .collect())
    }

    async fn ensure_one(&self, pattern: &Pattern) -> bool {
        let path = self.dataset_path(pattern);
        if path.is_file() {
            debug!(pattern = %pattern, "Dataset present locally");
            return true;
        }

        let lock = self.pattern_lock(pattern).await;
        let _guard = lock.lock().await;

        // Another caller may have finished the download while we waited
        if path.is_file() {
            debug!(pattern = %pattern, "Dataset fetched by concurrent caller");
            return true;
        }

        match self.download(pattern, &path).await {
            Ok(bytes) => {
                info!(pattern = %pattern, bytes, "Downloaded dataset");
                true
            }
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Dataset unavailable, skipping");
                false
            }
        }
    }

    async fn pattern_lock(&self, pattern: &Pattern) -> Arc<Mutex<()>> {
        let mut locks = self.pattern_locks.lock().await;
        locks
            .entry(pattern.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn download(&self, pattern: &Pattern, target: &Path) -> Result<usize, FetchError> {
        let url = format!("{}/{}", self.base_url, pattern.file_name());
        self.fetch_attempts.fetch_add(1, Ordering::SeqCst);
        debug!(pattern = %pattern, url = %url, "Fetching dataset");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status, url });
        }

        let body = response.bytes().await?;
        let size = body.len();
        let dir = self.dataset_dir.clone();
        let target = target.to_path_buf();

        tokio::task::spawn_blocking(move || write_atomic(&dir, &target, &body))
            .await
            .map_err(|e| FetchError::Task(e.to_string()))??;

        Ok(size)
    }
}

/// Write into a temp file beside the target, then rename over it
fn write_atomic(dir: &Path, target: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.flush()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}
