//! Persisted cache purge
//!
//! Deletes every downloaded dataset under the dataset directory (all
//! languages). The directory itself is kept; emptied subdirectories are
//! removed deepest first.
//!
//! Destructive: callers must keep lookups from running concurrently.

use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Outcome of a purge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurgeReport {
    pub success: bool,
    pub message: String,
    pub files_removed: usize,
    pub bytes_freed: u64,
    pub bytes_freed_formatted: String,
}

impl PurgeReport {
    fn new(success: bool, message: impl Into<String>, files_removed: usize, bytes_freed: u64) -> Self {
        Self {
            success,
            message: message.into(),
            files_removed,
            bytes_freed,
            bytes_freed_formatted: format_bytes(bytes_freed),
        }
    }
}

/// Remove all persisted datasets under `dataset_dir`
pub fn purge_dataset_cache(dataset_dir: &Path) -> PurgeReport {
    if !dataset_dir.exists() {
        info!(dir = %dataset_dir.display(), "Dataset directory absent, nothing to purge");
        return PurgeReport::new(true, "Cache directory does not exist", 0, 0);
    }

    if let Err(e) = std::fs::read_dir(dataset_dir) {
        warn!(dir = %dataset_dir.display(), error = %e, "Dataset directory unreadable");
        return PurgeReport::new(false, format!("Failed to clean cache: {}", e), 0, 0);
    }

    let mut files_removed = 0usize;
    let mut bytes_freed = 0u64;
    let mut subdirs = Vec::new();

    for entry in WalkDir::new(dataset_dir).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable cache entry");
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            subdirs.push((entry.depth(), entry.into_path()));
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        match std::fs::remove_file(entry.path()) {
            Ok(()) => {
                files_removed += 1;
                bytes_freed += size;
            }
            Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to remove cached file"),
        }
    }

    // Deepest first so parents are empty by the time they are visited
    subdirs.sort_by(|a, b| b.0.cmp(&a.0));
    for (_, dir) in subdirs {
        let is_empty = std::fs::read_dir(&dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if is_empty {
            if let Err(e) = std::fs::remove_dir(&dir) {
                warn!(path = %dir.display(), error = %e, "Failed to remove empty directory");
            }
        }
    }

    let report = PurgeReport::new(
        true,
        "Cache files cleaned successfully",
        files_removed,
        bytes_freed,
    );
    info!(
        files_removed,
        bytes_freed,
        freed = %report.bytes_freed_formatted,
        "Dataset cache purged"
    );
    report
}

/// Human-readable size, 1024-based with one decimal
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 bytes".to_string();
    }

    const UNITS: [&str; 6] = ["bytes", "KB", "MB", "GB", "TB", "PB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 bytes");
        assert_eq!(format_bytes(512), "512.0 bytes");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_missing_directory_is_success() {
        let dir = TempDir::new().unwrap();
        let report = purge_dataset_cache(&dir.path().join("missing"));

        assert!(report.success);
        assert_eq!(report.message, "Cache directory does not exist");
        assert_eq!(report.files_removed, 0);
        assert_eq!(report.bytes_freed_formatted, "0 bytes");
    }

    #[test]
    fn test_purge_counts_files_and_bytes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("eng_latn_us_broad.tsv"), vec![b'a'; 1000]).unwrap();
        std::fs::write(dir.path().join("deu_latn_broad.tsv"), vec![b'b'; 24]).unwrap();
        let nested = dir.path().join("old").join("deeper");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("fra_latn_broad.tsv"), vec![b'c'; 1024]).unwrap();

        let report = purge_dataset_cache(dir.path());

        assert!(report.success);
        assert_eq!(report.message, "Cache files cleaned successfully");
        assert_eq!(report.files_removed, 3);
        assert_eq!(report.bytes_freed, 2048);
        assert_eq!(report.bytes_freed_formatted, "2.0 KB");
        assert!(dir.path().exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_purge_empty_directory() {
        let dir = TempDir::new().unwrap();
        let report = purge_dataset_cache(dir.path());

        assert!(report.success);
        assert_eq!(report.files_removed, 0);
        assert_eq!(report.bytes_freed, 0);
    }
}
