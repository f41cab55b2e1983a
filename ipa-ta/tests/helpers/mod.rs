//! Test Helper Utilities
//!
//! Shared utilities for testing ipa-ta: an in-process dictionary server
//! standing in for the remote Wikipron source, plus config builders.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use ipa_common::config::ServiceConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock remote dictionary serving `/<pattern>.tsv`
pub struct MockDictionary {
    pub base_url: String,
    requests: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockDictionary {
    /// Total requests served (hits and misses)
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().values().sum()
    }

    /// Requests for one file name
    pub fn requests_for(&self, file_name: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .get(file_name)
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Clone)]
struct MockState {
    files: Arc<HashMap<String, String>>,
    requests: Arc<Mutex<HashMap<String, usize>>>,
}

async fn serve_file(
    State(state): State<MockState>,
    Path(file_name): Path<String>,
) -> Result<String, StatusCode> {
    *state
        .requests
        .lock()
        .unwrap()
        .entry(file_name.clone())
        .or_insert(0) += 1;

    state
        .files
        .get(&file_name)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}

/// Start a mock dictionary on an ephemeral loopback port
///
/// `files` maps pattern (without `.tsv`) to file content.
pub async fn start_mock_dictionary(files: &[(&str, &str)]) -> MockDictionary {
    let files: HashMap<String, String> = files
        .iter()
        .map(|(pattern, content)| (format!("{}.tsv", pattern), content.to_string()))
        .collect();
    let requests = Arc::new(Mutex::new(HashMap::new()));

    let state = MockState {
        files: Arc::new(files),
        requests: Arc::clone(&requests),
    };
    let app = Router::new()
        .route("/tsv/:file", get(serve_file))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockDictionary {
        base_url: format!("http://{}/tsv", addr),
        requests,
    }
}

/// Service config pointing at a dataset dir and mock dictionary
pub fn test_config(dataset_dir: &std::path::Path, base_url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::with_dataset_dir(dataset_dir);
    config.remote.base_url = base_url.to_string();
    config.remote.timeout_secs = 5;
    config
}

/// Number of regular files under a directory (recursive)
pub fn count_files(dir: &std::path::Path) -> usize {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .count()
}

pub const ENG_UK: &str = "tomato\tt ə m ɑː t əʊ\ncat\tk æ t\nlorry\tl ɒ ɹ i\n";
pub const ENG_US: &str = "tomato\tt ə m eɪ t oʊ\ncat\tk æ t\ntruck\tt ɹ ʌ k\n";
pub const DEU_BROAD: &str = "Haus\th a ʊ s\nBaum\tb a ʊ m\n";
