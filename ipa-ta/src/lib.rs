//! ipa-ta library interface
//!
//! Pronunciation engine (services) plus the HTTP surface. Exposed as a
//! library for integration testing.

pub mod api;
pub mod error;
pub mod services;
pub mod types;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use ipa_common::config::ServiceConfig;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::services::{CacheRegistry, DatasetFetcher, FetchError};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    /// Shared dataset directory access (all languages)
    pub fetcher: Arc<DatasetFetcher>,
    /// Per-language pronunciation caches
    pub registry: Arc<CacheRegistry>,
    /// Annotations hold it shared; cache purge holds it exclusively
    pub admin_gate: Arc<RwLock<()>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last surfaced error, reported by /health
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self, FetchError> {
        let fetcher = Arc::new(DatasetFetcher::new(&config.dataset_dir, &config.remote)?);
        let registry = Arc::new(CacheRegistry::new(
            Arc::clone(&fetcher),
            config.annotation.single_variety,
        ));

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            registry,
            admin_gate: Arc::new(RwLock::new(())),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        })
    }

    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::root_routes())
        .merge(api::health_routes())
        .merge(api::annotate_routes())
        .merge(api::language_routes())
        .merge(api::cache_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
