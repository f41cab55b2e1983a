//! DELETE /cache: persisted dataset purge

use axum::{extract::State, routing::delete, Json, Router};
use serde::Serialize;
use tracing::{error, info};

use crate::services::purge_dataset_cache;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct CachePurgeResponse {
    pub message: String,
    pub cleaned: bool,
    pub files_removed: usize,
    pub bytes_freed: u64,
    pub space_freed: String,
}

/// DELETE /cache
///
/// Removes every downloaded dataset and drops all in-memory caches, so the
/// next annotation for any language refetches.
pub async fn purge_cache(State(state): State<AppState>) -> ApiResult<Json<CachePurgeResponse>> {
    // Waits for in-flight annotations; blocks new ones until done
    let _gate = state.admin_gate.write().await;

    let dataset_dir = state.fetcher.dataset_dir().to_path_buf();
    let purge = tokio::task::spawn_blocking(move || purge_dataset_cache(&dataset_dir)).await;

    // Files may be partly gone even if the task failed
    let dropped = state.registry.clear_all().await;
    info!(caches_dropped = dropped, "In-memory pronunciation caches dropped");

    let report = purge.map_err(|e| ApiError::Internal(format!("Failed to clean cache: {}", e)))?;

    if !report.success {
        error!(message = %report.message, "Cache purge failed");
        state.record_error(report.message.clone()).await;
        return Err(ApiError::Internal(report.message));
    }

    Ok(Json(CachePurgeResponse {
        message: report.message,
        cleaned: true,
        files_removed: report.files_removed,
        bytes_freed: report.bytes_freed,
        space_freed: report.bytes_freed_formatted,
    }))
}

pub fn cache_routes() -> Router<AppState> {
    Router::new().route("/cache", delete(purge_cache))
}
