//! Language observability endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;

use super::validate_language_code;
use crate::services::variety_resolver;
use crate::types::Pattern;
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct LanguageListResponse {
    /// Codes present in the configuration table
    pub configured: Vec<&'static str>,
    /// Codes with a cache instance in this process
    pub active: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LanguageInfoResponse {
    pub language: String,
    pub configured: bool,
    pub multi_variety: bool,
    /// Candidate datasets in preference order
    pub patterns: Vec<Pattern>,
    pub varieties: HashMap<String, String>,
    /// Datasets the current cache instance loaded (empty until first use)
    pub loaded_patterns: Vec<Pattern>,
    pub loaded: bool,
    pub words: usize,
}

/// GET /languages
pub async fn list_languages(State(state): State<AppState>) -> Json<LanguageListResponse> {
    Json(LanguageListResponse {
        configured: ipa_common::languages::configured_languages(),
        active: state.registry.languages().await,
    })
}

/// GET /languages/:code
pub async fn language_info(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<LanguageInfoResponse>> {
    let language = validate_language_code(&code)?;
    let resolved = variety_resolver::resolve(&language);

    let (loaded_patterns, loaded, words) = match state.registry.get(&language).await {
        Some(cache) => (
            cache.loaded_patterns().await,
            cache.is_loaded().await,
            cache.len().await,
        ),
        None => (Vec::new(), false, 0),
    };

    Ok(Json(LanguageInfoResponse {
        language: resolved.language,
        configured: resolved.configured,
        multi_variety: resolved.multi_variety,
        patterns: resolved.patterns,
        varieties: resolved.varieties,
        loaded_patterns,
        loaded,
        words,
    }))
}

pub fn language_routes() -> Router<AppState> {
    Router::new()
        .route("/languages", get(list_languages))
        .route("/languages/:code", get(language_info))
}
