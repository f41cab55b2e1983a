//! POST /ipa: batch annotation

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::validate_language_code;
use crate::services::{AnnotationOutcome, BatchAnnotator};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct AnnotateQuery {
    pub lang: Option<String>,
    /// Token field to transcribe; defaults to the configured field
    pub token_field: Option<String>,
}

/// POST /ipa?lang=<code>&token_field=<field>
///
/// Lookup failures are reported in `ipa_error` with the input returned
/// unchanged; only request problems produce an error status.
pub async fn annotate(
    State(state): State<AppState>,
    Query(query): Query<AnnotateQuery>,
    Json(documents): Json<Value>,
) -> ApiResult<Json<AnnotationOutcome>> {
    let lang = query
        .lang
        .ok_or_else(|| ApiError::BadRequest("Missing required query parameter 'lang'".to_string()))?;
    let language = validate_language_code(&lang)?;
    let annotation = &state.config.annotation;
    let token_field = query
        .token_field
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| annotation.default_token_field.clone());

    let _gate = state.admin_gate.read().await;
    let cache = state.registry.get_or_create(&language).await;

    let outcome = BatchAnnotator::new(cache, token_field.as_str())
        .with_transcription_field(annotation.transcription_field.as_str())
        .with_max_concurrent_lookups(annotation.max_concurrent_lookups)
        .annotate(documents)
        .await;

    match &outcome.error {
        Some(message) => state.record_error(message.clone()).await,
        None => info!(language = %language, field = %token_field, "Batch annotated"),
    }

    Ok(Json(outcome))
}

pub fn annotate_routes() -> Router<AppState> {
    Router::new().route("/ipa", post(annotate))
}
