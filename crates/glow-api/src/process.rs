//! Handlers for `/process` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/process` | Body: [`ProcessBody`]; returns a [`ProcessingResult`] |
//! | `GET`  | `/process/health` | Static capability report |
//!
//! Request problems (no content, malformed URL, too-short text) are 400s.
//! Failures after validation still return 200 with `status: "error"` in the
//! envelope.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use glow_core::{log::NewLogEntry, store::KnowledgeStore};
use glow_pipeline::{ProcessRequest, ProcessingResult};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{ApiState, error::ApiError};

/// Label recorded in the processing log for attempts made through this
/// endpoint.
pub const PROCESSING_TYPE: &str = "analyze";

/// JSON body accepted by `POST /process`.
#[derive(Debug, Deserialize)]
pub struct ProcessBody {
  #[serde(flatten)]
  pub request:           ProcessRequest,
  /// If set, the attempt is appended to this item's processing log.
  #[serde(default)]
  pub knowledge_item_id: Option<i64>,
}

fn log_entry(item_id: i64, request: &ProcessRequest, result: &ProcessingResult) -> NewLogEntry {
  let output = json!({
    "summary":  result.summary,
    "tags":     result.tags,
    "analysis": result.analysis,
  });

  NewLogEntry {
    knowledge_item_id:  item_id,
    processing_type:    PROCESSING_TYPE.to_owned(),
    input_text:         request.payload().to_owned(),
    output_text:        output.to_string(),
    processing_time_ms: i64::try_from(result.processing_time_ms).unwrap_or(i64::MAX),
    status:             result.status,
    error_message:      (!result.error.is_empty()).then(|| result.error.clone()),
  }
}

/// `POST /process`
pub async fn process<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<ProcessBody>, JsonRejection>,
) -> Result<Json<ProcessingResult>, ApiError>
where
  S: KnowledgeStore,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let result = state.processor.process(&body.request).await?;

  // Recording is a separate store call; the processing result stands even if
  // it fails, but the failure is reported to the caller.
  if let Some(item_id) = body.knowledge_item_id {
    let entry = log_entry(item_id, &body.request, &result);
    let log_id = state
      .store
      .log_processing(entry)
      .await
      .map_err(ApiError::store)?;
    info!(item_id, log_id, status = %result.status, "recorded processing attempt");
  }

  Ok(Json(result))
}

/// `GET /process/health`
pub async fn health() -> Json<Value> {
  Json(json!({
    "status":       "healthy",
    "service":      "ai-processing",
    "capabilities": ["text", "url"],
  }))
}
