//! Handlers for `/knowledge` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/knowledge` | `?limit` (≤ 1000), `?offset`, `?search` switches to search |
//! | `POST`   | `/knowledge` | Body: [`NewKnowledgeItem`]; returns 201 + `{id}` |
//! | `GET`    | `/knowledge/{id}` | 404 if missing or deleted |
//! | `PUT`    | `/knowledge/{id}` | Body: [`ItemUpdate`]; 400 if empty |
//! | `DELETE` | `/knowledge/{id}` | Soft delete; 404 if missing or deleted |
//! | `GET`    | `/knowledge/{id}/logs` | Processing log entries for the item |
//! | `GET`    | `/knowledge/search/{query}` | `?limit` (≤ 500) |
//! | `GET`    | `/knowledge/stats/summary` | Counts over active items |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use glow_core::{
  item::{ItemUpdate, KnowledgeItem, NewKnowledgeItem},
  log::ProcessingLogEntry,
  stats::KnowledgeStats,
  store::{
    DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT, KnowledgeStore, MAX_LIST_LIMIT,
    MAX_SEARCH_LIMIT,
  },
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{ApiState, error::ApiError};

fn bounded(limit: Option<usize>, default: usize, max: usize) -> Result<usize, ApiError> {
  let limit = limit.unwrap_or(default);
  if limit > max {
    return Err(ApiError::BadRequest(format!("limit must be at most {max}")));
  }
  Ok(limit)
}

fn ack(id: i64, message: &str) -> Json<Value> {
  Json(json!({ "id": id, "message": message, "status": "success" }))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit:  Option<usize>,
  #[serde(default)]
  pub offset: usize,
  /// If non-empty, search instead of listing; `offset` is then ignored.
  pub search: Option<String>,
}

/// `GET /knowledge[?limit=...][&offset=...][&search=...]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<KnowledgeItem>>, ApiError>
where
  S: KnowledgeStore,
{
  let limit = bounded(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT)?;

  let items = match params.search.as_deref() {
    Some(query) if !query.is_empty() => state.store.search(query, limit).await,
    _ => state.store.list(limit, params.offset).await,
  }
  .map_err(ApiError::store)?;

  Ok(Json(items))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /knowledge` — returns 201 + `{"id", "message", "status"}`.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  body: Result<Json<NewKnowledgeItem>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KnowledgeStore,
{
  let Json(item) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  item.validate()?;

  let id = state.store.create(item).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, ack(id, "Knowledge item created successfully")))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /knowledge/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<KnowledgeItem>, ApiError>
where
  S: KnowledgeStore,
{
  let item = state
    .store
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("knowledge item {id} not found")))?;
  Ok(Json(item))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /knowledge/{id}` — body: any subset of the mutable fields.
pub async fn update_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
  body: Result<Json<ItemUpdate>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: KnowledgeStore,
{
  let Json(update) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  if update.is_empty() {
    return Err(ApiError::BadRequest("no update data provided".into()));
  }
  update.validate()?;

  if !state.store.update(id, update).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("knowledge item {id} not found")));
  }
  Ok(ack(id, "Knowledge item updated successfully"))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /knowledge/{id}`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  S: KnowledgeStore,
{
  if !state.store.delete(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("knowledge item {id} not found")));
  }
  Ok(ack(id, "Knowledge item deleted successfully"))
}

// ─── Logs ─────────────────────────────────────────────────────────────────────

/// `GET /knowledge/{id}/logs`
pub async fn logs<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<ProcessingLogEntry>>, ApiError>
where
  S: KnowledgeStore,
{
  let entries = state.store.processing_logs(id).await.map_err(ApiError::store)?;
  Ok(Json(entries))
}

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub limit: Option<usize>,
}

/// `GET /knowledge/search/{query}[?limit=...]`
pub async fn search<S>(
  State(state): State<ApiState<S>>,
  Path(query): Path<String>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<KnowledgeItem>>, ApiError>
where
  S: KnowledgeStore,
{
  let limit = bounded(params.limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT)?;
  let items = state.store.search(&query, limit).await.map_err(ApiError::store)?;
  Ok(Json(items))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatsResponse {
  #[serde(flatten)]
  pub stats:  KnowledgeStats,
  pub status: &'static str,
}

/// `GET /knowledge/stats/summary`
pub async fn stats<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<StatsResponse>, ApiError>
where
  S: KnowledgeStore,
{
  let stats = state.store.stats().await.map_err(ApiError::store)?;
  Ok(Json(StatsResponse { stats, status: "success" }))
}
