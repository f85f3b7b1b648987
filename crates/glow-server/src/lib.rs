//! HTTP server assembly for KnowledgeGlow.
//!
//! Mounts the [`glow_api`] router under `/api` next to a service banner and a
//! liveness probe, and defines the runtime [`ServerConfig`].

use std::path::PathBuf;

use axum::{Json, Router, routing::get};
use glow_api::{ApiState, api_router};
use glow_core::store::KnowledgeStore;
use glow_pipeline::PipelineConfig;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GLOW_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub pipeline:   PipelineConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "0.0.0.0".to_owned(),
      port:       59147,
      store_path: PathBuf::from("./data/knowledge.db"),
      pipeline:   PipelineConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S>(state: ApiState<S>) -> Router
where
  S: KnowledgeStore + 'static,
{
  Router::new()
    .route("/", get(banner))
    .route("/health", get(health))
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

async fn banner() -> Json<Value> {
  Json(json!({
    "message": "KnowledgeGlow API",
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

async fn health() -> Json<Value> {
  Json(json!({ "status": "healthy", "service": "knowledge-glow" }))
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use glow_pipeline::Processor;
  use glow_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn make_state() -> ApiState<SqliteStore> {
    ApiState {
      store:     Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      processor: Arc::new(Processor::new(&PipelineConfig::default()).unwrap()),
    }
  }

  async fn oneshot_raw(
    state:  ApiState<SqliteStore>,
    method: &str,
    uri:    &str,
    body:   &str,
  ) -> axum::response::Response {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn banner_and_health() {
    let state = make_state().await;

    let resp = oneshot_raw(state.clone(), "GET", "/", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["message"], "KnowledgeGlow API");

    let resp = oneshot_raw(state, "GET", "/health", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "healthy");
  }

  #[tokio::test]
  async fn api_is_nested_under_prefix() {
    let state = make_state().await;

    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/api/knowledge",
      r#"{"title":"Nested","content":"Mounted under /api"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["id"].as_i64().unwrap();

    let resp = oneshot_raw(state.clone(), "GET", &format!("/api/knowledge/{id}"), "").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = oneshot_raw(state, "GET", "/knowledge", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn process_health_is_reachable() {
    let resp = oneshot_raw(make_state().await, "GET", "/api/process/health", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["service"], "ai-processing");
  }

  #[test]
  fn config_defaults_fill_missing_keys() {
    let cfg: ServerConfig = serde_json::from_value(json!({
      "port": 8080,
      "pipeline": { "fetch_timeout_secs": 3 },
    }))
    .unwrap();

    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert_eq!(cfg.store_path, PathBuf::from("./data/knowledge.db"));
    assert_eq!(cfg.pipeline.fetch_timeout_secs, 3);
    assert_eq!(cfg.pipeline.max_extract_chars, 5000);
  }
}
