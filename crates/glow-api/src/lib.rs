//! JSON REST API for KnowledgeGlow.
//!
//! Exposes an axum [`Router`] backed by any [`glow_core::store::KnowledgeStore`]
//! and a [`Processor`]. TLS and other transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", glow_api::api_router(state))
//! ```

pub mod error;
pub mod knowledge;
pub mod process;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use glow_core::store::KnowledgeStore;
use glow_pipeline::Processor;

pub use error::ApiError;

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:     Arc<S>,
  pub processor: Arc<Processor>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), processor: Arc::clone(&self.processor) }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: KnowledgeStore + 'static,
{
  Router::new()
    // Knowledge items
    .route("/knowledge", get(knowledge::list::<S>).post(knowledge::create::<S>))
    .route(
      "/knowledge/{id}",
      get(knowledge::get_one::<S>)
        .put(knowledge::update_one::<S>)
        .delete(knowledge::delete_one::<S>),
    )
    .route("/knowledge/{id}/logs", get(knowledge::logs::<S>))
    .route("/knowledge/search/{query}", get(knowledge::search::<S>))
    .route("/knowledge/stats/summary", get(knowledge::stats::<S>))
    // Processing
    .route("/process", post(process::process::<S>))
    .route("/process/health", get(process::health))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
