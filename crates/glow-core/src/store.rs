//! The `KnowledgeStore` trait and its paging bounds.
//!
//! The trait is implemented by storage backends (e.g. `glow-store-sqlite`).
//! Higher layers (`glow-api`, `glow-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  item::{ItemUpdate, KnowledgeItem, NewKnowledgeItem},
  log::{NewLogEntry, ProcessingLogEntry},
  stats::KnowledgeStats,
};

// ─── Bounds ──────────────────────────────────────────────────────────────────

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const MAX_LIST_LIMIT: usize = 1000;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const MAX_SEARCH_LIMIT: usize = 500;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a KnowledgeGlow store backend.
///
/// Every read, search and update is scoped to active items. Each method is
/// atomic on its own; there are no transactions spanning two calls, so a
/// caller that updates an item and then logs the attempt must tolerate the
/// second call failing after the first succeeded.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait KnowledgeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Items ─────────────────────────────────────────────────────────────

  /// Persist a new item and return its id. Timestamps and `is_active` are
  /// set by the store.
  fn create(
    &self,
    input: NewKnowledgeItem,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Retrieve an active item. Returns `None` if it is missing or inactive.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<KnowledgeItem>, Self::Error>> + Send + '_;

  /// Page through active items, newest first. `limit` is clamped to
  /// [`MAX_LIST_LIMIT`].
  fn list(
    &self,
    limit: usize,
    offset: usize,
  ) -> impl Future<Output = Result<Vec<KnowledgeItem>, Self::Error>> + Send + '_;

  /// Apply a partial update and refresh `updated_at`.
  ///
  /// Returns `false` for an empty update and for missing or inactive items;
  /// the two cases are not distinguished.
  fn update(
    &self,
    id: i64,
    update: ItemUpdate,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Soft delete. Returns `false` if the item is missing or already inactive.
  fn delete(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Substring search over title, content and summary, newest first.
  /// `limit` is clamped to [`MAX_SEARCH_LIMIT`].
  fn search<'a>(
    &'a self,
    query: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<KnowledgeItem>, Self::Error>> + Send + 'a;

  /// Counts over the active items, see [`KnowledgeStats`].
  fn stats(
    &self,
  ) -> impl Future<Output = Result<KnowledgeStats, Self::Error>> + Send + '_;

  // ── Processing log ────────────────────────────────────────────────────

  /// Append a processing log entry and return its id. The item id is not
  /// checked; it may name an inactive item or no item at all. Fails only if
  /// storage is unavailable.
  fn log_processing(
    &self,
    entry: NewLogEntry,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// All log entries recorded against an item, oldest first.
  fn processing_logs(
    &self,
    knowledge_item_id: i64,
  ) -> impl Future<Output = Result<Vec<ProcessingLogEntry>, Self::Error>> + Send + '_;
}
