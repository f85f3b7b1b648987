//! [`SqliteStore`] — the SQLite implementation of [`KnowledgeStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, types::Value};

use glow_core::{
  item::{ItemUpdate, KnowledgeItem, NewKnowledgeItem},
  log::{NewLogEntry, ProcessingLogEntry},
  stats::{KnowledgeStats, STATS_SCAN_CAP},
  store::{KnowledgeStore, MAX_LIST_LIMIT, MAX_SEARCH_LIMIT},
};

use crate::{
  encode::{
    encode_dt, encode_tags, like_pattern, now, RawItem, RawLogEntry,
    ITEM_COLUMNS, LOG_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A KnowledgeGlow store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every
/// operation is one closure on the connection thread, so it either completes
/// or fails as a unit.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `SELECT <item columns> FROM knowledge_items <tail>` and decode rows.
  async fn query_items(
    &self,
    tail: &'static str,
    params: Vec<Value>,
  ) -> Result<Vec<KnowledgeItem>> {
    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM knowledge_items {tail}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  /// Page through active items without the public list bound.
  async fn scan_active(&self, limit: usize, offset: usize) -> Result<Vec<KnowledgeItem>> {
    self
      .query_items(
        "WHERE is_active = 1
         ORDER BY created_at DESC, id DESC
         LIMIT ?1 OFFSET ?2",
        vec![Value::Integer(to_i64(limit)), Value::Integer(to_i64(offset))],
      )
      .await
  }
}

fn to_i64(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

/// Turn the filled slots of an update into `(column, value)` pairs.
fn assignments(update: ItemUpdate) -> Result<Vec<(&'static str, Value)>> {
  let ItemUpdate { title, content, source_url, tags, summary, ai_analysis } =
    update;

  let mut out = Vec::new();
  let text_slots = [
    ("title", title),
    ("content", content),
    ("source_url", source_url),
    ("summary", summary),
    ("ai_analysis", ai_analysis),
  ];
  for (column, value) in text_slots {
    if let Some(v) = value {
      out.push((column, Value::Text(v)));
    }
  }
  if let Some(encoded) = encode_tags(tags.as_deref())? {
    out.push(("tags", Value::Text(encoded)));
  }
  Ok(out)
}

// ─── KnowledgeStore impl ─────────────────────────────────────────────────────

impl KnowledgeStore for SqliteStore {
  type Error = Error;

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn create(&self, input: NewKnowledgeItem) -> Result<i64> {
    input.validate()?;

    let at_str          = encode_dt(now());
    let tags_str        = encode_tags(input.tags.as_deref())?;
    let source_type_str = input.source_type.as_ref().to_owned();
    let NewKnowledgeItem { title, content, source_url, summary, ai_analysis, .. } =
      input;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO knowledge_items (
             title, content, source_type, source_url, tags,
             summary, ai_analysis, created_at, updated_at, is_active
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, 1)",
          rusqlite::params![
            title,
            content,
            source_type_str,
            source_url,
            tags_str,
            summary,
            ai_analysis,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(id)
  }

  async fn get(&self, id: i64) -> Result<Option<KnowledgeItem>> {
    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ITEM_COLUMNS} FROM knowledge_items WHERE id = ?1 AND is_active = 1"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], RawItem::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn list(&self, limit: usize, offset: usize) -> Result<Vec<KnowledgeItem>> {
    self.scan_active(limit.min(MAX_LIST_LIMIT), offset).await
  }

  async fn update(&self, id: i64, update: ItemUpdate) -> Result<bool> {
    if update.is_empty() {
      return Ok(false);
    }
    update.validate()?;

    let mut assignments = assignments(update)?;
    assignments.push(("updated_at", Value::Text(encode_dt(now()))));

    let set_clause = assignments
      .iter()
      .enumerate()
      .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "UPDATE knowledge_items SET {set_clause} WHERE id = ?{} AND is_active = 1",
      assignments.len() + 1
    );

    let mut values: Vec<Value> =
      assignments.into_iter().map(|(_, value)| value).collect();
    values.push(Value::Integer(id));

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&sql, rusqlite::params_from_iter(values))?)
      })
      .await?;

    Ok(affected > 0)
  }

  async fn delete(&self, id: i64) -> Result<bool> {
    let at_str = encode_dt(now());

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE knowledge_items SET is_active = 0, updated_at = ?1
           WHERE id = ?2 AND is_active = 1",
          rusqlite::params![at_str, id],
        )?)
      })
      .await?;

    Ok(affected > 0)
  }

  async fn search(&self, query: &str, limit: usize) -> Result<Vec<KnowledgeItem>> {
    // SQLite LIKE folds ASCII case only; non-ASCII text matches exactly.
    let pattern = like_pattern(query);
    let limit   = limit.min(MAX_SEARCH_LIMIT);

    self
      .query_items(
        "WHERE is_active = 1
           AND (title   LIKE ?1 ESCAPE '\\'
             OR content LIKE ?1 ESCAPE '\\'
             OR summary LIKE ?1 ESCAPE '\\')
         ORDER BY created_at DESC, id DESC
         LIMIT ?2",
        vec![Value::Text(pattern), Value::Integer(to_i64(limit))],
      )
      .await
  }

  async fn stats(&self) -> Result<KnowledgeStats> {
    let items = self.scan_active(STATS_SCAN_CAP, 0).await?;
    Ok(KnowledgeStats::from_items(&items))
  }

  // ── Processing log ────────────────────────────────────────────────────────

  async fn log_processing(&self, entry: NewLogEntry) -> Result<i64> {
    let item_id    = entry.knowledge_item_id;
    let status_str = entry.status.as_ref().to_owned();
    let at_str     = encode_dt(now());

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO processing_logs (
             knowledge_item_id, processing_type, input_text, output_text,
             processing_time_ms, status, error_message, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            item_id,
            entry.processing_type,
            entry.input_text,
            entry.output_text,
            entry.processing_time_ms,
            status_str,
            entry.error_message,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(id)
  }

  async fn processing_logs(&self, knowledge_item_id: i64) -> Result<Vec<ProcessingLogEntry>> {
    let raws: Vec<RawLogEntry> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {LOG_COLUMNS} FROM processing_logs
           WHERE knowledge_item_id = ?1
           ORDER BY id ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![knowledge_item_id], RawLogEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLogEntry::into_entry).collect()
  }
}
