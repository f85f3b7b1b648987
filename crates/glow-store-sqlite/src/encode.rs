//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical and chronological order agree.
//! Tags are stored as a compact JSON array, or `NULL` when absent.

use chrono::{DateTime, SecondsFormat, Utc};
use glow_core::{
  item::{KnowledgeItem, SourceType},
  log::{ProcessingLogEntry, ProcessingStatus},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current instant, truncated to what the column can hold so that the
/// value handed back to callers equals the value read back later.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  // Round-trip through the column encoding; cannot fail for our own output.
  decode_dt(&encode_dt(now)).unwrap_or(now)
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: Option<&[String]>) -> Result<Option<String>> {
  Ok(tags.map(serde_json::to_string).transpose()?)
}

pub fn decode_tags(s: Option<&str>) -> Result<Option<Vec<String>>> {
  Ok(s.map(serde_json::from_str).transpose()?)
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Wrap `query` in `%…%`, escaping LIKE metacharacters with `\`.
/// Pair with `ESCAPE '\'` in the SQL.
pub fn like_pattern(query: &str) -> String {
  let mut out = String::with_capacity(query.len() + 2);
  out.push('%');
  for c in query.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawItem::from_row`].
pub const ITEM_COLUMNS: &str = "id, title, content, source_type, source_url, \
                                tags, summary, ai_analysis, created_at, \
                                updated_at, is_active";

/// Raw values read directly from a `knowledge_items` row.
pub struct RawItem {
  pub id:          i64,
  pub title:       String,
  pub content:     String,
  pub source_type: String,
  pub source_url:  Option<String>,
  pub tags:        Option<String>,
  pub summary:     Option<String>,
  pub ai_analysis: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
  pub is_active:   bool,
}

impl RawItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      title:       row.get(1)?,
      content:     row.get(2)?,
      source_type: row.get(3)?,
      source_url:  row.get(4)?,
      tags:        row.get(5)?,
      summary:     row.get(6)?,
      ai_analysis: row.get(7)?,
      created_at:  row.get(8)?,
      updated_at:  row.get(9)?,
      is_active:   row.get(10)?,
    })
  }

  pub fn into_item(self) -> Result<KnowledgeItem> {
    Ok(KnowledgeItem {
      id:          self.id,
      title:       self.title,
      content:     self.content,
      source_type: SourceType::parse(&self.source_type)?,
      source_url:  self.source_url,
      tags:        decode_tags(self.tags.as_deref())?,
      summary:     self.summary,
      ai_analysis: self.ai_analysis,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
      is_active:   self.is_active,
    })
  }
}

/// Column list matching [`RawLogEntry::from_row`].
pub const LOG_COLUMNS: &str = "id, knowledge_item_id, processing_type, \
                               input_text, output_text, processing_time_ms, \
                               status, error_message, created_at";

/// Raw values read directly from a `processing_logs` row.
pub struct RawLogEntry {
  pub id:                 i64,
  pub knowledge_item_id:  i64,
  pub processing_type:    String,
  pub input_text:         String,
  pub output_text:        String,
  pub processing_time_ms: i64,
  pub status:             String,
  pub error_message:      Option<String>,
  pub created_at:         String,
}

impl RawLogEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get(0)?,
      knowledge_item_id:  row.get(1)?,
      processing_type:    row.get(2)?,
      input_text:         row.get(3)?,
      output_text:        row.get(4)?,
      processing_time_ms: row.get(5)?,
      status:             row.get(6)?,
      error_message:      row.get(7)?,
      created_at:         row.get(8)?,
    })
  }

  pub fn into_entry(self) -> Result<ProcessingLogEntry> {
    Ok(ProcessingLogEntry {
      id:                 self.id,
      knowledge_item_id:  self.knowledge_item_id,
      processing_type:    self.processing_type,
      input_text:         self.input_text,
      output_text:        self.output_text,
      processing_time_ms: self.processing_time_ms,
      status:             ProcessingStatus::parse(&self.status)?,
      error_message:      self.error_message,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let whole = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    let fractional = DateTime::parse_from_rfc3339("2026-01-01T00:00:00.5Z")
      .unwrap()
      .with_timezone(&Utc);
    assert_eq!(encode_dt(whole), "2026-01-01T00:00:00.000000Z");
    assert!(encode_dt(whole) < encode_dt(fractional));
  }

  #[test]
  fn like_pattern_escapes_metacharacters() {
    assert_eq!(like_pattern("rust"), "%rust%");
    assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
  }

  #[test]
  fn absent_and_empty_tags_stay_distinct() {
    let empty: Vec<String> = Vec::new();
    assert_eq!(encode_tags(None).unwrap(), None);
    assert_eq!(encode_tags(Some(empty.as_slice())).unwrap().as_deref(), Some("[]"));
    assert_eq!(decode_tags(None).unwrap(), None);
    assert_eq!(decode_tags(Some("[]")).unwrap(), Some(vec![]));
  }
}
