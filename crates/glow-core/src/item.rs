//! Knowledge items — the stored unit of content plus its derived metadata.
//!
//! Items are created once, mutated through [`ItemUpdate`], and retired by a
//! soft delete that flips `is_active`. Inactive items are invisible to every
//! read path.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

// ─── Source type ─────────────────────────────────────────────────────────────

/// The origin kind of an item's content. Fixed at creation.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceType {
  #[default]
  Text,
  Url,
  File,
}

impl SourceType {
  /// Parse the lowercase discriminant stored in the `source_type` column.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownSourceType(s.to_owned()))
  }
}

// ─── KnowledgeItem ───────────────────────────────────────────────────────────

/// A stored knowledge item as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
  pub id:          i64,
  pub title:       String,
  pub content:     String,
  pub source_type: SourceType,
  pub source_url:  Option<String>,
  /// `None` and an empty list are both representable; callers treat them
  /// the same.
  pub tags:        Option<Vec<String>>,
  pub summary:     Option<String>,
  pub ai_analysis: Option<String>,
  /// Server-assigned; never changes after creation.
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  pub is_active:   bool,
}

// ─── NewKnowledgeItem ────────────────────────────────────────────────────────

/// Input to [`crate::store::KnowledgeStore::create`].
/// `id`, timestamps and `is_active` are always set by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewKnowledgeItem {
  pub title:       String,
  pub content:     String,
  #[serde(default)]
  pub source_type: SourceType,
  #[serde(default)]
  pub source_url:  Option<String>,
  #[serde(default)]
  pub tags:        Option<Vec<String>>,
  #[serde(default)]
  pub summary:     Option<String>,
  #[serde(default)]
  pub ai_analysis: Option<String>,
}

impl NewKnowledgeItem {
  /// Convenience constructor for a plain-text item with no derived metadata.
  pub fn text(title: impl Into<String>, content: impl Into<String>) -> Self {
    Self {
      title:       title.into(),
      content:     content.into(),
      source_type: SourceType::Text,
      source_url:  None,
      tags:        None,
      summary:     None,
      ai_analysis: None,
    }
  }

  /// Reject blank titles and content.
  pub fn validate(&self) -> Result<()> {
    require_text("title", &self.title)?;
    require_text("content", &self.content)
  }
}

// ─── ItemUpdate ──────────────────────────────────────────────────────────────

/// A partial update: one optional slot per mutable column.
///
/// `source_type`, `id` and `created_at` have no slot and therefore cannot be
/// changed. A `None` slot leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
  #[serde(default)]
  pub title:       Option<String>,
  #[serde(default)]
  pub content:     Option<String>,
  #[serde(default)]
  pub source_url:  Option<String>,
  #[serde(default)]
  pub tags:        Option<Vec<String>>,
  #[serde(default)]
  pub summary:     Option<String>,
  #[serde(default)]
  pub ai_analysis: Option<String>,
}

impl ItemUpdate {
  /// `true` when no slot is filled.
  pub fn is_empty(&self) -> bool {
    self.title.is_none()
      && self.content.is_none()
      && self.source_url.is_none()
      && self.tags.is_none()
      && self.summary.is_none()
      && self.ai_analysis.is_none()
  }

  /// Reject updates that would blank out the title or content.
  pub fn validate(&self) -> Result<()> {
    if let Some(title) = &self.title {
      require_text("title", title)?;
    }
    if let Some(content) = &self.content {
      require_text("content", content)?;
    }
    Ok(())
  }
}

fn require_text(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::InvalidInput(format!("{field} must not be empty")));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn source_type_parses_lowercase_discriminants() {
    assert_eq!(SourceType::parse("text").unwrap(), SourceType::Text);
    assert_eq!(SourceType::parse("url").unwrap(), SourceType::Url);
    assert_eq!(SourceType::parse("file").unwrap(), SourceType::File);
    assert!(matches!(
      SourceType::parse("pdf"),
      Err(Error::UnknownSourceType(s)) if s == "pdf"
    ));
    assert_eq!(SourceType::Url.to_string(), "url");
    assert_eq!(SourceType::File.as_ref(), "file");
  }

  #[test]
  fn source_type_defaults_to_text_when_missing() {
    let body: NewKnowledgeItem =
      serde_json::from_str(r#"{"title":"t","content":"c"}"#).unwrap();
    assert_eq!(body.source_type, SourceType::Text);
    assert!(body.tags.is_none());
  }

  #[test]
  fn blank_title_is_rejected() {
    let item = NewKnowledgeItem::text("   ", "body");
    assert!(matches!(item.validate(), Err(Error::InvalidInput(_))));
  }

  #[test]
  fn empty_update_is_detected() {
    assert!(ItemUpdate::default().is_empty());
    let update = ItemUpdate { summary: Some("s".into()), ..Default::default() };
    assert!(!update.is_empty());
  }

  #[test]
  fn unknown_update_fields_are_ignored() {
    let update: ItemUpdate =
      serde_json::from_str(r#"{"source_type":"url","is_active":false}"#)
        .unwrap();
    assert!(update.is_empty());
  }
}
