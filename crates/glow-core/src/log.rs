//! Processing log — the append-only audit trail of analysis attempts.
//!
//! Entries reference a knowledge item weakly: soft-deleting the item leaves
//! its entries in place.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// Outcome of one processing attempt.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProcessingStatus {
  #[default]
  Success,
  Error,
}

impl ProcessingStatus {
  /// Parse the discriminant stored in the `status` column.
  pub fn parse(s: &str) -> Result<Self> {
    Self::from_str(s).map_err(|_| Error::UnknownStatus(s.to_owned()))
  }
}

/// A persisted log entry. Never mutated after insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingLogEntry {
  pub id:                 i64,
  pub knowledge_item_id:  i64,
  /// Free-text label of the operation, e.g. `"summarize"`.
  pub processing_type:    String,
  pub input_text:         String,
  pub output_text:        String,
  pub processing_time_ms: i64,
  pub status:             ProcessingStatus,
  /// Populated when `status` is [`ProcessingStatus::Error`].
  pub error_message:      Option<String>,
  pub created_at:         DateTime<Utc>,
}

/// Input to [`crate::store::KnowledgeStore::log_processing`].
#[derive(Debug, Clone)]
pub struct NewLogEntry {
  pub knowledge_item_id:  i64,
  pub processing_type:    String,
  pub input_text:         String,
  pub output_text:        String,
  pub processing_time_ms: i64,
  pub status:             ProcessingStatus,
  pub error_message:      Option<String>,
}

impl NewLogEntry {
  /// A successful attempt with no error message.
  pub fn success(
    knowledge_item_id: i64,
    processing_type: impl Into<String>,
    input_text: impl Into<String>,
    output_text: impl Into<String>,
    processing_time_ms: i64,
  ) -> Self {
    Self {
      knowledge_item_id,
      processing_type: processing_type.into(),
      input_text: input_text.into(),
      output_text: output_text.into(),
      processing_time_ms,
      status: ProcessingStatus::Success,
      error_message: None,
    }
  }
}
