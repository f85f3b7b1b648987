//! Error type for `glow-pipeline`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
  /// The request named no usable source payload.
  #[error("no valid content provided")]
  NoContent,

  /// Extracted text, trimmed, is below the minimum length.
  #[error("content too short for processing")]
  ContentTooShort,

  /// The URL is malformed or lacks a scheme or host.
  #[error("invalid source URL {url:?}: {reason}")]
  InvalidSource { url: String, reason: String },

  /// Transport failure or non-success status while fetching a URL.
  #[error("failed to fetch {url}: {source}")]
  Fetch {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),
}

impl PipelineError {
  /// `true` for errors caused by the request itself rather than by the
  /// outside world.
  pub fn is_client_error(&self) -> bool {
    matches!(
      self,
      Self::NoContent | Self::ContentTooShort | Self::InvalidSource { .. }
    )
  }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
