//! Pipeline settings, deserialised as part of the server configuration.

use std::time::Duration;

use serde::Deserialize;

/// Client identity sent with every outbound fetch.
pub const DEFAULT_USER_AGENT: &str =
  "KnowledgeGlow/1.0 (Knowledge Management Bot)";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
  /// Upper bound on a single URL fetch.
  pub fetch_timeout_secs:   u64,
  /// Extracted page text is cut to this many characters.
  pub max_extract_chars:    usize,
  /// Reading a fetched body stops after this many bytes.
  pub max_fetch_bytes:      usize,
  pub user_agent:           String,
  /// Artificial delay added after analysis; zero disables it.
  pub simulated_latency_ms: u64,
}

impl PipelineConfig {
  pub fn fetch_timeout(&self) -> Duration {
    Duration::from_secs(self.fetch_timeout_secs)
  }

  pub fn simulated_latency(&self) -> Duration {
    Duration::from_millis(self.simulated_latency_ms)
  }
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      fetch_timeout_secs:   10,
      max_extract_chars:    5000,
      max_fetch_bytes:      2 * 1024 * 1024,
      user_agent:           DEFAULT_USER_AGENT.to_owned(),
      simulated_latency_ms: 0,
    }
  }
}
