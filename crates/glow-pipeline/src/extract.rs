//! Content extraction: inline text passes through, URLs are fetched and
//! reduced to plain text.
//!
//! Markup removal is a single regex pass, not an HTML parser. Entities and
//! malformed markup come through as-is.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::{PipelineConfig, PipelineError, Result};

/// Appended when extracted text is truncated.
pub const TRUNCATION_MARKER: &str = "...";

/// Where the content to process comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
  Text(String),
  Url(String),
}

/// Fetches and cleans source content.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ContentExtractor {
  client:    Client,
  max_chars: usize,
  max_bytes: usize,
}

impl ContentExtractor {
  pub fn new(config: &PipelineConfig) -> Result<Self> {
    let client = Client::builder()
      .user_agent(config.user_agent.as_str())
      .timeout(config.fetch_timeout())
      .build()
      .map_err(PipelineError::Client)?;
    Ok(Self {
      client,
      max_chars: config.max_extract_chars,
      max_bytes: config.max_fetch_bytes,
    })
  }

  /// Produce plain text for `source`. Text is returned unchanged; a URL
  /// costs exactly one outbound request.
  pub async fn extract(&self, source: ContentSource) -> Result<String> {
    match source {
      ContentSource::Text(text) => Ok(text),
      ContentSource::Url(raw) => self.fetch(&raw).await,
    }
  }

  #[instrument(skip(self))]
  async fn fetch(&self, raw: &str) -> Result<String> {
    let url = parse_source_url(raw)?;
    let fetch_err =
      |source: reqwest::Error| PipelineError::Fetch { url: raw.to_owned(), source };

    debug!("fetching source content");
    let mut response = self
      .client
      .get(url)
      .send()
      .await
      .and_then(reqwest::Response::error_for_status)
      .map_err(fetch_err)?;

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(fetch_err)? {
      let room = self.max_bytes - body.len();
      if chunk.len() >= room {
        body.extend_from_slice(&chunk[..room]);
        debug!(limit = self.max_bytes, "fetched body reached the read limit");
        break;
      }
      body.extend_from_slice(&chunk);
    }
    debug!(bytes = body.len(), "fetched source content");

    // A cut at the byte limit may split a character; it decodes as U+FFFD.
    let body = String::from_utf8_lossy(&body);
    Ok(truncate_chars(strip_markup(&body), self.max_chars))
  }
}

/// Validate that `raw` is an absolute URL with a host.
pub fn parse_source_url(raw: &str) -> Result<Url> {
  let invalid = |reason: String| PipelineError::InvalidSource {
    url: raw.to_owned(),
    reason,
  };

  let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
  match url.host_str() {
    Some(host) if !host.is_empty() => Ok(url),
    _ => Err(invalid("missing host".to_owned())),
  }
}

/// Replace tags with spaces, collapse whitespace runs and trim.
pub fn strip_markup(html: &str) -> String {
  static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
  static WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

  let without_tags = TAG_RE.replace_all(html, " ");
  WS_RE.replace_all(&without_tags, " ").trim().to_owned()
}

/// Keep at most `max` characters, appending [`TRUNCATION_MARKER`] when
/// anything was cut.
pub fn truncate_chars(text: String, max: usize) -> String {
  match text.char_indices().nth(max) {
    Some((cut, _)) => {
      let mut out = text[..cut].to_owned();
      out.push_str(TRUNCATION_MARKER);
      out
    }
    None => text,
  }
}

#[cfg(test)]
mod tests {
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
  };

  use super::*;
  use crate::config::DEFAULT_USER_AGENT;

  fn extractor() -> ContentExtractor {
    ContentExtractor::new(&PipelineConfig::default()).unwrap()
  }

  #[test]
  fn strip_markup_removes_tags_and_collapses_whitespace() {
    let html = "<html>\n<body><h1>Title</h1>\n\n<p>Some   <b>bold</b>\ttext</p></body></html>";
    assert_eq!(strip_markup(html), "Title Some bold text");
  }

  #[test]
  fn strip_markup_leaves_entities_alone() {
    assert_eq!(strip_markup("<p>a &amp; b</p>"), "a &amp; b");
  }

  #[test]
  fn truncate_appends_marker_only_when_cut() {
    assert_eq!(truncate_chars("abcdef".into(), 6), "abcdef");
    assert_eq!(truncate_chars("abcdefg".into(), 6), "abcdef...");
  }

  #[test]
  fn truncate_counts_characters_not_bytes() {
    assert_eq!(truncate_chars("ééé".into(), 2), "éé...");
  }

  #[test]
  fn source_url_requires_scheme_and_host() {
    assert!(parse_source_url("https://example.com/page").is_ok());
    for bad in ["not-a-url", "example.com/page", "mailto:someone@example.com"] {
      assert!(
        matches!(parse_source_url(bad), Err(PipelineError::InvalidSource { .. })),
        "{bad} should be rejected"
      );
    }
  }

  #[tokio::test]
  async fn text_source_is_returned_unchanged() {
    let text = "  keep   <b>this</b> exactly  ".to_owned();
    let out = extractor().extract(ContentSource::Text(text.clone())).await.unwrap();
    assert_eq!(out, text);
  }

  #[tokio::test]
  async fn url_source_is_fetched_and_cleaned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/article"))
      .and(header("user-agent", DEFAULT_USER_AGENT))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_string("<html><body><p>Hello</p>\n<p>world</p></body></html>"),
      )
      .expect(1)
      .mount(&server)
      .await;

    let out = extractor()
      .extract(ContentSource::Url(format!("{}/article", server.uri())))
      .await
      .unwrap();
    assert_eq!(out, "Hello world");
  }

  #[tokio::test]
  async fn long_pages_are_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(6000)))
      .mount(&server)
      .await;

    let out = extractor()
      .extract(ContentSource::Url(server.uri()))
      .await
      .unwrap();
    assert_eq!(out.chars().count(), 5000 + TRUNCATION_MARKER.len());
    assert!(out.ends_with(TRUNCATION_MARKER));
  }

  #[tokio::test]
  async fn body_reading_stops_at_byte_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string("y".repeat(100_000)))
      .mount(&server)
      .await;

    let config = PipelineConfig { max_fetch_bytes: 64, ..Default::default() };
    let out = ContentExtractor::new(&config)
      .unwrap()
      .extract(ContentSource::Url(server.uri()))
      .await
      .unwrap();
    assert_eq!(out, "y".repeat(64));
  }

  #[tokio::test]
  async fn error_status_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let err = extractor()
      .extract(ContentSource::Url(format!("{}/missing", server.uri())))
      .await
      .unwrap_err();
    assert!(matches!(err, PipelineError::Fetch { .. }));
    assert!(!err.is_client_error());
  }
}
