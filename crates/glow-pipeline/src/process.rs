//! The processing orchestrator: validate → extract → analyse, timed.

use std::time::{Duration, Instant};

use glow_core::{item::SourceType, log::ProcessingStatus};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::{
  Analysis, Analyzer, ContentExtractor, ContentSource, KeywordAnalyzer,
  PipelineConfig, PipelineError, Result,
};

/// Extracted text shorter than this (after trimming) is rejected.
pub const MIN_CONTENT_CHARS: usize = 10;

// ─── Request / result ────────────────────────────────────────────────────────

/// A request to process content. Only the payload matching `source_type` is
/// read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
  #[serde(default)]
  pub text:        String,
  #[serde(default)]
  pub url:         String,
  #[serde(default)]
  pub source_type: SourceType,
}

impl ProcessRequest {
  pub fn text(text: impl Into<String>) -> Self {
    Self { text: text.into(), ..Default::default() }
  }

  pub fn url(url: impl Into<String>) -> Self {
    Self { url: url.into(), source_type: SourceType::Url, ..Default::default() }
  }

  /// The source named by `source_type`, or [`PipelineError::NoContent`] if
  /// its payload is empty. File sources carry no payload here.
  pub fn source(&self) -> Result<ContentSource> {
    match self.source_type {
      SourceType::Text if !self.text.is_empty() => {
        Ok(ContentSource::Text(self.text.clone()))
      }
      SourceType::Url if !self.url.is_empty() => {
        Ok(ContentSource::Url(self.url.clone()))
      }
      _ => Err(PipelineError::NoContent),
    }
  }

  /// The raw payload, as recorded in processing logs.
  pub fn payload(&self) -> &str {
    match self.source_type {
      SourceType::Url => &self.url,
      _ => &self.text,
    }
  }
}

/// The envelope returned for every request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
  pub summary:            String,
  pub tags:               Vec<String>,
  pub analysis:           String,
  pub status:             ProcessingStatus,
  /// Empty on success.
  pub error:              String,
  pub processing_time_ms: u64,
}

impl ProcessingResult {
  pub fn success(analysis: Analysis, processing_time_ms: u64) -> Self {
    Self {
      summary: analysis.summary,
      tags: analysis.tags,
      analysis: analysis.analysis,
      status: ProcessingStatus::Success,
      error: String::new(),
      processing_time_ms,
    }
  }

  pub fn failed(error: impl Into<String>, processing_time_ms: u64) -> Self {
    Self {
      summary: String::new(),
      tags: Vec::new(),
      analysis: String::new(),
      status: ProcessingStatus::Error,
      error: error.into(),
      processing_time_ms,
    }
  }

  pub fn is_success(&self) -> bool { self.status == ProcessingStatus::Success }
}

// ─── Processor ───────────────────────────────────────────────────────────────

/// Runs the pipeline. Holds no per-request state, so one instance serves
/// any number of concurrent requests.
pub struct Processor {
  extractor: ContentExtractor,
  analyzer:  Box<dyn Analyzer>,
  latency:   Duration,
}

impl Processor {
  /// A processor using the default [`KeywordAnalyzer`].
  pub fn new(config: &PipelineConfig) -> Result<Self> {
    Ok(Self {
      extractor: ContentExtractor::new(config)?,
      analyzer:  Box::new(KeywordAnalyzer::default()),
      latency:   config.simulated_latency(),
    })
  }

  /// Replace the analyzer.
  pub fn with_analyzer(mut self, analyzer: impl Analyzer + 'static) -> Self {
    self.analyzer = Box::new(analyzer);
    self
  }

  /// Process `request`.
  ///
  /// `Err` is reserved for problems with the request itself: no content,
  /// a malformed URL, or text that is too short. Anything that goes wrong
  /// afterwards (e.g. the fetch fails) comes back as an `Ok` envelope with
  /// [`ProcessingStatus::Error`].
  #[instrument(skip_all, fields(source_type = %request.source_type))]
  pub async fn process(&self, request: &ProcessRequest) -> Result<ProcessingResult> {
    let source = request.source()?;
    let started = Instant::now();

    let text = match self.extractor.extract(source).await {
      Ok(text) => text,
      Err(e) if e.is_client_error() => return Err(e),
      Err(e) => {
        warn!(error = %e, "content extraction failed");
        return Ok(ProcessingResult::failed(e.to_string(), elapsed_ms(started)));
      }
    };

    if text.trim().chars().count() < MIN_CONTENT_CHARS {
      return Err(PipelineError::ContentTooShort);
    }

    let analysis = self.analyzer.analyze(&text);
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }

    Ok(ProcessingResult::success(analysis, elapsed_ms(started)))
  }
}

fn elapsed_ms(started: Instant) -> u64 {
  u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
  use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

  use super::*;

  fn processor() -> Processor {
    Processor::new(&PipelineConfig::default()).unwrap()
  }

  #[tokio::test]
  async fn text_request_is_analysed() {
    let result = processor()
      .process(&ProcessRequest::text(
        "This project uses Python and a SQL database for web APIs",
      ))
      .await
      .unwrap();

    assert!(result.is_success());
    assert_eq!(result.tags, ["Development", "Database", "Web"]);
    assert_eq!(result.summary, "This project uses...");
    assert!(result.error.is_empty());
  }

  #[tokio::test]
  async fn short_text_is_rejected() {
    let err = processor().process(&ProcessRequest::text("hi")).await.unwrap_err();
    assert!(matches!(err, PipelineError::ContentTooShort));
  }

  #[tokio::test]
  async fn length_is_checked_after_trimming() {
    let err = processor()
      .process(&ProcessRequest::text("   short    "))
      .await
      .unwrap_err();
    assert!(matches!(err, PipelineError::ContentTooShort));
  }

  #[tokio::test]
  async fn missing_payload_is_no_content() {
    let p = processor();
    for request in [
      ProcessRequest::text(""),
      ProcessRequest::url(""),
      // A text payload does not satisfy a url request.
      ProcessRequest { text: "plenty of text here".into(), ..ProcessRequest::url("") },
      ProcessRequest { source_type: SourceType::File, ..ProcessRequest::text("file body text") },
    ] {
      let err = p.process(&request).await.unwrap_err();
      assert!(matches!(err, PipelineError::NoContent), "{request:?}");
    }
  }

  #[tokio::test]
  async fn malformed_url_is_rejected_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200))
      .expect(0)
      .mount(&server)
      .await;

    // Both name the mock server's socket but fail validation: one has no
    // scheme, the other has no host.
    let addr = server.address();
    let p = processor();
    for raw in [format!("{addr}/article"), format!("mailto:reader@{addr}")] {
      let err = p.process(&ProcessRequest::url(raw.clone())).await.unwrap_err();
      assert!(matches!(err, PipelineError::InvalidSource { .. }), "{raw}");
    }
    server.verify().await;
  }

  #[tokio::test]
  async fn fetch_failure_returns_error_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let result = processor()
      .process(&ProcessRequest::url(server.uri()))
      .await
      .unwrap();

    assert_eq!(result.status, ProcessingStatus::Error);
    assert!(result.summary.is_empty());
    assert!(result.tags.is_empty());
    assert!(result.analysis.is_empty());
    assert!(!result.error.is_empty());
  }

  #[tokio::test]
  async fn fetched_page_is_analysed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string(
        "<html><body><h1>AI models</h1><p>A study of machine learning.</p></body></html>",
      ))
      .mount(&server)
      .await;

    let result = processor()
      .process(&ProcessRequest::url(server.uri()))
      .await
      .unwrap();

    assert!(result.is_success());
    assert_eq!(result.tags, ["AI", "Research"]);
    assert!(result.analysis.ends_with("artificial intelligence concepts and applications."));
  }

  #[tokio::test]
  async fn simulated_latency_is_reflected_in_timing() {
    let config = PipelineConfig { simulated_latency_ms: 50, ..Default::default() };
    let result = Processor::new(&config)
      .unwrap()
      .process(&ProcessRequest::text("a reasonably long piece of text"))
      .await
      .unwrap();
    assert!(result.processing_time_ms >= 50);
  }

  #[tokio::test]
  async fn custom_analyzer_is_used() {
    struct Fixed;
    impl Analyzer for Fixed {
      fn analyze(&self, _text: &str) -> Analysis {
        Analysis {
          summary:  "fixed".into(),
          tags:     vec!["Fixed".into()],
          analysis: "fixed".into(),
        }
      }
    }

    let result = processor()
      .with_analyzer(Fixed)
      .process(&ProcessRequest::text("anything long enough"))
      .await
      .unwrap();
    assert_eq!(result.tags, ["Fixed"]);
  }

  #[test]
  fn result_serialises_like_the_wire_envelope() {
    let json = serde_json::to_value(ProcessingResult::failed("boom", 3)).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"], "boom");
    assert_eq!(json["tags"], serde_json::json!([]));
  }
}
