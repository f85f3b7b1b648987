//! Content-processing pipeline for KnowledgeGlow.
//!
//! - [`extract`] turns a text or URL source into bounded plain text.
//! - [`analyze`] derives a summary, tags and a narrative from plain text.
//! - [`process`] validates a request and runs both, timing the work.
//!
//! Nothing here touches the store; persisting results and logging attempts
//! is the caller's job.

pub mod analyze;
pub mod config;
pub mod error;
pub mod extract;
pub mod process;

pub use analyze::{Analysis, Analyzer, KeywordAnalyzer};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use extract::{ContentExtractor, ContentSource};
pub use process::{ProcessRequest, ProcessingResult, Processor};
