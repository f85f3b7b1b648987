//! Heuristic content analysis.
//!
//! The analysis is keyword-driven and makes no claim to understand the text.
//! Both heuristics are plain data: [`TAG_RULES`] maps keyword sets to tags in
//! a fixed evaluation order, and [`NARRATIVE_RULES`] picks the topic clause
//! of the narrative by priority. Swap the tables with
//! [`KeywordAnalyzer::with_rules`] to change behaviour without touching the
//! control flow.

use serde::{Deserialize, Serialize};

// ─── Rule tables ─────────────────────────────────────────────────────────────

/// A tag and the substrings (lowercase) that trigger it.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
  pub tag:      &'static str,
  pub keywords: &'static [&'static str],
}

/// A narrative topic clause and the substrings (lowercase) that select it.
#[derive(Debug, Clone, Copy)]
pub struct NarrativeRule {
  pub triggers: &'static [&'static str],
  pub clause:   &'static str,
}

pub const TAG_RULES: &[TagRule] = &[
  TagRule {
    tag:      "AI",
    keywords: &["ai", "artificial intelligence", "machine learning", "ml"],
  },
  TagRule {
    tag:      "Development",
    keywords: &["python", "javascript", "programming", "code", "development"],
  },
  TagRule { tag: "Database", keywords: &["database", "sql", "data"] },
  TagRule { tag: "Web", keywords: &["web", "http", "api", "rest"] },
  TagRule { tag: "Research", keywords: &["research", "study", "analysis"] },
];

/// Used instead of rule tags when no rule matches.
pub const FALLBACK_TAGS: &[&str] = &["General", "Knowledge"];

/// Highest priority first; evaluated independently of the collected tags.
pub const NARRATIVE_RULES: &[NarrativeRule] = &[
  NarrativeRule {
    triggers: &["ai", "artificial intelligence"],
    clause:   "artificial intelligence concepts and applications.",
  },
  NarrativeRule {
    triggers: &["development", "programming"],
    clause:   "software development practices and methodologies.",
  },
  NarrativeRule {
    triggers: &["database"],
    clause:   "database design and management principles.",
  },
];

pub const FALLBACK_CLAUSE: &str = "general knowledge and information.";

/// Summaries never exceed this many words.
pub const MAX_SUMMARY_WORDS: usize = 50;

/// Appended to a summary when words were dropped.
pub const ELLIPSIS: &str = "...";

// ─── Analysis ────────────────────────────────────────────────────────────────

/// Metadata derived from a piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
  pub summary:  String,
  pub tags:     Vec<String>,
  pub analysis: String,
}

/// Something that derives [`Analysis`] from plain text.
///
/// Implementations must be deterministic and must not fail; rejecting input
/// that is too short is the caller's job.
pub trait Analyzer: Send + Sync {
  fn analyze(&self, text: &str) -> Analysis;
}

/// The table-driven keyword analyzer.
#[derive(Debug, Clone, Copy)]
pub struct KeywordAnalyzer {
  tag_rules:       &'static [TagRule],
  narrative_rules: &'static [NarrativeRule],
}

impl Default for KeywordAnalyzer {
  fn default() -> Self { Self::with_rules(TAG_RULES, NARRATIVE_RULES) }
}

impl KeywordAnalyzer {
  pub fn with_rules(
    tag_rules: &'static [TagRule],
    narrative_rules: &'static [NarrativeRule],
  ) -> Self {
    Self { tag_rules, narrative_rules }
  }

  /// Tags for `lower` (already lowercased), in rule order, each at most once.
  pub fn tags(&self, lower: &str) -> Vec<String> {
    let tags: Vec<String> = self
      .tag_rules
      .iter()
      .filter(|rule| contains_any(lower, rule.keywords))
      .map(|rule| rule.tag.to_owned())
      .collect();

    if tags.is_empty() {
      FALLBACK_TAGS.iter().map(|t| (*t).to_owned()).collect()
    } else {
      tags
    }
  }

  /// The topic clause for `lower` (already lowercased).
  pub fn topic_clause(&self, lower: &str) -> &'static str {
    self
      .narrative_rules
      .iter()
      .find(|rule| contains_any(lower, rule.triggers))
      .map_or(FALLBACK_CLAUSE, |rule| rule.clause)
  }
}

impl Analyzer for KeywordAnalyzer {
  fn analyze(&self, text: &str) -> Analysis {
    let words: Vec<&str> = text.split_whitespace().collect();
    let lower = text.to_lowercase();

    let tags = self.tags(&lower);
    let analysis = format!(
      "This content appears to be about {}. The text contains approximately {} \
       words and covers {}",
      tags.join(", ").to_lowercase(),
      words.len(),
      self.topic_clause(&lower),
    );

    Analysis { summary: summarize(&words), tags, analysis }
  }
}

/// The first `min(50, words / 3)` words, with [`ELLIPSIS`] if any were
/// dropped. Texts under three words therefore summarise to the bare ellipsis.
pub fn summarize(words: &[&str]) -> String {
  let keep = MAX_SUMMARY_WORDS.min(words.len() / 3);
  let mut summary = words[..keep].join(" ");
  if words.len() > keep {
    summary.push_str(ELLIPSIS);
  }
  summary
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
  needles.iter().any(|needle| haystack.contains(needle))
}
