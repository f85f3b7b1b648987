//! Aggregate statistics over the active items.

use std::{
  collections::{BTreeMap, HashMap},
  fmt,
};

use serde::{
  Deserialize, Deserializer, Serialize, Serializer,
  de::{MapAccess, Visitor},
  ser::SerializeMap,
};

use crate::item::{KnowledgeItem, SourceType};

/// Upper bound on the number of items scanned by a stats computation.
///
/// Totals for stores holding more active items than this are under-reported.
pub const STATS_SCAN_CAP: usize = 10_000;

/// How many tags [`KnowledgeStats::popular_tags`] keeps.
pub const POPULAR_TAG_COUNT: usize = 10;

/// One entry of the popular-tags ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
  pub tag:   String,
  pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeStats {
  pub total_items:  usize,
  pub source_types: BTreeMap<SourceType, usize>,
  /// Most frequent first; ties keep the order in which the tag was first
  /// seen during the scan. On the wire this is a `{tag: count}` object in
  /// ranking order.
  #[serde(with = "tag_map")]
  pub popular_tags: Vec<TagCount>,
}

impl KnowledgeStats {
  /// Tally `items` in scan order.
  pub fn from_items(items: &[KnowledgeItem]) -> Self {
    let mut source_types = BTreeMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for item in items {
      *source_types.entry(item.source_type).or_insert(0) += 1;

      for tag in item.tags.iter().flatten() {
        let count = counts.entry(tag.as_str()).or_insert(0);
        if *count == 0 {
          first_seen.push(tag.clone());
        }
        *count += 1;
      }
    }

    let mut popular_tags: Vec<TagCount> = first_seen
      .into_iter()
      .map(|tag| {
        let count = counts[tag.as_str()];
        TagCount { tag, count }
      })
      .collect();
    // Stable sort keeps first-occurrence order among equal counts.
    popular_tags.sort_by(|a, b| b.count.cmp(&a.count));
    popular_tags.truncate(POPULAR_TAG_COUNT);

    Self { total_items: items.len(), source_types, popular_tags }
  }
}

/// (De)serialises a ranking as an object whose key order is the ranking.
mod tag_map {
  use super::*;

  pub fn serialize<S: Serializer>(
    tags: &[TagCount],
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(tags.len()))?;
    for TagCount { tag, count } in tags {
      map.serialize_entry(tag, count)?;
    }
    map.end()
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Vec<TagCount>, D::Error> {
    struct RankingVisitor;

    impl<'de> Visitor<'de> for RankingVisitor {
      type Value = Vec<TagCount>;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of tag to count")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut out = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((tag, count)) = access.next_entry()? {
          out.push(TagCount { tag, count });
        }
        Ok(out)
      }
    }

    deserializer.deserialize_map(RankingVisitor)
  }
}
