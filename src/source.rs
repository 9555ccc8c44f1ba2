//! Source tags identifying which collector produced a record.
//!
//! Every record that enters the engine carries a tag naming the external
//! collector that fetched it. Tags are the unit of independence for
//! cross-source corroboration: two assertions corroborate each other only
//! if their tags differ.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized identifier of an external data collector.
///
/// Tags are trimmed and case-folded on construction so that `"Patents"`,
/// `"patents"`, and `" PATENTS "` count as the same source when computing
/// corroboration.
///
/// # Examples
///
/// ```
/// use corroborate::SourceTag;
///
/// let tag = SourceTag::new(" Patents ");
/// assert_eq!(tag.as_str(), "patents");
/// assert_eq!(tag, SourceTag::patents());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceTag(String);

impl SourceTag {
    /// Creates a tag from arbitrary collector text, trimming and
    /// case-folding it.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into().trim().to_ascii_lowercase())
    }

    /// Tag for patent-office collectors.
    #[must_use]
    pub fn patents() -> Self {
        Self("patents".to_string())
    }

    /// Tag for trade-registry collectors.
    #[must_use]
    pub fn trade_registry() -> Self {
        Self("trade_registry".to_string())
    }

    /// Tag for research-graph collectors.
    #[must_use]
    pub fn research_graph() -> Self {
        Self("research_graph".to_string())
    }

    /// Tag for procurement-record collectors.
    #[must_use]
    pub fn procurement() -> Self {
        Self("procurement".to_string())
    }

    /// Tag used by the registry itself for bookkeeping events (merges).
    #[must_use]
    pub fn registry() -> Self {
        Self("registry".to_string())
    }

    /// Tag for records of unknown origin.
    #[must_use]
    pub fn unknown() -> Self {
        Self("unknown".to_string())
    }

    /// Returns the normalized tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the tag carries no collector name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SourceTag {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for SourceTag {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_tag_normalizes() {
        let tag = SourceTag::new("  Trade_Registry ");
        assert_eq!(tag.as_str(), "trade_registry");
        assert_eq!(tag, SourceTag::trade_registry());
    }

    #[test]
    fn test_source_tag_empty() {
        assert!(SourceTag::new("   ").is_empty());
        assert!(!SourceTag::patents().is_empty());
    }

    #[test]
    fn test_source_tag_default_is_unknown() {
        assert_eq!(SourceTag::default(), SourceTag::unknown());
    }

    #[test]
    fn test_source_tag_display() {
        assert_eq!(format!("{}", SourceTag::patents()), "patents");
    }

    #[test]
    fn test_source_tag_serialization() {
        let tag = SourceTag::research_graph();
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"research_graph\"");
        let back: SourceTag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }

    #[test]
    fn test_distinct_casings_collapse() {
        assert_eq!(SourceTag::new("PATENTS"), SourceTag::new("patents"));
    }
}
