//! The resolution log: an immutable audit trail of deduplication decisions.
//!
//! Every fold of a raw name into an existing entity, and every merge of two
//! entities, appends one entry. Entries are never mutated after creation;
//! quality metrics are recomputed from the log, not maintained alongside it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::name::MatchMethod;

/// How a raw name was folded into a canonical entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// Normalized forms were identical.
    ExactNormalized,
    /// Fuzzy similarity met the threshold.
    Fuzzy,
    /// Two existing entities were merged.
    Merge,
}

impl From<MatchMethod> for ResolutionMethod {
    fn from(method: MatchMethod) -> Self {
        match method {
            MatchMethod::ExactNormalized => Self::ExactNormalized,
            MatchMethod::Fuzzy => Self::Fuzzy,
        }
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactNormalized => write!(f, "exact_normalized"),
            Self::Fuzzy => write!(f, "fuzzy"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// One immutable deduplication decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionLogEntry {
    /// The raw name (or absorbed canonical name, for merges).
    pub original_name: String,
    /// The canonical entity the name was folded into.
    pub entity_id: EntityId,
    /// The similarity score that justified the fold.
    pub similarity: f64,
    /// How the decision was reached.
    pub method: ResolutionMethod,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

impl ResolutionLogEntry {
    /// Entry for a raw name matched into an existing entity.
    #[must_use]
    pub(crate) fn matched(
        original_name: impl Into<String>,
        entity_id: EntityId,
        similarity: f64,
        method: MatchMethod,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            entity_id,
            similarity,
            method: method.into(),
            decided_at: Utc::now(),
        }
    }

    /// Entry for an entity merge.
    #[must_use]
    pub(crate) fn merged(
        absorbed_name: impl Into<String>,
        survivor: EntityId,
        similarity: f64,
    ) -> Self {
        Self {
            original_name: absorbed_name.into(),
            entity_id: survivor,
            similarity,
            method: ResolutionMethod::Merge,
            decided_at: Utc::now(),
        }
    }
}

/// Aggregate resolution-quality metrics computed from the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionStats {
    /// Folds decided by exact-normalized equality.
    pub exact_matches: usize,
    /// Folds decided by fuzzy similarity.
    pub fuzzy_matches: usize,
    /// Entity merges.
    pub merges: usize,
    /// Mean similarity across fuzzy folds (0.0 when there were none).
    pub mean_fuzzy_similarity: f64,
}

impl ResolutionStats {
    /// Computes stats over a log slice.
    #[must_use]
    pub fn from_log(log: &[ResolutionLogEntry]) -> Self {
        let mut stats = Self::default();
        let mut fuzzy_total = 0.0;
        for entry in log {
            match entry.method {
                ResolutionMethod::ExactNormalized => stats.exact_matches += 1,
                ResolutionMethod::Fuzzy => {
                    stats.fuzzy_matches += 1;
                    fuzzy_total += entry.similarity;
                }
                ResolutionMethod::Merge => stats.merges += 1,
            }
        }
        if stats.fuzzy_matches > 0 {
            #[allow(clippy::cast_precision_loss)]
            {
                stats.mean_fuzzy_similarity = fuzzy_total / stats.fuzzy_matches as f64;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_from_match() {
        let id = EntityId::new();
        let entry = ResolutionLogEntry::matched("ACME LTD", id, 1.0, MatchMethod::ExactNormalized);
        assert_eq!(entry.entity_id, id);
        assert_eq!(entry.method, ResolutionMethod::ExactNormalized);
        assert_eq!(entry.similarity, 1.0);
    }

    #[test]
    fn test_log_entry_from_merge() {
        let id = EntityId::new();
        let entry = ResolutionLogEntry::merged("Acme Holdings", id, 0.91);
        assert_eq!(entry.method, ResolutionMethod::Merge);
        assert_eq!(entry.original_name, "Acme Holdings");
    }

    #[test]
    fn test_stats_counts_per_method() {
        let id = EntityId::new();
        let log = vec![
            ResolutionLogEntry::matched("a", id, 1.0, MatchMethod::ExactNormalized),
            ResolutionLogEntry::matched("b", id, 0.9, MatchMethod::Fuzzy),
            ResolutionLogEntry::matched("c", id, 0.86, MatchMethod::Fuzzy),
            ResolutionLogEntry::merged("d", id, 0.95),
        ];

        let stats = ResolutionStats::from_log(&log);
        assert_eq!(stats.exact_matches, 1);
        assert_eq!(stats.fuzzy_matches, 2);
        assert_eq!(stats.merges, 1);
        assert!((stats.mean_fuzzy_similarity - 0.88).abs() < 1e-9);
    }

    #[test]
    fn test_stats_empty_log() {
        let stats = ResolutionStats::from_log(&[]);
        assert_eq!(stats, ResolutionStats::default());
        assert_eq!(stats.mean_fuzzy_similarity, 0.0);
    }

    #[test]
    fn test_method_display() {
        assert_eq!(format!("{}", ResolutionMethod::Fuzzy), "fuzzy");
        assert_eq!(format!("{}", ResolutionMethod::Merge), "merge");
    }

    #[test]
    fn test_log_entry_serialization() {
        let entry = ResolutionLogEntry::matched(
            "Acme",
            EntityId::new(),
            0.87,
            MatchMethod::Fuzzy,
        );
        let json = serde_json::to_string(&entry).unwrap();
        let back: ResolutionLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
