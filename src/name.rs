//! Name normalization and fuzzy matching.
//!
//! This is the pure decision core the registry delegates to: canonicalize a
//! free-text organization name, score the similarity of two names, and pick
//! the best existing candidate for a new record. No state, no persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::error::ConfigurationError;

/// Default fuzzy-match threshold (reference behavior).
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Corporate legal-form tokens stripped during normalization.
const DEFAULT_SUFFIXES: &[&str] = &[
    "ltd", "limited", "inc", "incorporated", "corp", "corporation", "co", "company", "llc",
    "llp", "lp", "plc", "gmbh", "ag", "kg", "sa", "sarl", "srl", "spa", "bv", "nv", "ab",
    "oy", "as", "kk", "pte", "pty",
];

/// Canonicalizes free-text names.
///
/// Normalization case-folds, strips punctuation, drops corporate-suffix
/// tokens, and collapses whitespace. It is idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
///
/// # Examples
///
/// ```
/// use corroborate::NameNormalizer;
///
/// let normalizer = NameNormalizer::default();
/// assert_eq!(
///     normalizer.normalize("China Shipping Development Co., Ltd."),
///     "china shipping development"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    suffixes: Vec<String>,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_SUFFIXES.iter().map(|s| (*s).to_string()))
    }
}

impl NameNormalizer {
    /// Creates a normalizer with a custom suffix set. Suffix tokens are
    /// themselves case-folded.
    #[must_use]
    pub fn new(suffixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Normalizes a name to its canonical comparison form.
    #[must_use]
    pub fn normalize(&self, name: &str) -> String {
        let lowered = name.to_lowercase();
        let tokens = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .filter(|t| !self.suffixes.iter().any(|s| s == t));

        let mut out = String::with_capacity(name.len());
        for token in tokens {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(token);
        }
        out
    }
}

/// How a match decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Normalized forms were identical.
    ExactNormalized,
    /// Similarity ratio met the fuzzy threshold.
    Fuzzy,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactNormalized => write!(f, "exact_normalized"),
            Self::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// A registry candidate offered to [`NameMatcher::best_match`].
#[derive(Debug, Clone, Copy)]
pub struct MatchCandidate<'a> {
    /// Entity the candidate name belongs to.
    pub id: EntityId,
    /// Candidate name (canonical name or alias).
    pub name: &'a str,
    /// When the entity was first created; used for tie-breaking.
    pub created_at: DateTime<Utc>,
}

/// A winning match decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameMatch {
    /// The matched entity.
    pub id: EntityId,
    /// Similarity score in [0, 1] that justified the match.
    pub score: f64,
    /// How the decision was reached.
    pub method: MatchMethod,
}

/// Decides whether two names denote the same real-world entity.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    normalizer: NameNormalizer,
    threshold: f64,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self {
            normalizer: NameNormalizer::default(),
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl NameMatcher {
    /// Creates a matcher with an explicit fuzzy threshold.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::ThresholdOutOfRange` if the threshold is
    /// not a finite value in [0.0, 1.0].
    pub fn new(normalizer: NameNormalizer, threshold: f64) -> Result<Self, ConfigurationError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigurationError::ThresholdOutOfRange { value: threshold });
        }
        Ok(Self {
            normalizer,
            threshold,
        })
    }

    /// The configured fuzzy threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The normalizer in use.
    #[must_use]
    pub const fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    /// Similarity of two names in [0, 1].
    ///
    /// Identical normalized forms score 1.0; otherwise a Jaro-Winkler ratio
    /// over the normalized forms. Symmetric by construction.
    #[must_use]
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let na = self.normalizer.normalize(a);
        let nb = self.normalizer.normalize(b);
        if na == nb {
            return 1.0;
        }
        strsim::jaro_winkler(&na, &nb)
    }

    /// Returns true if the two names meet the match policy.
    #[must_use]
    pub fn is_match(&self, a: &str, b: &str) -> bool {
        self.similarity(a, b) >= self.threshold
    }

    /// Picks the best-scoring candidate at or above the threshold.
    ///
    /// Best-match-wins, not first-match-wins: every candidate is scored and
    /// the highest similarity is kept. Ties go to the earliest-created
    /// entity, then to the smaller id for determinism.
    #[must_use]
    pub fn best_match<'a>(
        &self,
        raw_name: &str,
        candidates: impl IntoIterator<Item = MatchCandidate<'a>>,
    ) -> Option<NameMatch> {
        let target = self.normalizer.normalize(raw_name);

        let mut best: Option<(NameMatch, DateTime<Utc>)> = None;
        for candidate in candidates {
            let normalized = self.normalizer.normalize(candidate.name);
            let (score, method) = if normalized == target {
                (1.0, MatchMethod::ExactNormalized)
            } else {
                (
                    strsim::jaro_winkler(&normalized, &target),
                    MatchMethod::Fuzzy,
                )
            };
            if score < self.threshold {
                continue;
            }

            let contender = (
                NameMatch {
                    id: candidate.id,
                    score,
                    method,
                },
                candidate.created_at,
            );
            let replace = match &best {
                None => true,
                Some((current, created)) => match score.total_cmp(&current.score) {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Less => false,
                    std::cmp::Ordering::Equal => (candidate.created_at, candidate.id.to_string())
                        < (*created, current.id.to_string()),
                },
            };
            if replace {
                best = Some(contender);
            }
        }

        best.map(|(m, _)| m)
    }
}
