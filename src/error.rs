//! Error types for the resolution engine.
//!
//! All errors are strongly typed using thiserror. The taxonomy is small by
//! design: invalid inputs, bad configuration, and ambiguous merges. Nothing
//! in this crate is retried internally; every operation is deterministic, so
//! a retry would change nothing.

use thiserror::Error;

use crate::entity::EntityId;

/// Errors raised when a caller hands the engine unusable input.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Raw names must contain at least one non-whitespace character.
    #[error("Raw name cannot be empty")]
    EmptyRawName,

    /// Source tags must identify a collector.
    #[error("Source tag cannot be empty")]
    EmptySourceTag,

    /// The referenced entity does not exist in the registry.
    #[error("Unknown entity: {id}")]
    UnknownEntity {
        /// The identifier that failed to resolve.
        id: EntityId,
    },
}

/// Errors raised while loading or validating configuration.
///
/// All of these fire at construction time, never mid-batch. A profile that
/// loads is a profile that classifies.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A target profile must define at least one signal rule.
    #[error("Target profile '{profile}' defines no signal rules")]
    NoRules {
        /// Name of the offending profile.
        profile: String,
    },

    /// Similarity thresholds live in [0.0, 1.0].
    #[error("Similarity threshold {value} is out of range [0.0, 1.0]")]
    ThresholdOutOfRange {
        /// The rejected threshold.
        value: f64,
    },

    /// A signal rule pattern failed to compile.
    #[error("Invalid signal pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source text.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// Tier thresholds must be positive and non-decreasing.
    #[error(
        "Tier thresholds must satisfy 0 < medium <= high <= very_high \
         (got medium={medium}, high={high}, very_high={very_high})"
    )]
    NonMonotonicTiers {
        /// Threshold for the medium tier.
        medium: u32,
        /// Threshold for the high tier.
        high: u32,
        /// Threshold for the very-high tier.
        very_high: u32,
    },

    /// A profile document could not be parsed at all.
    #[error("Malformed profile document: {reason}")]
    MalformedProfile {
        /// Parser diagnostic.
        reason: String,
    },
}

/// Errors raised when a merge request cannot be applied unambiguously.
#[derive(Debug, Error)]
pub enum AmbiguousMergeError {
    /// Both identifiers forward to the same surviving entity, so the merge
    /// would fold an entity into itself through an earlier merge chain.
    #[error("Merge of {absorb} into {keep} is circular: both resolve to {survivor}")]
    MergeCycle {
        /// The entity that was meant to survive.
        keep: EntityId,
        /// The entity that was meant to be absorbed.
        absorb: EntityId,
        /// The entity both identifiers forward to.
        survivor: EntityId,
    },

    /// Merge forwarding chains are hop-limited; exceeding the limit means
    /// the forwarding map is corrupt.
    #[error("Merge forwarding for {id} exceeded the hop limit")]
    ForwardingDepthExceeded {
        /// The identifier whose chain did not terminate.
        id: EntityId,
    },
}

/// Top-level error type for the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unusable caller input.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Bad configuration, rejected at load time.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A merge that cannot be applied unambiguously.
    #[error("Ambiguous merge: {0}")]
    AmbiguousMerge(#[from] AmbiguousMergeError),

    /// Invariant violation inside the engine (e.g. a poisoned lock).
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failed invariant.
        message: String,
    },
}

impl EngineError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is an invalid-input error.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true if this is an ambiguous-merge error.
    #[must_use]
    pub const fn is_ambiguous_merge(&self) -> bool {
        matches!(self, Self::AmbiguousMerge(_))
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_raw_name_message() {
        let err = InvalidInputError::EmptyRawName;
        assert!(format!("{err}").contains("cannot be empty"));
    }

    #[test]
    fn test_unknown_entity_includes_id() {
        let id = EntityId::new();
        let err = InvalidInputError::UnknownEntity { id };
        assert!(format!("{err}").contains(&id.to_string()));
    }

    #[test]
    fn test_threshold_out_of_range_message() {
        let err = ConfigurationError::ThresholdOutOfRange { value: 1.2 };
        let msg = format!("{err}");
        assert!(msg.contains("1.2"));
        assert!(msg.contains("out of range"));
    }

    #[test]
    fn test_non_monotonic_tiers_message() {
        let err = ConfigurationError::NonMonotonicTiers {
            medium: 80,
            high: 70,
            very_high: 100,
        };
        let msg = format!("{err}");
        assert!(msg.contains("medium=80"));
        assert!(msg.contains("high=70"));
    }

    #[test]
    fn test_merge_cycle_message() {
        let keep = EntityId::new();
        let absorb = EntityId::new();
        let err = AmbiguousMergeError::MergeCycle {
            keep,
            absorb,
            survivor: keep,
        };
        let msg = format!("{err}");
        assert!(msg.contains("circular"));
        assert!(msg.contains(&absorb.to_string()));
    }

    #[test]
    fn test_engine_error_from_invalid_input() {
        let err: EngineError = InvalidInputError::EmptyRawName.into();
        assert!(err.is_invalid_input());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_engine_error_from_configuration() {
        let err: EngineError = ConfigurationError::NoRules {
            profile: "test".to_string(),
        }
        .into();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_engine_error_internal() {
        let err = EngineError::internal("lock poisoned");
        assert!(format!("{err}").contains("lock poisoned"));
        assert!(!err.is_ambiguous_merge());
    }
}
