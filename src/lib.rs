//! # corroborate
//!
//! Entity resolution and multi-signal confidence scoring for OSINT
//! collection pipelines.
//!
//! Given a noisy textual record (a patent assignee, a research-institution
//! name, a procurement contractor), this crate decides whether it denotes a
//! target class of entity with a graded confidence rather than a binary
//! guess, deduplicates near-identical name variants into a canonical
//! registry entry with tracked aliases and provenance, and cross-validates
//! findings across independent sources to separate corroborated signals
//! from single-source noise.
//!
//! ## Core Concepts
//!
//! - **Signal**: one weighted piece of evidence extracted from one record field
//! - **Classification**: membership verdict, score, tier, and completeness flag
//! - **Canonical entity**: the single resolved record for one real-world entity
//! - **Corroboration**: independent confirmation of an attribute by distinct sources
//!
//! ## Usage
//!
//! ```rust
//! use corroborate::{
//!     EntityKind, RawRecord, ResolutionEngine, SourceTag, TargetProfile,
//! };
//!
//! let engine = ResolutionEngine::new(TargetProfile::china_affiliation());
//!
//! let record = RawRecord::new(SourceTag::patents())
//!     .with_country("CN")
//!     .with_name("Huawei Technologies Co Ltd");
//!
//! let outcome = engine.ingest(&record, EntityKind::Company).unwrap();
//! assert!(outcome.admitted());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod engine;
pub mod entity;
pub mod error;
pub mod graph;
pub mod name;
pub mod profile;
pub mod record;
pub mod registry;
pub mod resolution;
pub mod signal;
pub mod source;

// Re-export primary types at crate root for convenience
pub use classify::{ClassificationResult, Completeness, ConfidenceTier, SignalExtractor};
pub use engine::{IngestOutcome, ResolutionEngine};
pub use entity::{CanonicalEntity, EntityId, EntityKind, EventKind, TimelineEvent};
pub use error::{
    AmbiguousMergeError, ConfigurationError, EngineError, EngineResult, InvalidInputError,
};
pub use graph::{CrossSourceGraph, GraphEdge, GraphNode};
pub use name::{
    MatchCandidate, MatchMethod, NameMatch, NameMatcher, NameNormalizer,
    DEFAULT_SIMILARITY_THRESHOLD,
};
pub use profile::{ProfileSpec, RuleSpec, TargetProfile, TierThresholds, DEFAULT_SCORE_CAP};
pub use record::{FieldKind, RawRecord};
pub use registry::{EntityRegistry, RegistrySnapshot};
pub use resolution::{ResolutionLogEntry, ResolutionMethod, ResolutionStats};
pub use signal::{Polarity, Signal, SignalRule};
pub use source::SourceTag;
