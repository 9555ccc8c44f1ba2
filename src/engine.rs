//! The resolution engine: batch orchestration over the core components.
//!
//! This is the single write path the collector scripts share: classify a
//! record, and when it is a member of the target class, resolve it into the
//! registry and stamp its timeline. Classification is pure and safe to run
//! on worker threads; registry mutation funnels through one engine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{ClassificationResult, SignalExtractor};
use crate::entity::{EntityId, EntityKind, TimelineEvent};
use crate::error::EngineResult;
use crate::graph::CrossSourceGraph;
use crate::name::NameMatcher;
use crate::profile::TargetProfile;
use crate::record::RawRecord;
use crate::registry::EntityRegistry;

/// Outcome of ingesting one raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOutcome {
    /// The classification the record received.
    pub classification: ClassificationResult,

    /// The entity the record resolved to; `None` for non-members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
}

impl IngestOutcome {
    /// Returns true if the record was admitted into the registry.
    #[must_use]
    pub const fn admitted(&self) -> bool {
        self.entity_id.is_some()
    }
}

/// Ties the extractor, matcher, and registry into one ingest path.
///
/// # Examples
///
/// ```
/// use corroborate::{EntityKind, RawRecord, ResolutionEngine, SourceTag, TargetProfile};
///
/// let engine = ResolutionEngine::new(TargetProfile::china_affiliation());
/// let record = RawRecord::new(SourceTag::patents())
///     .with_country("CN")
///     .with_name("Huawei Technologies Co Ltd");
///
/// let outcome = engine.ingest(&record, EntityKind::Company).unwrap();
/// assert!(outcome.admitted());
/// ```
#[derive(Debug)]
pub struct ResolutionEngine {
    extractor: SignalExtractor,
    profile: TargetProfile,
    registry: EntityRegistry,
}

impl ResolutionEngine {
    /// Creates an engine with the default matcher.
    #[must_use]
    pub fn new(profile: TargetProfile) -> Self {
        Self::with_matcher(profile, NameMatcher::default())
    }

    /// Creates an engine with an explicit matcher.
    #[must_use]
    pub fn with_matcher(profile: TargetProfile, matcher: NameMatcher) -> Self {
        Self {
            extractor: SignalExtractor::new(),
            profile,
            registry: EntityRegistry::new(matcher),
        }
    }

    /// The active target profile.
    #[must_use]
    pub const fn profile(&self) -> &TargetProfile {
        &self.profile
    }

    /// The underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Classifies a record without touching the registry.
    #[must_use]
    pub fn classify(&self, record: &RawRecord) -> ClassificationResult {
        self.extractor.classify(record, &self.profile)
    }

    /// Classifies a record and, for members, resolves it into the registry
    /// and stamps an observation event.
    ///
    /// # Errors
    ///
    /// Propagates registry errors (empty name/source tag). Non-member
    /// records never fail: they return an outcome with no entity id.
    pub fn ingest(&self, record: &RawRecord, kind: EntityKind) -> EngineResult<IngestOutcome> {
        let classification = self.classify(record);
        if !classification.member {
            return Ok(IngestOutcome {
                classification,
                entity_id: None,
            });
        }

        let country = Some(record.country.trim()).filter(|c| !c.is_empty());
        let id = self
            .registry
            .resolve_or_create(&record.name, kind, country, &record.source)?;
        self.registry
            .record_event(id, TimelineEvent::observed(record.source.clone()))?;

        debug!(entity = %id, tier = %classification.tier, "ingested member record");
        Ok(IngestOutcome {
            classification,
            entity_id: Some(id),
        })
    }

    /// Ingests a batch sequentially.
    ///
    /// Resolution is order-dependent (a name seen twice in one batch must
    /// fold into one entity, not two), so batches are never reordered.
    ///
    /// # Errors
    ///
    /// Stops at the first registry error.
    pub fn ingest_batch(
        &self,
        records: &[RawRecord],
        kind: &EntityKind,
    ) -> EngineResult<Vec<IngestOutcome>> {
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            outcomes.push(self.ingest(record, kind.clone())?);
        }
        Ok(outcomes)
    }

    /// Rebuilds the cross-source graph from the registry's current state.
    ///
    /// # Errors
    ///
    /// Only internal errors from snapshotting.
    pub fn build_graph(&self) -> EngineResult<CrossSourceGraph> {
        Ok(CrossSourceGraph::build(&self.registry.snapshot()?))
    }
}
