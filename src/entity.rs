//! Canonical entities and their lifecycle timeline.
//!
//! A canonical entity is the single resolved record for one real-world
//! organization across all its name variants. Stable ids are the anchor:
//! without them aliases cannot accumulate, merges cannot forward, and the
//! cross-reference graph has nothing to hang edges on.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::source::SourceTag;

/// Globally unique, stable entity identifier.
///
/// Once created, an `EntityId` never changes. Merges forward the absorbed
/// id to the survivor; they never reassign it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Creates a new random entity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an entity ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true if this is a nil (all zeros) UUID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EntityId> for Uuid {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Classification of what kind of organization an entity is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A commercial company.
    Company,
    /// A university or research institution.
    Institution,
    /// A government agency.
    Agency,
    /// A research group or laboratory below institution level.
    ResearchGroup,
    /// A named individual.
    Individual,
    /// A custom kind.
    Custom(String),
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Company => write!(f, "company"),
            Self::Institution => write!(f, "institution"),
            Self::Agency => write!(f, "agency"),
            Self::ResearchGroup => write!(f, "research_group"),
            Self::Individual => write!(f, "individual"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

/// What happened at a point on an entity's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A record matched or created the entity.
    Observed,
    /// A technology was attributed to the entity.
    TechnologyDetected,
    /// A partner organization was attributed to the entity.
    PartnerIdentified,
    /// Another entity was merged into this one.
    Merged,
    /// A custom event kind.
    Custom(String),
}

impl EventKind {
    /// Whether the event's detail is an attribute value for the
    /// cross-reference graph.
    #[must_use]
    pub const fn bears_attribute(&self) -> bool {
        matches!(self, Self::TechnologyDetected | Self::PartnerIdentified)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Observed => write!(f, "observed"),
            Self::TechnologyDetected => write!(f, "technology_detected"),
            Self::PartnerIdentified => write!(f, "partner_identified"),
            Self::Merged => write!(f, "merged"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

/// One dated event on an entity's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// When the event occurred.
    pub date: DateTime<Utc>,
    /// What kind of event this is.
    pub kind: EventKind,
    /// Which collector asserted it.
    pub source: SourceTag,
    /// Free-text detail; for attribute-bearing events, the attribute value.
    pub detail: String,
}

impl TimelineEvent {
    /// Creates an event with an explicit date.
    #[must_use]
    pub fn new(
        date: DateTime<Utc>,
        kind: EventKind,
        source: SourceTag,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            date,
            kind,
            source,
            detail: detail.into(),
        }
    }

    /// Creates an observation event dated now.
    #[must_use]
    pub fn observed(source: SourceTag) -> Self {
        Self::new(Utc::now(), EventKind::Observed, source, "")
    }

    /// Creates a technology-detection event dated now.
    #[must_use]
    pub fn technology(source: SourceTag, technology: impl Into<String>) -> Self {
        Self::new(Utc::now(), EventKind::TechnologyDetected, source, technology)
    }

    /// Creates a partner-identification event dated now.
    #[must_use]
    pub fn partner(source: SourceTag, partner: impl Into<String>) -> Self {
        Self::new(Utc::now(), EventKind::PartnerIdentified, source, partner)
    }

    /// Returns the attribute value this event asserts, if any.
    #[must_use]
    pub fn attribute_value(&self) -> Option<&str> {
        if self.kind.bears_attribute() && !self.detail.trim().is_empty() {
            Some(self.detail.trim())
        } else {
            None
        }
    }
}

/// The single resolved record for one real-world entity.
///
/// Aliases and source tags are append-only; `first_seen` is set once and
/// never changed; `last_seen` only moves forward. Every alias was matched
/// against the canonical name before insertion, never added speculatively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalEntity {
    /// Stable identifier.
    pub id: EntityId,

    /// The first-seen (or human-chosen) name for the entity.
    pub canonical_name: String,

    /// What kind of organization this is.
    pub kind: EntityKind,

    /// Country, when an authoritative field supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Every collector that has referenced this entity.
    #[serde(default)]
    pub sources: BTreeSet<SourceTag>,

    /// Observed name variants folded into this entity.
    #[serde(default)]
    pub aliases: BTreeSet<String>,

    /// When the entity was first created.
    pub first_seen: DateTime<Utc>,

    /// The latest event date observed for the entity.
    pub last_seen: DateTime<Utc>,

    /// Date-ordered event history.
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
}

impl CanonicalEntity {
    /// Creates a new canonical entity from its first record.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: EntityKind,
        country: Option<String>,
        source: SourceTag,
    ) -> Self {
        let now = Utc::now();
        let mut sources = BTreeSet::new();
        sources.insert(source);
        Self {
            id: EntityId::new(),
            canonical_name: name.into(),
            kind,
            country: country.filter(|c| !c.trim().is_empty()),
            sources,
            aliases: BTreeSet::new(),
            first_seen: now,
            last_seen: now,
            timeline: Vec::new(),
        }
    }

    /// Adds an alias unless it equals the canonical name. Returns true if
    /// the set changed.
    pub(crate) fn add_alias(&mut self, alias: impl Into<String>) -> bool {
        let alias = alias.into();
        if alias == self.canonical_name {
            return false;
        }
        self.aliases.insert(alias)
    }

    /// Records a referencing collector. Returns true if the set changed.
    pub(crate) fn add_source(&mut self, source: SourceTag) -> bool {
        self.sources.insert(source)
    }

    /// Inserts an event keeping the timeline date-ordered, and extends
    /// `last_seen` if the event is newer.
    pub(crate) fn push_event(&mut self, event: TimelineEvent) {
        if event.date > self.last_seen {
            self.last_seen = event.date;
        }
        let at = self.timeline.partition_point(|e| e.date <= event.date);
        self.timeline.insert(at, event);
    }

    /// Number of recorded aliases.
    #[must_use]
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Returns true if the given collector has referenced this entity.
    #[must_use]
    pub fn has_source(&self, source: &SourceTag) -> bool {
        self.sources.contains(source)
    }
}

impl PartialEq for CanonicalEntity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CanonicalEntity {}

impl std::hash::Hash for CanonicalEntity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_entity_id_creation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(!id1.is_nil());
    }

    #[test]
    fn test_entity_id_display_is_uuid() {
        let id = EntityId::new();
        assert!(format!("{id}").contains('-'));
    }

    #[test]
    fn test_entity_creation() {
        let entity = CanonicalEntity::new(
            "Test Org",
            EntityKind::Company,
            Some("CN".to_string()),
            SourceTag::patents(),
        );
        assert_eq!(entity.canonical_name, "Test Org");
        assert_eq!(entity.country.as_deref(), Some("CN"));
        assert!(entity.has_source(&SourceTag::patents()));
        assert_eq!(entity.first_seen, entity.last_seen);
        assert!(entity.timeline.is_empty());
    }

    #[test]
    fn test_blank_country_dropped() {
        let entity = CanonicalEntity::new(
            "Test Org",
            EntityKind::Company,
            Some("  ".to_string()),
            SourceTag::unknown(),
        );
        assert!(entity.country.is_none());
    }

    #[test]
    fn test_alias_skips_canonical_name() {
        let mut entity = CanonicalEntity::new(
            "Acme Ltd",
            EntityKind::Company,
            None,
            SourceTag::unknown(),
        );
        assert!(!entity.add_alias("Acme Ltd"));
        assert!(entity.add_alias("ACME LIMITED"));
        assert!(!entity.add_alias("ACME LIMITED")); // duplicate
        assert_eq!(entity.alias_count(), 1);
    }

    #[test]
    fn test_push_event_keeps_date_order() {
        let mut entity = CanonicalEntity::new(
            "Acme",
            EntityKind::Company,
            None,
            SourceTag::unknown(),
        );
        let t0 = Utc::now();
        entity.push_event(TimelineEvent::new(
            t0 + Duration::days(2),
            EventKind::Observed,
            SourceTag::patents(),
            "",
        ));
        entity.push_event(TimelineEvent::new(
            t0,
            EventKind::Observed,
            SourceTag::trade_registry(),
            "",
        ));
        entity.push_event(TimelineEvent::new(
            t0 + Duration::days(1),
            EventKind::TechnologyDetected,
            SourceTag::patents(),
            "lidar",
        ));

        let dates: Vec<_> = entity.timeline.iter().map(|e| e.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(entity.last_seen, t0 + Duration::days(2));
    }

    #[test]
    fn test_last_seen_never_regresses() {
        let mut entity = CanonicalEntity::new(
            "Acme",
            EntityKind::Company,
            None,
            SourceTag::unknown(),
        );
        let future = Utc::now() + Duration::days(10);
        entity.push_event(TimelineEvent::new(
            future,
            EventKind::Observed,
            SourceTag::patents(),
            "",
        ));
        entity.push_event(TimelineEvent::new(
            Utc::now() - Duration::days(5),
            EventKind::Observed,
            SourceTag::patents(),
            "",
        ));
        assert_eq!(entity.last_seen, future);
    }

    #[test]
    fn test_attribute_value() {
        let tech = TimelineEvent::technology(SourceTag::patents(), " quantum computing ");
        assert_eq!(tech.attribute_value(), Some("quantum computing"));

        let observed = TimelineEvent::observed(SourceTag::patents());
        assert_eq!(observed.attribute_value(), None);

        let empty_tech = TimelineEvent::technology(SourceTag::patents(), "  ");
        assert_eq!(empty_tech.attribute_value(), None);
    }

    #[test]
    fn test_entity_equality_by_id() {
        let a = CanonicalEntity::new("A", EntityKind::Company, None, SourceTag::unknown());
        let mut b = a.clone();
        b.canonical_name = "Different".to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(format!("{}", EntityKind::ResearchGroup), "research_group");
        assert_eq!(
            format!("{}", EntityKind::Custom("consortium".to_string())),
            "custom:consortium"
        );
    }

    #[test]
    fn test_entity_serialization() {
        let mut entity = CanonicalEntity::new(
            "Acme",
            EntityKind::Company,
            Some("DE".to_string()),
            SourceTag::trade_registry(),
        );
        entity.add_alias("ACME GmbH");
        let json = serde_json::to_string(&entity).unwrap();
        let back: CanonicalEntity = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, entity.id);
        assert_eq!(back.aliases, entity.aliases);
    }
}
