//! The entity registry: canonical store for resolved entities.
//!
//! One record per real-world entity, built up from matched records over
//! time. The registry is the single-writer heart of the engine: resolution
//! is not commutative (the outcome for record N depends on entities created
//! by records 1..N-1), so all mutation serializes through the internal
//! write lock while snapshot readers proceed concurrently.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{CanonicalEntity, EntityId, EntityKind, EventKind, TimelineEvent};
use crate::error::{AmbiguousMergeError, EngineError, EngineResult, InvalidInputError};
use crate::name::{MatchCandidate, NameMatcher};
use crate::resolution::{ResolutionLogEntry, ResolutionStats};
use crate::source::SourceTag;

/// Hop limit for merge-forwarding chains.
const FORWARD_HOP_LIMIT: usize = 64;

fn lock_err(context: &'static str) -> EngineError {
    EngineError::internal(format!("poisoned lock: {context}"))
}

#[derive(Debug, Default)]
struct RegistryState {
    entities: HashMap<EntityId, CanonicalEntity>,
    merged_into: HashMap<EntityId, EntityId>,
    log: Vec<ResolutionLogEntry>,
    created: usize,
}

fn resolve_canonical_id(state: &RegistryState, id: EntityId) -> EngineResult<EntityId> {
    let mut current = id;
    for _ in 0..FORWARD_HOP_LIMIT {
        let Some(next) = state.merged_into.get(&current).copied() else {
            return Ok(current);
        };
        current = next;
    }
    Err(AmbiguousMergeError::ForwardingDepthExceeded { id }.into())
}

/// An owned, immutable view of the registry at one point in time.
///
/// Snapshots feed the cross-source graph builder; they never observe later
/// registry writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// Surviving canonical entities, ordered by creation.
    pub entities: Vec<CanonicalEntity>,
    /// The resolution log at snapshot time.
    pub log: Vec<ResolutionLogEntry>,
}

/// Canonical store for resolved entities.
///
/// # Examples
///
/// ```
/// use corroborate::{EntityKind, EntityRegistry, SourceTag};
///
/// let registry = EntityRegistry::with_default_matcher();
/// let a = registry
///     .resolve_or_create(
///         "China Shipping Development Co., Ltd.",
///         EntityKind::Company,
///         Some("CN"),
///         &SourceTag::trade_registry(),
///     )
///     .unwrap();
/// let b = registry
///     .resolve_or_create(
///         "CHINA SHIPPING DEVELOPMENT CO.",
///         EntityKind::Company,
///         None,
///         &SourceTag::patents(),
///     )
///     .unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug)]
pub struct EntityRegistry {
    matcher: NameMatcher,
    state: RwLock<RegistryState>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::with_default_matcher()
    }
}

impl EntityRegistry {
    /// Creates a registry using the given matcher.
    #[must_use]
    pub fn new(matcher: NameMatcher) -> Self {
        Self {
            matcher,
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Creates a registry with the default normalizer and threshold.
    #[must_use]
    pub fn with_default_matcher() -> Self {
        Self::new(NameMatcher::default())
    }

    /// The matcher in use.
    #[must_use]
    pub const fn matcher(&self) -> &NameMatcher {
        &self.matcher
    }

    /// Resolves a raw name to an existing entity or creates a new one.
    ///
    /// On a match the raw name joins the alias set (when distinct from the
    /// canonical name), the source tag is recorded, last-seen is refreshed,
    /// and a resolution log entry is appended. On no match a new canonical
    /// entity is created with the raw name as its canonical name.
    ///
    /// # Errors
    ///
    /// - `InvalidInputError::EmptyRawName` for empty/whitespace names
    /// - `InvalidInputError::EmptySourceTag` for empty source tags
    pub fn resolve_or_create(
        &self,
        raw_name: &str,
        kind: EntityKind,
        country: Option<&str>,
        source: &SourceTag,
    ) -> EngineResult<EntityId> {
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return Err(InvalidInputError::EmptyRawName.into());
        }
        if source.is_empty() {
            return Err(InvalidInputError::EmptySourceTag.into());
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| lock_err("registry.resolve_or_create"))?;

        let matched = {
            let candidates = state.entities.values().flat_map(|entity| {
                std::iter::once(MatchCandidate {
                    id: entity.id,
                    name: entity.canonical_name.as_str(),
                    created_at: entity.first_seen,
                })
                .chain(entity.aliases.iter().map(move |alias| MatchCandidate {
                    id: entity.id,
                    name: alias.as_str(),
                    created_at: entity.first_seen,
                }))
            });
            self.matcher.best_match(trimmed, candidates)
        };

        if let Some(m) = matched {
            let entity = state
                .entities
                .get_mut(&m.id)
                .ok_or_else(|| EngineError::internal("matched entity missing from registry"))?;

            entity.add_alias(trimmed);
            entity.add_source(source.clone());
            let now = Utc::now();
            if now > entity.last_seen {
                entity.last_seen = now;
            }
            if entity.country.is_none() {
                entity.country = country
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string);
            }

            debug!(
                entity = %m.id,
                name = trimmed,
                score = m.score,
                method = %m.method,
                "resolved name into existing entity"
            );
            state
                .log
                .push(ResolutionLogEntry::matched(trimmed, m.id, m.score, m.method));
            return Ok(m.id);
        }

        let entity = CanonicalEntity::new(
            trimmed,
            kind,
            country.map(str::to_string),
            source.clone(),
        );
        let id = entity.id;
        state.entities.insert(id, entity);
        state.created += 1;
        debug!(entity = %id, name = trimmed, "created new canonical entity");
        Ok(id)
    }

    /// Appends an event to an entity's timeline.
    ///
    /// The timeline stays date-ordered regardless of insertion order;
    /// last-seen extends to the event date when newer; the event's source
    /// joins the entity's source set. Absorbed ids forward to the survivor.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInputError::UnknownEntity` for unknown ids.
    pub fn record_event(&self, id: EntityId, event: TimelineEvent) -> EngineResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| lock_err("registry.record_event"))?;
        let canonical = resolve_canonical_id(&state, id)?;
        let entity = state
            .entities
            .get_mut(&canonical)
            .ok_or(InvalidInputError::UnknownEntity { id })?;

        if !event.source.is_empty() {
            entity.add_source(event.source.clone());
        }
        entity.push_event(event);
        Ok(())
    }

    /// Folds `absorb` into `keep`.
    ///
    /// Alias sets and source tags are unioned (the absorbed canonical name
    /// becomes an alias), timelines are concatenated and re-sorted by date,
    /// and a merge-tagged resolution log entry is appended. By convention
    /// callers pass the earlier-created entity as `keep`. Merging an entity
    /// with itself is a no-op. Foreign references to `absorb` are not
    /// rewritten; lookups of its id forward to the survivor.
    ///
    /// # Errors
    ///
    /// - `AmbiguousMergeError::MergeCycle` when both ids already resolve to
    ///   the same survivor
    /// - `InvalidInputError::UnknownEntity` when either entity is missing
    pub fn merge(&self, keep: EntityId, absorb: EntityId) -> EngineResult<()> {
        if keep == absorb {
            return Ok(());
        }

        let mut state = self.state.write().map_err(|_| lock_err("registry.merge"))?;

        let keep_canonical = resolve_canonical_id(&state, keep)?;
        let absorb_canonical = resolve_canonical_id(&state, absorb)?;
        if keep_canonical == absorb_canonical {
            return Err(AmbiguousMergeError::MergeCycle {
                keep,
                absorb,
                survivor: keep_canonical,
            }
            .into());
        }

        if !state.entities.contains_key(&keep_canonical) {
            return Err(InvalidInputError::UnknownEntity { id: keep }.into());
        }
        let absorbed = state
            .entities
            .remove(&absorb_canonical)
            .ok_or(InvalidInputError::UnknownEntity { id: absorb })?;

        let survivor = state
            .entities
            .get_mut(&keep_canonical)
            .ok_or_else(|| EngineError::internal("merge survivor vanished"))?;

        let similarity = self
            .matcher
            .similarity(&survivor.canonical_name, &absorbed.canonical_name);

        survivor.add_alias(absorbed.canonical_name.clone());
        for alias in &absorbed.aliases {
            survivor.add_alias(alias.clone());
        }
        for source in &absorbed.sources {
            survivor.add_source(source.clone());
        }
        if survivor.country.is_none() {
            survivor.country = absorbed.country.clone();
        }

        survivor.timeline.extend(absorbed.timeline.iter().cloned());
        survivor.timeline.sort_by_key(|e| e.date);
        if absorbed.last_seen > survivor.last_seen {
            survivor.last_seen = absorbed.last_seen;
        }

        let merge_event = TimelineEvent::new(
            Utc::now(),
            EventKind::Merged,
            SourceTag::registry(),
            absorbed.canonical_name.clone(),
        );
        survivor.push_event(merge_event);

        debug!(
            survivor = %keep_canonical,
            absorbed = %absorb_canonical,
            similarity,
            "merged entities"
        );
        state.merged_into.insert(absorb_canonical, keep_canonical);
        state.log.push(ResolutionLogEntry::merged(
            absorbed.canonical_name,
            keep_canonical,
            similarity,
        ));
        Ok(())
    }

    /// Fetches an entity by id, following merge forwarding.
    ///
    /// # Errors
    ///
    /// Only internal errors (poisoned lock, corrupt forwarding map).
    pub fn get(&self, id: EntityId) -> EngineResult<Option<CanonicalEntity>> {
        let state = self.state.read().map_err(|_| lock_err("registry.get"))?;
        let canonical = resolve_canonical_id(&state, id)?;
        Ok(state.entities.get(&canonical).cloned())
    }

    /// Number of surviving canonical entities.
    ///
    /// # Errors
    ///
    /// Only internal errors.
    pub fn len(&self) -> EngineResult<usize> {
        let state = self.state.read().map_err(|_| lock_err("registry.len"))?;
        Ok(state.entities.len())
    }

    /// Returns true if the registry holds no entities.
    ///
    /// # Errors
    ///
    /// Only internal errors.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Total entities ever created (merges do not decrement this).
    ///
    /// # Errors
    ///
    /// Only internal errors.
    pub fn entities_created(&self) -> EngineResult<usize> {
        let state = self
            .state
            .read()
            .map_err(|_| lock_err("registry.entities_created"))?;
        Ok(state.created)
    }

    /// A copy of the resolution log.
    ///
    /// # Errors
    ///
    /// Only internal errors.
    pub fn resolution_log(&self) -> EngineResult<Vec<ResolutionLogEntry>> {
        let state = self
            .state
            .read()
            .map_err(|_| lock_err("registry.resolution_log"))?;
        Ok(state.log.clone())
    }

    /// Quality metrics over the resolution log.
    ///
    /// # Errors
    ///
    /// Only internal errors.
    pub fn resolution_stats(&self) -> EngineResult<ResolutionStats> {
        let state = self
            .state
            .read()
            .map_err(|_| lock_err("registry.resolution_stats"))?;
        Ok(ResolutionStats::from_log(&state.log))
    }

    /// Takes an owned snapshot for graph builds and reporting.
    ///
    /// # Errors
    ///
    /// Only internal errors.
    pub fn snapshot(&self) -> EngineResult<RegistrySnapshot> {
        let state = self.state.read().map_err(|_| lock_err("registry.snapshot"))?;
        let mut entities: Vec<CanonicalEntity> = state.entities.values().cloned().collect();
        entities.sort_by(|a, b| {
            a.first_seen
                .cmp(&b.first_seen)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(RegistrySnapshot {
            taken_at: Utc::now(),
            entities,
            log: state.log.clone(),
        })
    }
}
