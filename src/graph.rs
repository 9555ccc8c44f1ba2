//! The cross-reference graph: derived corroboration structure.
//!
//! Nodes are canonical entities and attribute values (technologies, partner
//! organizations) observed in entity timelines; an edge links an entity to
//! an attribute once per asserting source, so one entity–attribute pair can
//! carry parallel edges when independent sources corroborate it. The graph
//! is not authoritative: it is discarded and rebuilt from a registry
//! snapshot on every validation pass.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::EntityId;
use crate::registry::RegistrySnapshot;
use crate::source::SourceTag;

/// A node in the cross-reference graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphNode {
    /// A canonical entity.
    Entity(EntityId),
    /// A normalized attribute value.
    Attribute(String),
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(id) => write!(f, "entity:{id}"),
            Self::Attribute(value) => write!(f, "attribute:{value}"),
        }
    }
}

/// One source-labeled assertion linking an entity to an attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphEdge {
    /// The asserting entity.
    pub entity: EntityId,
    /// The normalized attribute value.
    pub attribute: String,
    /// The collector that asserted the association.
    pub source: SourceTag,
}

/// The rebuilt corroboration graph over one registry snapshot.
#[derive(Debug, Clone)]
pub struct CrossSourceGraph {
    built_at: DateTime<Utc>,
    edges: Vec<GraphEdge>,
    adjacency: BTreeMap<GraphNode, BTreeSet<GraphNode>>,
    attribute_sources: BTreeMap<String, BTreeSet<SourceTag>>,
}

fn normalize_attribute(value: &str) -> String {
    value.trim().to_lowercase()
}

impl CrossSourceGraph {
    /// Builds the graph from a registry snapshot.
    ///
    /// Attribute values are trimmed and case-folded so that "Quantum
    /// Computing" and "quantum computing" are one node. Duplicate
    /// assertions by the same source collapse into one edge.
    #[must_use]
    pub fn build(snapshot: &RegistrySnapshot) -> Self {
        let mut edges: BTreeSet<GraphEdge> = BTreeSet::new();
        let mut adjacency: BTreeMap<GraphNode, BTreeSet<GraphNode>> = BTreeMap::new();
        let mut attribute_sources: BTreeMap<String, BTreeSet<SourceTag>> = BTreeMap::new();

        for entity in &snapshot.entities {
            adjacency.entry(GraphNode::Entity(entity.id)).or_default();
            for event in &entity.timeline {
                let Some(raw_value) = event.attribute_value() else {
                    continue;
                };
                let attribute = normalize_attribute(raw_value);
                if attribute.is_empty() || event.source.is_empty() {
                    continue;
                }

                let entity_node = GraphNode::Entity(entity.id);
                let attribute_node = GraphNode::Attribute(attribute.clone());
                adjacency
                    .entry(entity_node.clone())
                    .or_default()
                    .insert(attribute_node.clone());
                adjacency
                    .entry(attribute_node)
                    .or_default()
                    .insert(entity_node);
                attribute_sources
                    .entry(attribute.clone())
                    .or_default()
                    .insert(event.source.clone());
                edges.insert(GraphEdge {
                    entity: entity.id,
                    attribute,
                    source: event.source.clone(),
                });
            }
        }

        let graph = Self {
            built_at: Utc::now(),
            edges: edges.into_iter().collect(),
            adjacency,
            attribute_sources,
        };
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "rebuilt cross-source graph"
        );
        graph
    }

    /// When this graph was built.
    #[must_use]
    pub const fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Total node count (entities plus attributes).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Total edge count, counting parallel edges per source.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All source-labeled edges.
    #[must_use]
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Entity nodes, ascending by id.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityId> {
        self.adjacency
            .keys()
            .filter_map(|node| match node {
                GraphNode::Entity(id) => Some(*id),
                GraphNode::Attribute(_) => None,
            })
            .collect()
    }

    /// Attribute nodes, ascending.
    #[must_use]
    pub fn attributes(&self) -> Vec<&str> {
        self.adjacency
            .keys()
            .filter_map(|node| match node {
                GraphNode::Entity(_) => None,
                GraphNode::Attribute(value) => Some(value.as_str()),
            })
            .collect()
    }

    /// Number of distinct sources that independently asserted an attribute,
    /// across all entities. Zero for unknown attributes.
    #[must_use]
    pub fn corroboration_count(&self, attribute: &str) -> usize {
        self.attribute_sources
            .get(&normalize_attribute(attribute))
            .map_or(0, BTreeSet::len)
    }

    /// Attributes asserted by exactly one source: the single-source,
    /// low-confidence findings.
    #[must_use]
    pub fn single_source_attributes(&self) -> Vec<&str> {
        self.attribute_sources
            .iter()
            .filter(|(_, sources)| sources.len() == 1)
            .map(|(attribute, _)| attribute.as_str())
            .collect()
    }

    /// Attributes asserted by at least `min_sources` distinct sources,
    /// with their corroboration counts, most-corroborated first.
    #[must_use]
    pub fn corroborated_attributes(&self, min_sources: usize) -> Vec<(&str, usize)> {
        let mut out: Vec<(&str, usize)> = self
            .attribute_sources
            .iter()
            .filter(|(_, sources)| sources.len() >= min_sources)
            .map(|(attribute, sources)| (attribute.as_str(), sources.len()))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        out
    }

    /// Ranks entities by betweenness centrality over the bipartite graph,
    /// descending, at most `k` results. Ties break by entity id.
    ///
    /// Entities that bridge otherwise-unconnected attribute clusters rank
    /// highest; they are the top candidates for manual review.
    #[must_use]
    pub fn central_entities(&self, k: usize) -> Vec<(EntityId, f64)> {
        if k == 0 || self.adjacency.is_empty() {
            return Vec::new();
        }

        let nodes: Vec<&GraphNode> = self.adjacency.keys().collect();
        let index: HashMap<&GraphNode, usize> =
            nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        let n = nodes.len();

        let neighbors: Vec<Vec<usize>> = nodes
            .iter()
            .map(|node| {
                self.adjacency[*node]
                    .iter()
                    .filter_map(|neighbor| index.get(&neighbor).copied())
                    .collect()
            })
            .collect();

        // Brandes' algorithm over the undirected, unweighted projection;
        // parallel edges collapse to a single adjacency for traversal.
        let mut centrality = vec![0.0f64; n];
        for s in 0..n {
            let mut stack: Vec<usize> = Vec::with_capacity(n);
            let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
            let mut sigma = vec![0.0f64; n];
            let mut dist = vec![-1i64; n];
            sigma[s] = 1.0;
            dist[s] = 0;

            let mut queue = VecDeque::new();
            queue.push_back(s);
            while let Some(v) = queue.pop_front() {
                stack.push(v);
                for &w in &neighbors[v] {
                    if dist[w] < 0 {
                        dist[w] = dist[v] + 1;
                        queue.push_back(w);
                    }
                    if dist[w] == dist[v] + 1 {
                        sigma[w] += sigma[v];
                        preds[w].push(v);
                    }
                }
            }

            let mut delta = vec![0.0f64; n];
            while let Some(w) = stack.pop() {
                for &v in &preds[w] {
                    delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
                }
                if w != s {
                    centrality[w] += delta[w];
                }
            }
        }

        let mut ranked: Vec<(EntityId, f64)> = nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| match node {
                // Undirected graph: each pair is counted from both ends.
                GraphNode::Entity(id) => Some((*id, centrality[i] / 2.0)),
                GraphNode::Attribute(_) => None,
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(k);
        ranked
    }
}
