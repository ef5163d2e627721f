//! Route network input data
//!
//! Nodes (point locations), directed edges between them and the world boundary
//! rings. Everything here is read-only once loaded; the engine only queries it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::coordinates::GeoPoint;

pub mod selection;

pub use selection::{Selection, SelectionHandler, SelectionPhase};

/// Node identifier (e.g. an airport code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    #[serde(flatten)]
    pub position: GeoPoint,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            id: NodeId::new(id),
            name: name.into(),
            position: GeoPoint::new(lon, lat),
        }
    }
}

/// Directed connection. `metadata` (carrier details and the like) is carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub destination: NodeId,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Edge {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: NodeId::new(source),
            destination: NodeId::new(destination),
            metadata: serde_json::Value::Null,
        }
    }
}

/// Closed boundary rings in longitude/latitude.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldGeometry {
    rings: Vec<Vec<GeoPoint>>,
}

impl WorldGeometry {
    pub fn new(rings: Vec<Vec<GeoPoint>>) -> Self {
        Self { rings }
    }

    pub fn rings(&self) -> &[Vec<GeoPoint>] {
        &self.rings
    }

    pub fn points(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.rings.iter().flatten().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.iter().all(Vec::is_empty)
    }
}

/// Indexed nodes and edges with candidate lookup.
#[derive(Debug, Clone, Default)]
pub struct RouteNetwork {
    nodes: Vec<Node>,
    by_id: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    outgoing: HashMap<NodeId, Vec<usize>>,
}

impl RouteNetwork {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            by_id.entry(node.id.clone()).or_insert(i);
        }

        // Candidate lists: destinations in first-seen order, deduplicated,
        // restricted to ids present in the node list.
        let mut outgoing: HashMap<NodeId, Vec<usize>> = HashMap::new();
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        for edge in &edges {
            let (Some(&src), Some(&dst)) = (by_id.get(&edge.source), by_id.get(&edge.destination))
            else {
                continue;
            };
            if seen.insert((src, dst)) {
                outgoing.entry(edge.source.clone()).or_default().push(dst);
            }
        }

        Self {
            nodes,
            by_id,
            edges,
            outgoing,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.by_id.get(id).map(|&i| &self.nodes[i])
    }

    pub fn name(&self, id: &NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    /// Nodes reachable from `origin` by one edge.
    pub fn candidates(&self, origin: &NodeId) -> impl Iterator<Item = &Node> + '_ {
        self.outgoing
            .get(origin)
            .into_iter()
            .flatten()
            .map(|&i| &self.nodes[i])
    }

    pub fn candidate_ids(&self, origin: &NodeId) -> HashSet<NodeId> {
        self.candidates(origin).map(|n| n.id.clone()).collect()
    }

    pub fn has_edge(&self, source: &NodeId, destination: &NodeId) -> bool {
        self.candidates(source).any(|n| &n.id == destination)
    }
}
