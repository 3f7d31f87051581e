// ── Edge type ──
//
// A directed relation between two node identifiers. Purely structural:
// legality is decided against the adjacency table before creation, and
// deleting either endpoint node cascades to the edge.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::node::NodeId;

/// Opaque edge identifier. Minted by the owning graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(Uuid);

impl EdgeId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed `source → target` relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Visual-role tag distinguishing parallel egress kinds leaving the
    /// same node (e.g. a server's "to client" vs "to landing" handle).
    /// Structural only; no derivation logic reads it.
    pub source_handle: Option<String>,
}

impl Edge {
    /// True if this edge touches `node` on either side.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}
