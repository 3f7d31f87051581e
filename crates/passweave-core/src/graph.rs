// ── Topology graph ──
//
// The single mutable structure owned by an editing session. All mutation
// goes through explicit methods reacting to discrete user actions; the
// derivation modules (compile, chain, plan) take the graph by shared
// reference and never mutate it.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::EndpointDirectory;
use crate::error::CoreError;
use crate::model::{Edge, EdgeId, Node, NodeId, NodeKind, Point};
use crate::propagate;

/// Nodes and edges of one canvas, in insertion order.
#[derive(Debug, Default)]
pub struct TopologyGraph {
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_controller(&self) -> bool {
        self.nodes
            .values()
            .any(|n| matches!(n.kind, NodeKind::Controller { .. }))
    }

    // ── Node lifecycle ───────────────────────────────────────────────

    /// Add a node at the given canvas position. The kind is fixed for the
    /// node's lifetime.
    pub fn add_node(&mut self, label: impl Into<String>, kind: NodeKind, position: Point) -> NodeId {
        let id = NodeId::generate();
        let size = kind.default_size();
        let label = label.into();
        debug!(node = %id, kind = kind.tag(), %label, "node added");
        self.nodes.insert(
            id,
            Node {
                id,
                label,
                kind,
                position,
                size,
                status_info: None,
                chain_highlighted: false,
            },
        );
        id
    }

    /// Drop a controller reference onto the canvas.
    ///
    /// The first drop creates a controller node. Any later drop creates a
    /// *client* node instead, pre-owned by that controller via
    /// `managing_api_id` — the canvas keeps a single primary controller
    /// and extra references become instances it manages.
    pub fn drop_controller_reference(
        &mut self,
        api_id: impl Into<String>,
        api_name: impl Into<String>,
        position: Point,
    ) -> NodeId {
        let api_id = api_id.into();
        let api_name = api_name.into();

        if self.has_controller() {
            let label = format!("{api_name} Client");
            self.add_node(label, NodeKind::managed_client(api_id, api_name), position)
        } else {
            self.add_node(
                api_name.clone(),
                NodeKind::Controller {
                    api_id,
                    api_name,
                    role: crate::model::ControllerRole::Server,
                },
                position,
            )
        }
    }

    /// Delete a node, cascading to every edge that references it.
    ///
    /// Deleting a node that was part of the highlighted chain clears the
    /// highlight entirely — the remaining flags would describe a chain
    /// that no longer exists.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(removed) = self.nodes.shift_remove(&id) else {
            return false;
        };
        self.edges.retain(|_, e| !e.touches(id));
        if removed.chain_highlighted {
            for node in self.nodes.values_mut() {
                node.chain_highlighted = false;
            }
        }
        info!(node = %id, "node deleted (edges cascaded)");
        true
    }

    /// Delete a single edge.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        self.edges.shift_remove(&id).is_some()
    }

    /// Remove every node and edge.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    // ── Edge creation ────────────────────────────────────────────────

    /// Create a directed edge after checking the adjacency table.
    ///
    /// On success the propagation engine runs once for the new edge (the
    /// server→client tunnel-address auto-fill), consulting `directory` for
    /// controller API hosts. Rejected proposals leave the graph unchanged.
    pub fn connect(
        &mut self,
        source: NodeId,
        target: NodeId,
        source_handle: Option<String>,
        directory: &dyn EndpointDirectory,
    ) -> Result<EdgeId, CoreError> {
        let source_node = self.nodes.get(&source).ok_or(CoreError::NodeNotFound(source))?;
        let target_node = self.nodes.get(&target).ok_or(CoreError::NodeNotFound(target))?;

        if !source_node.kind.may_target(&target_node.kind) {
            return Err(CoreError::InvalidConnection {
                source_kind: source_node.kind.tag(),
                target_kind: target_node.kind.tag(),
            });
        }

        let id = EdgeId::generate();
        debug!(edge = %id, source = %source, target = %target, "edge created");
        self.edges.insert(
            id,
            Edge {
                id,
                source,
                target,
                source_handle,
            },
        );

        propagate::on_edge_created(self, id, directory);

        Ok(id)
    }

    // ── Transient state ──────────────────────────────────────────────

    /// Set a node's provisioning status string.
    pub fn set_status(&mut self, id: NodeId, status: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.status_info = Some(status.into());
        }
    }

    /// Clear provisioning status on every endpoint node (done before
    /// planning a new submission so stale outcomes don't linger).
    pub fn clear_endpoint_statuses(&mut self) {
        for node in self.nodes.values_mut() {
            if matches!(node.kind, NodeKind::Server { .. } | NodeKind::Client { .. }) {
                node.status_info = None;
            }
        }
    }

    /// Re-derive the `chain_highlighted` flag from a selection.
    pub fn apply_chain_highlight(&mut self, selection: &crate::chain::ChainSelection) {
        for node in self.nodes.values_mut() {
            node.chain_highlighted = selection.nodes.contains(&node.id);
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }
}
