// ── Submission planner ──
//
// Walks the whole graph, resolves each endpoint node's owning controller,
// compiles its instruction, and groups the results per controller api id.
// Pure over the graph snapshot; `plan_submission` is the stateful wrapper
// that also clears stale status strings before a new run.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::compile::instruction_for;
use crate::graph::TopologyGraph;
use crate::model::{Node, NodeId, NodeKind};

/// One compiled instruction, tagged with the canvas node it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedInstruction {
    pub node_id: NodeId,
    pub instruction: String,
}

/// All instructions destined for one controller.
#[derive(Debug, Clone)]
pub struct PlanGroup {
    pub api_id: String,
    /// Display name, when a controller node or managing metadata carried one.
    pub api_name: Option<String>,
    pub instructions: Vec<PlannedInstruction>,
}

/// Why a node was left out of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No controller could be resolved for this node.
    NoOwner,
    /// An owner was found but the instruction could not be compiled
    /// (missing tunnel/target address).
    NoInstruction,
}

/// A node excluded from the plan, with its reason, for user-facing
/// diagnostics.
#[derive(Debug, Clone)]
pub struct SkippedNode {
    pub node_id: NodeId,
    pub label: String,
    pub reason: SkipReason,
}

/// Per-controller instruction batches, in canvas insertion order.
/// Groups are only ever created non-empty, so no pruning pass is needed.
#[derive(Debug, Clone, Default)]
pub struct SubmissionPlan {
    pub groups: IndexMap<String, PlanGroup>,
    pub skipped: Vec<SkippedNode>,
}

impl SubmissionPlan {
    /// Derive the plan from a graph snapshot. Does not mutate the graph.
    pub fn compute(graph: &TopologyGraph) -> Self {
        let mut plan = Self::default();

        // Nodes are visited once each, so parallel edges of the same
        // logical tunnel cannot double-count an endpoint.
        for node in graph.nodes() {
            if !node.is_endpoint() {
                continue;
            }

            let Some((api_id, api_name)) = resolve_owner(graph, node) else {
                if matches!(node.kind, NodeKind::Client { .. }) {
                    warn!(node = %node.label, "client has no resolvable controller; skipped");
                    plan.skipped.push(SkippedNode {
                        node_id: node.id,
                        label: node.label.clone(),
                        reason: SkipReason::NoOwner,
                    });
                } else {
                    debug!(node = %node.label, "server has no controller edge; excluded");
                }
                continue;
            };

            let Some(instruction) = instruction_for(node, graph) else {
                warn!(node = %node.label, "could not compile instruction; skipped");
                plan.skipped.push(SkippedNode {
                    node_id: node.id,
                    label: node.label.clone(),
                    reason: SkipReason::NoInstruction,
                });
                continue;
            };

            plan.groups
                .entry(api_id.clone())
                .or_insert_with(|| PlanGroup {
                    api_id,
                    api_name,
                    instructions: Vec::new(),
                })
                .instructions
                .push(PlannedInstruction {
                    node_id: node.id,
                    instruction,
                });
        }

        plan
    }

    /// Total instructions across all groups.
    pub fn instruction_count(&self) -> usize {
        self.groups.values().map(|g| g.instructions.len()).sum()
    }

    /// "Nothing to submit."
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every node id the plan would provision.
    pub fn planned_node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.groups
            .values()
            .flat_map(|g| g.instructions.iter().map(|p| p.node_id))
    }
}

/// Plan a new submission: clears stale per-node status strings first so
/// outcomes from the previous batch don't linger on unplanned nodes.
pub fn plan_submission(graph: &mut TopologyGraph) -> SubmissionPlan {
    graph.clear_endpoint_statuses();
    SubmissionPlan::compute(graph)
}

// ── Ownership resolution ────────────────────────────────────────────

/// Resolve the controller owning `node`, trying in order:
/// 1. a direct incoming edge from a controller node;
/// 2. (client only) the `managing_api_id` recorded at creation;
/// 3. (client only) transitively through a connected server's rule-1 edge.
fn resolve_owner(graph: &TopologyGraph, node: &Node) -> Option<(String, Option<String>)> {
    if let Some(owner) = direct_controller(graph, node.id) {
        return Some(owner);
    }

    let NodeKind::Client {
        managing_api_id,
        managing_api_name,
        ..
    } = &node.kind
    else {
        return None;
    };

    if let Some(api_id) = managing_api_id {
        return Some((api_id.clone(), managing_api_name.clone()));
    }

    // Either direction counts: parallel server<->client edges describe the
    // same logical tunnel.
    let peer_server = graph
        .edges()
        .filter(|e| e.touches(node.id))
        .map(|e| if e.source == node.id { e.target } else { e.source })
        .filter_map(|peer| graph.node(peer))
        .find(|peer| matches!(peer.kind, NodeKind::Server { .. }))?;

    direct_controller(graph, peer_server.id)
}

fn direct_controller(graph: &TopologyGraph, node_id: NodeId) -> Option<(String, Option<String>)> {
    graph
        .edges()
        .filter(|e| e.target == node_id)
        .filter_map(|e| graph.node(e.source))
        .find_map(|n| match &n.kind {
            NodeKind::Controller {
                api_id, api_name, ..
            } => Some((api_id.clone(), Some(api_name.clone()))),
            _ => None,
        })
}
