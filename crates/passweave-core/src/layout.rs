// ── Auto layout ──
//
// Rearranges the whole canvas. An external layout service (generic async
// closure, same shape as the submission sender) gets first shot; when it
// is unavailable or fails, the built-in tiered fallback places nodes in
// kind order, one centered row per tier.

use tracing::warn;

use crate::graph::TopologyGraph;
use crate::model::{EdgeId, NodeId, NodeKind, Point};

const TIER_Y_SPACING: f64 = 240.0;
const TIER_Y_START: f64 = 50.0;
const NODE_X_SPACING: f64 = 280.0;

/// Kind order of the fallback tiers, top row first.
const TIER_ORDER: [&str; 5] = ["controller", "user", "client", "server", "landing"];

/// Geometry handed to a layout service: ids and box sizes, no semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: NodeId,
    pub width: f64,
    pub height: f64,
    pub label: String,
}

/// Connectivity handed to a layout service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

/// One node's computed position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
}

/// Extract the geometry view of a graph for a layout service.
pub fn layout_nodes(graph: &TopologyGraph) -> Vec<LayoutNode> {
    graph
        .nodes()
        .map(|n| LayoutNode {
            id: n.id,
            width: n.size.width,
            height: n.size.height,
            label: n.label.clone(),
        })
        .collect()
}

/// Extract the connectivity view of a graph for a layout service.
pub fn layout_edges(graph: &TopologyGraph) -> Vec<LayoutEdge> {
    graph
        .edges()
        .map(|e| LayoutEdge {
            id: e.id,
            source: e.source,
            target: e.target,
        })
        .collect()
}

/// Compute placements via an external service, falling back to the tiered
/// layout when the service fails. An empty canvas short-circuits without
/// calling the service at all.
pub async fn layout_with<F, Fut, E>(
    graph: &TopologyGraph,
    service: F,
) -> Vec<Placement>
where
    F: Fn(Vec<LayoutNode>, Vec<LayoutEdge>) -> Fut,
    Fut: Future<Output = Result<Vec<Placement>, E>>,
    E: std::fmt::Display,
{
    if graph.node_count() == 0 {
        return Vec::new();
    }

    match service(layout_nodes(graph), layout_edges(graph)).await {
        Ok(placements) => placements,
        Err(err) => {
            warn!(error = %err, "layout service failed; using tiered fallback");
            tiered_layout(graph)
        }
    }
}

/// Built-in fallback: one horizontal row per node kind, rows stacked in
/// `TIER_ORDER`, each row centered around x = 0. Tiers with no nodes are
/// skipped so the canvas stays compact.
pub fn tiered_layout(graph: &TopologyGraph) -> Vec<Placement> {
    let mut placements = Vec::with_capacity(graph.node_count());
    let mut y = TIER_Y_START;

    for tier in TIER_ORDER {
        let ids: Vec<NodeId> = graph
            .nodes()
            .filter(|n| n.kind.tag() == tier)
            .map(|n| n.id)
            .collect();
        if ids.is_empty() {
            continue;
        }

        let tier_width = (ids.len() - 1) as f64 * NODE_X_SPACING;
        let x_start = -tier_width / 2.0;
        for (i, id) in ids.into_iter().enumerate() {
            placements.push(Placement {
                id,
                x: x_start + i as f64 * NODE_X_SPACING,
                y,
            });
        }
        y += TIER_Y_SPACING;
    }

    placements
}

/// Write placements back onto the graph. Unknown ids are ignored.
pub fn apply_placements(graph: &mut TopologyGraph, placements: &[Placement]) {
    for placement in placements {
        if let Some(node) = graph.node_mut(placement.id) {
            node.position = Point {
                x: placement.x,
                y: placement.y,
            };
        }
    }
}
