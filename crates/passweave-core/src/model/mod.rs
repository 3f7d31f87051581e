// ── Topology domain model ──
//
// Every type in this module is the canonical representation of a canvas
// entity. Node kinds form a closed tagged union: each variant carries only
// the fields that kind actually has, so kind-specific logic is exhaustive
// matching rather than optional-field probing.

pub mod edge;
pub mod node;

// ── Re-exports ──────────────────────────────────────────────────────

pub use edge::{Edge, EdgeId};
pub use node::{
    ControllerRole, LogLevel, Node, NodeId, NodeKind, NodeSize, Point, TlsMode,
    CONTROLLER_NODE_HEIGHT, CONTROLLER_NODE_WIDTH, NODE_DEFAULT_HEIGHT, NODE_DEFAULT_WIDTH,
};
