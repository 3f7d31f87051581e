//! Topology model and derivation engine for NodePass-style tunnel networks.
//!
//! This crate owns the graph a visual editor mutates and everything derived
//! from it:
//!
//! - **[`TopologyGraph`]** — The canvas state: typed nodes and directed
//!   edges in insertion order. [`connect()`](TopologyGraph::connect)
//!   enforces the adjacency rules and triggers the propagation engine;
//!   deletes cascade to touching edges.
//!
//! - **Domain model** ([`model`]) — The closed set of node kinds
//!   (controller, server, client, landing, user) with their per-kind
//!   fields, plus canvas geometry.
//!
//! - **Derivations** — Pure functions over a graph snapshot:
//!   [`compile::instruction_for`] builds one `server://…` / `client://…`
//!   connection string, [`ChainSelection`] walks the highlighted tunnel
//!   chain, and [`SubmissionPlan`] groups compiled instructions per
//!   owning controller.
//!
//! - **Submission** ([`submit`]) — Settles a plan against the
//!   controllers' management APIs concurrently; each node records its own
//!   outcome.
//!
//! - **[`EndpointDirectory`]** — The seam through which the host supplies
//!   controller API roots and bearer tokens; the core reads no files.

pub mod addr;
pub mod chain;
pub mod compile;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod model;
pub mod plan;
pub mod propagate;
pub mod submit;

// ── Primary re-exports ──────────────────────────────────────────────
pub use chain::ChainSelection;
pub use config::{ApiEndpoint, EndpointDirectory, StaticDirectory};
pub use error::CoreError;
pub use graph::TopologyGraph;
pub use layout::{LayoutEdge, LayoutNode, Placement};
pub use plan::{PlanGroup, PlannedInstruction, SkipReason, SkippedNode, SubmissionPlan};
pub use submit::BatchReport;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ControllerRole,
    Edge,
    EdgeId,
    LogLevel,
    Node,
    NodeId,
    NodeKind,
    NodeSize,
    Point,
    TlsMode,
};
