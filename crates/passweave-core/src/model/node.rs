// ── Node types ──
//
// A node is one typed entity on the canvas. The kind is fixed at creation;
// `status_info` and `chain_highlighted` are derived/transient and never part
// of the serialized representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// Canvas sizing defaults, consumed by the layout interface.
pub const NODE_DEFAULT_WIDTH: f64 = 140.0;
pub const NODE_DEFAULT_HEIGHT: f64 = 40.0;
pub const CONTROLLER_NODE_WIDTH: f64 = 170.0;
pub const CONTROLLER_NODE_HEIGHT: f64 = 45.0;

// ── NodeId ──────────────────────────────────────────────────────────

/// Opaque node identifier. Minted by the owning [`TopologyGraph`](crate::TopologyGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Supporting enums ────────────────────────────────────────────────

/// Instance log level. `Master` is the inherit sentinel: it is never
/// emitted into a compiled instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Master,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Wire form used in instruction query parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

/// Server TLS mode. Wire forms are the digit strings the management API
/// expects; `Master` inherits the endpoint default and is never emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    Master,
    Off,
    #[default]
    SelfSigned,
    Custom,
}

impl TlsMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Off => "0",
            Self::SelfSigned => "1",
            Self::Custom => "2",
        }
    }
}

/// Advisory grouping tag for controller nodes. No provisioning effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerRole {
    #[default]
    Server,
    Client,
    General,
}

// ── NodeKind ────────────────────────────────────────────────────────

/// The five node kinds, as a closed tagged union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    /// A managed API endpoint/credential pair that can provision instances.
    Controller {
        api_id: String,
        api_name: String,
        role: ControllerRole,
    },
    /// A listening tunnel endpoint.
    Server {
        tunnel_address: String,
        target_address: String,
        log_level: LogLevel,
        tls_mode: TlsMode,
        crt_path: String,
        key_path: String,
    },
    /// A dialing tunnel endpoint.
    Client {
        tunnel_address: String,
        target_address: String,
        log_level: LogLevel,
        /// Ownership recorded at creation when the node was made by
        /// dropping a controller reference — independent of graph edges.
        managing_api_id: Option<String>,
        managing_api_name: Option<String>,
    },
    /// Terminal target substituted into an upstream endpoint's instruction.
    Landing {
        landing_ip: String,
        landing_port: String,
    },
    /// Pure traffic-origin marker with no provisioning effect.
    User { description: String },
}

impl NodeKind {
    /// Short lowercase tag for the kind ("controller", "server", …).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Controller { .. } => "controller",
            Self::Server { .. } => "server",
            Self::Client { .. } => "client",
            Self::Landing { .. } => "landing",
            Self::User { .. } => "user",
        }
    }

    /// The fixed adjacency table: may a node of this kind point at `target`?
    pub fn may_target(&self, target: &NodeKind) -> bool {
        matches!(
            (self, target),
            (Self::Controller { .. }, Self::Server { .. } | Self::Client { .. })
                | (Self::User { .. }, Self::Client { .. })
                | (Self::Client { .. }, Self::Server { .. } | Self::Landing { .. })
                | (Self::Server { .. }, Self::Client { .. } | Self::Landing { .. })
        )
    }

    /// Server with the stock listen addresses.
    pub fn server_defaults() -> Self {
        Self::Server {
            tunnel_address: "0.0.0.0:10001".into(),
            target_address: "0.0.0.0:8080".into(),
            log_level: LogLevel::Info,
            tls_mode: TlsMode::SelfSigned,
            crt_path: String::new(),
            key_path: String::new(),
        }
    }

    /// Client with the stock dial addresses.
    pub fn client_defaults() -> Self {
        Self::Client {
            tunnel_address: "server.host:10001".into(),
            target_address: "127.0.0.1:8000".into(),
            log_level: LogLevel::Info,
            managing_api_id: None,
            managing_api_name: None,
        }
    }

    /// Client pre-owned by a controller reference (palette drop after a
    /// controller already exists on the canvas).
    pub fn managed_client(api_id: impl Into<String>, api_name: impl Into<String>) -> Self {
        Self::Client {
            tunnel_address: "server.host:10001".into(),
            target_address: "127.0.0.1:8000".into(),
            log_level: LogLevel::Info,
            managing_api_id: Some(api_id.into()),
            managing_api_name: Some(api_name.into()),
        }
    }

    /// Landing node with both fields blank (user fills them in).
    pub fn landing_defaults() -> Self {
        Self::Landing {
            landing_ip: String::new(),
            landing_port: String::new(),
        }
    }

    /// User-origin marker.
    pub fn user_defaults() -> Self {
        Self::User {
            description: String::new(),
        }
    }

    /// Default canvas size for this kind.
    pub fn default_size(&self) -> NodeSize {
        match self {
            Self::Controller { .. } => NodeSize {
                width: CONTROLLER_NODE_WIDTH,
                height: CONTROLLER_NODE_HEIGHT,
            },
            _ => NodeSize {
                width: NODE_DEFAULT_WIDTH,
                height: NODE_DEFAULT_HEIGHT,
            },
        }
    }
}

// ── Geometry ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSize {
    pub width: f64,
    pub height: f64,
}

// ── Node ────────────────────────────────────────────────────────────

/// One typed entity on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub position: Point,
    pub size: NodeSize,
    /// Outcome of the last provisioning attempt. Transient.
    #[serde(skip)]
    pub status_info: Option<String>,
    /// Derived by chain selection. Transient.
    #[serde(skip)]
    pub chain_highlighted: bool,
}

impl Node {
    /// True for kinds that compile into an instruction (server or client).
    pub fn is_endpoint(&self) -> bool {
        matches!(self.kind, NodeKind::Server { .. } | NodeKind::Client { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_table_accepts_listed_pairs() {
        let controller = NodeKind::Controller {
            api_id: "a".into(),
            api_name: "A".into(),
            role: ControllerRole::General,
        };
        assert!(controller.may_target(&NodeKind::server_defaults()));
        assert!(controller.may_target(&NodeKind::client_defaults()));
        assert!(NodeKind::user_defaults().may_target(&NodeKind::client_defaults()));
        assert!(NodeKind::client_defaults().may_target(&NodeKind::server_defaults()));
        assert!(NodeKind::client_defaults().may_target(&NodeKind::landing_defaults()));
        assert!(NodeKind::server_defaults().may_target(&NodeKind::client_defaults()));
        assert!(NodeKind::server_defaults().may_target(&NodeKind::landing_defaults()));
    }

    #[test]
    fn adjacency_table_rejects_everything_else() {
        let kinds = [
            NodeKind::Controller {
                api_id: "a".into(),
                api_name: "A".into(),
                role: ControllerRole::General,
            },
            NodeKind::server_defaults(),
            NodeKind::client_defaults(),
            NodeKind::landing_defaults(),
            NodeKind::user_defaults(),
        ];
        let allowed = [
            ("controller", "server"),
            ("controller", "client"),
            ("user", "client"),
            ("client", "server"),
            ("client", "landing"),
            ("server", "client"),
            ("server", "landing"),
        ];
        for source in &kinds {
            for target in &kinds {
                let expected = allowed.contains(&(source.tag(), target.tag()));
                assert_eq!(
                    source.may_target(target),
                    expected,
                    "{} -> {}",
                    source.tag(),
                    target.tag()
                );
            }
        }
    }

    #[test]
    fn wire_forms() {
        assert_eq!(LogLevel::Master.as_str(), "master");
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(TlsMode::Off.as_str(), "0");
        assert_eq!(TlsMode::Custom.as_str(), "2");
    }
}
