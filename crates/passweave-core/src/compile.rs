// ── Connection-string compiler ──
//
// Derives the single instruction string that provisions one endpoint node:
// `<kind>://<tunnel>/<target>?params`. Pure over a graph snapshot — the
// landing-node target substitution reads edges but nothing is mutated.

use url::form_urlencoded;

use crate::addr::bracket_if_ipv6;
use crate::graph::TopologyGraph;
use crate::model::{LogLevel, Node, NodeKind, TlsMode};

/// Compile the provisioning instruction for a server or client node.
///
/// Returns `None` for non-endpoint kinds and for endpoints missing a
/// tunnel or target address. Query parameters are appended only when they
/// deviate from the inherited (`master`) defaults.
pub fn instruction_for(node: &Node, graph: &TopologyGraph) -> Option<String> {
    let (kind_tag, tunnel, target, log_level, tls) = match &node.kind {
        NodeKind::Server {
            tunnel_address,
            target_address,
            log_level,
            tls_mode,
            crt_path,
            key_path,
        } => (
            "server",
            tunnel_address,
            target_address,
            *log_level,
            Some((*tls_mode, crt_path.as_str(), key_path.as_str())),
        ),
        NodeKind::Client {
            tunnel_address,
            target_address,
            log_level,
            ..
        } => ("client", tunnel_address, target_address, *log_level, None),
        _ => return None,
    };

    if tunnel.is_empty() || target.is_empty() {
        return None;
    }

    let effective_target = landing_target(node, graph).unwrap_or_else(|| target.clone());
    let base = format!("{kind_tag}://{tunnel}/{effective_target}");

    let mut params = form_urlencoded::Serializer::new(String::new());
    let mut any = false;

    if log_level != LogLevel::Master {
        params.append_pair("log", log_level.as_str());
        any = true;
    }

    if let Some((tls_mode, crt_path, key_path)) = tls {
        if tls_mode != TlsMode::Master {
            params.append_pair("tls", tls_mode.as_str());
            any = true;
            if tls_mode == TlsMode::Custom {
                let crt = crt_path.trim();
                if !crt.is_empty() {
                    params.append_pair("crt", crt);
                }
                let key = key_path.trim();
                if !key.is_empty() {
                    params.append_pair("key", key);
                }
            }
        }
    }

    if any {
        Some(format!("{base}?{}", params.finish()))
    } else {
        Some(base)
    }
}

/// Target-address override: the *first* outgoing landing edge decides.
/// If that landing node has both ip and port the override applies; if it
/// is incomplete there is no override, even when a later landing edge
/// would qualify. IPv6 landing IPs are bracketed.
fn landing_target(node: &Node, graph: &TopologyGraph) -> Option<String> {
    let landing = graph
        .edges()
        .filter(|e| e.source == node.id)
        .filter_map(|e| graph.node(e.target))
        .find(|target| matches!(target.kind, NodeKind::Landing { .. }))?;

    match &landing.kind {
        NodeKind::Landing {
            landing_ip,
            landing_port,
        } if !landing_ip.is_empty() && !landing_port.is_empty() => {
            Some(format!("{}:{landing_port}", bracket_if_ipv6(landing_ip)))
        }
        _ => None,
    }
}
