// ── Propagation engine ──
//
// Runs exactly once per successful edge creation. The only rule today:
// a server→client edge pushes the server's effective listen address into
// the client's tunnel_address. Wildcard listen hosts are substituted with
// the host of the server's owning controller API root. Every missing step
// degrades (warn + keep going) rather than failing the connect.

use tracing::{info, warn};

use crate::addr::{bracket_if_ipv6, extract_host, extract_port};
use crate::config::EndpointDirectory;
use crate::graph::TopologyGraph;
use crate::model::{EdgeId, NodeId, NodeKind};

/// React to a freshly created edge. Mutates at most the target client's
/// `tunnel_address`, and only when the derived value differs.
pub(crate) fn on_edge_created(
    graph: &mut TopologyGraph,
    edge_id: EdgeId,
    directory: &dyn EndpointDirectory,
) {
    let Some(edge) = graph.edge(edge_id) else {
        return;
    };
    let (source, target) = (edge.source, edge.target);

    let (Some(server), Some(client)) = (graph.node(source), graph.node(target)) else {
        return;
    };
    if !matches!(server.kind, NodeKind::Server { .. })
        || !matches!(client.kind, NodeKind::Client { .. })
    {
        return;
    }

    let Some(derived) = derived_client_tunnel(graph, source, directory) else {
        return;
    };

    let changed = match graph.node(target).map(|n| &n.kind) {
        Some(NodeKind::Client { tunnel_address, .. }) => *tunnel_address != derived,
        _ => false,
    };
    if !changed {
        return;
    }

    if let Some(node) = graph.node_mut(target) {
        if let NodeKind::Client { tunnel_address, .. } = &mut node.kind {
            info!(client = %target, address = %derived, "client tunnel address auto-filled");
            *tunnel_address = derived;
        }
    }
}

/// Derive the tunnel address a client should dial to reach `server_id`.
///
/// `None` means the server's listen port could not be extracted — the
/// caller must leave the client untouched.
pub fn derived_client_tunnel(
    graph: &TopologyGraph,
    server_id: NodeId,
    directory: &dyn EndpointDirectory,
) -> Option<String> {
    let server = graph.node(server_id)?;
    let NodeKind::Server { tunnel_address, .. } = &server.kind else {
        return None;
    };

    let Some(port) = extract_port(tunnel_address) else {
        warn!(
            server = %server.label,
            address = %tunnel_address,
            "no port in server tunnel address; client tunnel not auto-filled"
        );
        return None;
    };

    let listen_host = extract_host(tunnel_address);
    let is_wildcard = matches!(listen_host.as_deref(), Some("0.0.0.0" | "::") | None);
    let effective_host = if is_wildcard {
        controller_api_host(graph, server_id, directory).or(listen_host)
    } else {
        listen_host
    };

    let address = match effective_host {
        Some(host) => format!("{}:{port}", bracket_if_ipv6(&host)),
        // Empty host segment: still a dialable template the user can fix up.
        None => format!(":{port}"),
    };
    Some(address)
}

/// Host of the API root of the controller directly managing `server_id`.
fn controller_api_host(
    graph: &TopologyGraph,
    server_id: NodeId,
    directory: &dyn EndpointDirectory,
) -> Option<String> {
    let controller = graph
        .edges()
        .filter(|e| e.target == server_id)
        .filter_map(|e| graph.node(e.source))
        .find(|n| matches!(n.kind, NodeKind::Controller { .. }));

    let Some(controller) = controller else {
        warn!(server = %server_id, "server is not managed by a controller; keeping wildcard host");
        return None;
    };
    let NodeKind::Controller { api_id, api_name, .. } = &controller.kind else {
        return None;
    };

    let Some(api_url) = directory.api_url(api_id) else {
        warn!(controller = %api_name, "no API root configured for controller");
        return None;
    };

    let host = extract_host(api_url.as_str());
    if host.is_none() {
        warn!(controller = %api_name, url = %api_url, "could not extract host from controller API root");
    }
    host
}
