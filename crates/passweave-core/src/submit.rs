// ── Submission batch ──
//
// Executes a plan against the controllers' management APIs. All requests
// for all groups run concurrently and settle independently: one rejected
// instruction never aborts the batch, it just marks its node. The sender
// is a generic async closure so the batch logic tests without a network.

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use secrecy::SecretString;
use tracing::{info, warn};
use url::Url;

use passweave_api::ProvisionClient;

use crate::config::EndpointDirectory;
use crate::error::CoreError;
use crate::graph::TopologyGraph;
use crate::model::NodeId;
use crate::plan::SubmissionPlan;

/// Per-node status strings written back onto the graph as results settle.
pub const STATUS_PROCESSING: &str = "processing…";
pub const STATUS_FAILED: &str = "submit failed";
pub const STATUS_MISCONFIGURED: &str = "endpoint misconfigured";

/// Outcome tallies for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Nodes the planner already excluded (diagnostics, not submitted).
    pub skipped: usize,
}

/// Execute a plan with a caller-supplied sender.
///
/// The sender receives the group's API root, its bearer token, and one
/// compiled instruction, and resolves to the created instance id. Every
/// planned node is marked processing up front; each settles to its final
/// status as its request completes, in whatever order the endpoints answer.
///
/// Groups whose controller has no configured API root or token fail whole
/// without a single request going out.
pub async fn submit_plan<F, Fut>(
    graph: &mut TopologyGraph,
    plan: &SubmissionPlan,
    directory: &dyn EndpointDirectory,
    send: F,
) -> Result<BatchReport, CoreError>
where
    F: Fn(Url, SecretString, String) -> Fut,
    Fut: Future<Output = Result<String, CoreError>>,
{
    if plan.is_empty() {
        return Err(CoreError::NothingToSubmit);
    }

    let mut report = BatchReport {
        skipped: plan.skipped.len(),
        ..BatchReport::default()
    };

    for node_id in plan.planned_node_ids() {
        graph.set_status(node_id, STATUS_PROCESSING);
    }

    let mut in_flight: FuturesUnordered<_> = FuturesUnordered::new();

    for group in plan.groups.values() {
        let (Some(api_url), Some(token)) =
            (directory.api_url(&group.api_id), directory.token(&group.api_id))
        else {
            warn!(
                api_id = %group.api_id,
                nodes = group.instructions.len(),
                "controller endpoint has no API root or token; group failed"
            );
            for planned in &group.instructions {
                graph.set_status(planned.node_id, STATUS_MISCONFIGURED);
            }
            report.failed += group.instructions.len();
            continue;
        };

        info!(
            api_id = %group.api_id,
            nodes = group.instructions.len(),
            "submitting instruction group"
        );
        for planned in &group.instructions {
            let fut = send(api_url.clone(), token.clone(), planned.instruction.clone());
            let node_id = planned.node_id;
            in_flight.push(async move { (node_id, fut.await) });
        }
    }

    while let Some((node_id, outcome)) = in_flight.next().await {
        match outcome {
            Ok(instance_id) => {
                graph.set_status(node_id, format!("submitted (id: {instance_id})"));
                report.succeeded += 1;
            }
            Err(err) => {
                warn!(node = %node_id, error = %err, "instance submission failed");
                graph.set_status(node_id, STATUS_FAILED);
                report.failed += 1;
            }
        }
    }

    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped,
        "submission batch settled"
    );
    Ok(report)
}

/// Execute a plan over HTTP: one bearer-authenticated client per group,
/// one instance-creation request per instruction.
pub async fn submit_batch(
    graph: &mut TopologyGraph,
    plan: &SubmissionPlan,
    directory: &dyn EndpointDirectory,
) -> Result<BatchReport, CoreError> {
    submit_plan(graph, plan, directory, |api_url, token, instruction| async move {
        let client = ProvisionClient::from_token(api_url.as_str(), &token)?;
        let created = client.create_instance(&instruction).await?;
        Ok(created.id)
    })
    .await
}

/// Convenience for a node's settled status after a batch.
pub fn node_status(graph: &TopologyGraph, id: NodeId) -> Option<&str> {
    graph.node(id).and_then(|n| n.status_info.as_deref())
}
