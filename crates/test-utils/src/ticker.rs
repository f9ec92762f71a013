use std::time::Duration;

use sheepdog::engine::{Supervisor, SupervisorEvent};
use sheepdog::process::ProcessNode;
use sheepdog::types::NodeId;

/// How often the helpers below tick while waiting.
pub const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long the helpers below wait before giving up.
pub const DEADLINE: Duration = Duration::from_secs(5);

/// Tick `node` (as its owner would on each timer) until `done` holds.
///
/// Returns `false` if [`DEADLINE`] passed first.
pub async fn tick_node_until<F>(node: &mut ProcessNode, mut done: F) -> bool
where
    F: FnMut(&ProcessNode) -> bool,
{
    let deadline = tokio::time::Instant::now() + DEADLINE;
    loop {
        node.tick();
        if done(node) {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Every node id in the forest, depth first.
pub fn all_node_ids(supervisor: &Supervisor) -> Vec<NodeId> {
    supervisor
        .visible_nodes(|_| true)
        .into_iter()
        .map(|v| v.node.id())
        .collect()
}

/// Deliver one tick to every node of the forest.
pub fn tick_all(supervisor: &mut Supervisor) {
    for id in all_node_ids(supervisor) {
        supervisor.update(SupervisorEvent::Tick(id));
    }
}

/// Tick the whole forest until `done` holds.
///
/// Returns `false` if [`DEADLINE`] passed first.
pub async fn tick_supervisor_until<F>(supervisor: &mut Supervisor, mut done: F) -> bool
where
    F: FnMut(&Supervisor) -> bool,
{
    let deadline = tokio::time::Instant::now() + DEADLINE;
    loop {
        tick_all(supervisor);
        if done(supervisor) {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
