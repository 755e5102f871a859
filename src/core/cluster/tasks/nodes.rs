//! Node inventory polling task.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use super::{drive, SourceKind, SourceUpdate};
use crate::core::cluster::capability::classify_all;
use crate::core::cluster::refresh::RefreshTick;
use crate::core::cluster::source::ClusterSource;

/// Fetch `/ws/v1/cluster/nodes` on every tick and classify each node.
pub async fn nodes_task(
    source: Arc<dyn ClusterSource>,
    ticks: broadcast::Receiver<RefreshTick>,
    update_tx: mpsc::Sender<SourceUpdate>,
    shutdown: broadcast::Receiver<()>,
) {
    drive(SourceKind::Nodes, ticks, shutdown, move |tick| {
        let source = source.clone();
        let update_tx = update_tx.clone();
        async move {
            let update = match source.fetch_nodes().await {
                Ok(raw) => SourceUpdate::Nodes {
                    tick: tick.seq,
                    nodes: classify_all(&raw),
                },
                Err(e) => {
                    log::warn!("Node inventory fetch failed: {}", e);
                    SourceUpdate::Failed {
                        kind: SourceKind::Nodes,
                        tick: tick.seq,
                        error: e.to_string(),
                    }
                }
            };
            // Only fails once the orchestrator is gone
            let _ = update_tx.send(update).await;
        }
    })
    .await
}
