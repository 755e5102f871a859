//! Cluster metrics polling task.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use super::{drive, SourceKind, SourceUpdate};
use crate::core::cluster::refresh::RefreshTick;
use crate::core::cluster::source::ClusterSource;

pub async fn cluster_metrics_task(
    source: Arc<dyn ClusterSource>,
    ticks: broadcast::Receiver<RefreshTick>,
    update_tx: mpsc::Sender<SourceUpdate>,
    shutdown: broadcast::Receiver<()>,
) {
    drive(SourceKind::Metrics, ticks, shutdown, move |tick| {
        let source = source.clone();
        let update_tx = update_tx.clone();
        async move {
            let update = match source.fetch_cluster_metrics().await {
                Ok(metrics) => SourceUpdate::Metrics {
                    tick: tick.seq,
                    metrics,
                },
                Err(e) => {
                    log::warn!("Cluster metrics fetch failed: {}", e);
                    SourceUpdate::Failed {
                        kind: SourceKind::Metrics,
                        tick: tick.seq,
                        error: e.to_string(),
                    }
                }
            };
            let _ = update_tx.send(update).await;
        }
    })
    .await
}
