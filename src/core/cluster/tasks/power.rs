//! Power telemetry polling task.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use super::{drive, SourceKind, SourceUpdate};
use crate::core::cluster::refresh::RefreshTick;
use crate::core::cluster::source::ClusterSource;

pub async fn power_task(
    source: Arc<dyn ClusterSource>,
    ticks: broadcast::Receiver<RefreshTick>,
    update_tx: mpsc::Sender<SourceUpdate>,
    shutdown: broadcast::Receiver<()>,
) {
    drive(SourceKind::Outlets, ticks, shutdown, move |tick| {
        let source = source.clone();
        let update_tx = update_tx.clone();
        async move {
            let update = match source.fetch_outlets().await {
                Ok(readings) => SourceUpdate::Outlets {
                    tick: tick.seq,
                    readings,
                },
                Err(e) => {
                    log::warn!("Power telemetry fetch failed: {}", e);
                    SourceUpdate::Failed {
                        kind: SourceKind::Outlets,
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
