//! Tokio runtime and orchestrator for cluster polling.
//!
//! The refresh coordinator, one polling task per source and the
//! orchestrator all run as cooperative tasks. The orchestrator owns the
//! merged snapshot and publishes immutable copies through a watch channel.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};

use super::refresh::{RefreshConfig, RefreshCoordinator, RefreshTick, RefreshTrigger};
use super::snapshot::ClusterSnapshot;
use super::source::ClusterSource;
use super::tasks::{cluster_metrics_task, nodes_task, power_task, SourceKind, SourceUpdate};
use crate::error::{ClusterTopError, Result};

const UPDATE_QUEUE_SIZE: usize = 32;

/// The polling pipeline, spawned on the current Tokio runtime.
pub struct ClusterPipeline {
    /// Receiver for merged snapshots
    pub snapshot_rx: watch::Receiver<Arc<ClusterSnapshot>>,
    coordinator: RefreshCoordinator,
    shutdown_tx: broadcast::Sender<()>,
}

impl ClusterPipeline {
    /// Spawn coordinator, pollers and orchestrator. Must be called from
    /// within a Tokio runtime.
    pub fn spawn(source: Arc<dyn ClusterSource>, refresh: RefreshConfig) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(ClusterSnapshot::default()));
        let (update_tx, update_rx) = mpsc::channel::<SourceUpdate>(UPDATE_QUEUE_SIZE);
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let coordinator = RefreshCoordinator::start(refresh);

        tokio::spawn(orchestrator_task(
            update_rx,
            snapshot_tx,
            shutdown_tx.subscribe(),
        ));

        tokio::spawn(nodes_task(
            source.clone(),
            coordinator.subscribe(),
            update_tx.clone(),
            shutdown_tx.subscribe(),
        ));

        tokio::spawn(power_task(
            source.clone(),
            coordinator.subscribe(),
            update_tx.clone(),
            shutdown_tx.subscribe(),
        ));

        tokio::spawn(cluster_metrics_task(
            source,
            coordinator.subscribe(),
            update_tx,
            shutdown_tx.subscribe(),
        ));

        log::debug!(
            "Cluster pipeline started (interval {:?}, debounce {:?})",
            refresh.interval,
            refresh.debounce
        );

        Self {
            snapshot_rx,
            coordinator,
            shutdown_tx,
        }
    }

    pub fn trigger(&self) -> RefreshTrigger {
        self.coordinator.trigger()
    }

    pub fn force_refresh(&self) {
        self.coordinator.force_refresh();
    }

    pub fn subscribe_ticks(&self) -> broadcast::Receiver<RefreshTick> {
        self.coordinator.subscribe()
    }

    pub fn shutdown(&self) {
        self.coordinator.shutdown();
        let _ = self.shutdown_tx.send(());
    }
}

/// Owns a dedicated single-worker Tokio runtime for synchronous callers
/// such as the terminal UI.
pub struct ClusterRuntime {
    pub snapshot_rx: watch::Receiver<Arc<ClusterSnapshot>>,
    pipeline: ClusterPipeline,
    _runtime: tokio::runtime::Runtime,
}

impl ClusterRuntime {
    pub fn new(source: Arc<dyn ClusterSource>, refresh: RefreshConfig) -> Result<Self> {
        // One worker: all poller state is touched by a single thread
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .thread_name("cluster-poller")
            .build()
            .map_err(|e| ClusterTopError::runtime(format!("failed to build runtime: {}", e)))?;

        let pipeline = {
            let _guard = runtime.enter();
            ClusterPipeline::spawn(source, refresh)
        };

        Ok(Self {
            snapshot_rx: pipeline.snapshot_rx.clone(),
            pipeline,
            _runtime: runtime,
        })
    }

    pub fn trigger(&self) -> RefreshTrigger {
        self.pipeline.trigger()
    }

    pub fn force_refresh(&self) {
        self.pipeline.force_refresh();
    }

    /// Shutdown the pollers; the runtime itself stops when dropped.
    pub fn shutdown(self) {
        log::debug!("Shutting down cluster runtime");
        self.pipeline.shutdown();
    }
}

/// Apply one update to the snapshot. Last write wins: a late answer for an
/// older tick still replaces fresher data.
pub fn apply_update(snapshot: &mut ClusterSnapshot, update: SourceUpdate, now: i64) {
    match update {
        SourceUpdate::Nodes { tick, nodes } => {
            snapshot.nodes = nodes;
            snapshot.nodes_status.record_success(tick, now);
        }
        SourceUpdate::Outlets { tick, readings } => {
            snapshot.readings = readings;
            snapshot.outlets_status.record_success(tick, now);
        }
        SourceUpdate::Metrics { tick, metrics } => {
            snapshot.metrics = Some(metrics);
            snapshot.metrics_status.record_success(tick, now);
        }
        SourceUpdate::Failed { kind, tick, error } => {
            log::debug!("Keeping previous {} data after failed tick {}", kind, tick);
            let status = match kind {
                SourceKind::Nodes => &mut snapshot.nodes_status,
                SourceKind::Outlets => &mut snapshot.outlets_status,
                SourceKind::Metrics => &mut snapshot.metrics_status,
            };
            status.record_failure(error);
        }
    }
    snapshot.timestamp = now;
}

async fn orchestrator_task(
    mut update_rx: mpsc::Receiver<SourceUpdate>,
    snapshot_tx: watch::Sender<Arc<ClusterSnapshot>>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut current_snapshot = ClusterSnapshot::default();

    loop {
        tokio::select! {
            Some(update) = update_rx.recv() => {
                apply_update(&mut current_snapshot, update, chrono::Utc::now().timestamp());

                // watch::send() only fails if there are no receivers (which is fine)
                let _ = snapshot_tx.send(Arc::new(current_snapshot.clone()));
            }
            _ = shutdown.recv() => {
                log::debug!("Orchestrator task shutting down");
                break;
            }
        }
    }
}
