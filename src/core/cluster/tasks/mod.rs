//! Polling tasks, one per remote source.
//!
//! Every task listens to the shared refresh signal and spawns its fetch
//! without awaiting it, so a slow response never delays the next tick.
//! Results are forwarded to the orchestrator as they arrive.

mod metrics;
mod nodes;
mod power;

pub use metrics::cluster_metrics_task;
pub use nodes::nodes_task;
pub use power::power_task;

use std::fmt;
use std::future::Future;

use tokio::sync::broadcast::{self, error::RecvError};

use super::capability::ClassifiedNode;
use super::outlet::OutletReadings;
use super::refresh::RefreshTick;
use super::resources::ClusterMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Nodes,
    Outlets,
    Metrics,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Nodes => "node inventory",
            SourceKind::Outlets => "power telemetry",
            SourceKind::Metrics => "cluster metrics",
        };
        f.write_str(name)
    }
}

/// Updates sent from polling tasks to the orchestrator.
#[derive(Debug, Clone)]
pub enum SourceUpdate {
    /// Classified node inventory
    Nodes { tick: u64, nodes: Vec<ClassifiedNode> },

    /// Complete power telemetry payload
    Outlets { tick: u64, readings: OutletReadings },

    /// YARN cluster-wide counters
    Metrics { tick: u64, metrics: ClusterMetrics },

    /// A fetch failed; prior data for that source stays in place
    Failed {
        kind: SourceKind,
        tick: u64,
        error: String,
    },
}

/// Run `fetch` for every refresh tick until shutdown.
async fn drive<F, Fut>(
    kind: SourceKind,
    mut ticks: broadcast::Receiver<RefreshTick>,
    mut shutdown: broadcast::Receiver<()>,
    fetch: F,
) where
    F: Fn(RefreshTick) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        tokio::select! {
            tick = ticks.recv() => match tick {
                Ok(tick) => {
                    log::trace!("Fetching {} for tick {}", kind, tick.seq);
                    tokio::spawn(fetch(tick));
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("{} poller skipped {} refresh ticks", kind, skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = shutdown.recv() => {
                log::debug!("{} poller shutting down", kind);
                break;
            }
        }
    }
}
