//! Snapshot command handler.
//!
//! Prints the merged cluster view as JSON, once or on every refresh.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use serde::Serialize;

use crate::core::cluster::{
    correlate, ClassifiedNode, ClusterMetrics, ClusterRuntime, ClusterSnapshot, ClusterSource,
    HttpClusterSource, OutletMapping, PowerSummary, SourceStatus, TopologyGraph, TopologyState,
};
use crate::core::Config;

const POLL_STEP: Duration = Duration::from_millis(50);
/// Sources of one tick answer close together; wait this long so a watch
/// line carries all of them.
const WATCH_SETTLE: Duration = Duration::from_millis(250);

#[derive(Debug, Serialize)]
pub struct NodeReport<'a> {
    #[serde(flatten)]
    pub node: &'a ClassifiedNode,
    pub power: Option<PowerSummary>,
}

#[derive(Debug, Serialize)]
pub struct SourcesReport<'a> {
    pub nodes: &'a SourceStatus,
    pub power: &'a SourceStatus,
    pub metrics: &'a SourceStatus,
}

/// JSON document printed by the snapshot command
#[derive(Debug, Serialize)]
pub struct SnapshotReport<'a> {
    pub timestamp: i64,
    pub metrics: Option<&'a ClusterMetrics>,
    pub nodes: Vec<NodeReport<'a>>,
    pub topology: TopologyGraph,
    pub sources: SourcesReport<'a>,
}

impl<'a> SnapshotReport<'a> {
    pub fn build(snapshot: &'a ClusterSnapshot, mapping: &OutletMapping) -> Self {
        let nodes = snapshot
            .nodes
            .iter()
            .map(|node| NodeReport {
                node,
                power: correlate(&node.id, mapping, &snapshot.readings),
            })
            .collect();

        Self {
            timestamp: snapshot.timestamp,
            metrics: snapshot.metrics.as_ref(),
            nodes,
            topology: TopologyState::new(snapshot.nodes.clone()).graph(),
            sources: SourcesReport {
                nodes: &snapshot.nodes_status,
                power: &snapshot.outlets_status,
                metrics: &snapshot.metrics_status,
            },
        }
    }
}

/// Execute the snapshot command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?;
    let watch = matches.get_flag("watch");
    let pretty = matches.get_flag("pretty");

    let source: Arc<dyn ClusterSource> = Arc::new(
        HttpClusterSource::new(
            &config.resource_manager_url,
            &config.power_url,
            config.request_timeout(),
        )
        .context("Failed to create HTTP client")?,
    );
    let runtime =
        ClusterRuntime::new(source, config.refresh()).context("Failed to start pollers")?;

    let result = if watch {
        watch_snapshots(&runtime, &config, pretty)
    } else {
        single_snapshot(&runtime, &config, pretty)
    };

    runtime.shutdown();
    result
}

fn single_snapshot(runtime: &ClusterRuntime, config: &Config, pretty: bool) -> Result<()> {
    // First tick fires after the debounce window, then each request may time out
    let deadline = Instant::now() + config.refresh().debounce + config.request_timeout() * 2;
    let snapshot_rx = &runtime.snapshot_rx;

    while !snapshot_rx.borrow().all_answered() && Instant::now() < deadline {
        thread::sleep(POLL_STEP);
    }

    let snapshot = snapshot_rx.borrow().clone();
    if !snapshot.all_answered() {
        log::warn!("Not every source answered before the deadline");
    }
    for (source, error) in snapshot.errors() {
        eprintln!("{} {}: {}", "warning:".yellow().bold(), source, error);
    }

    print_snapshot(&snapshot, &config.outlet_mapping(), pretty)
}

fn watch_snapshots(runtime: &ClusterRuntime, config: &Config, pretty: bool) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    eprintln!("{}", "Watching cluster, press Ctrl+C to stop".dimmed());

    let mapping = config.outlet_mapping();
    let mut snapshot_rx = runtime.snapshot_rx.clone();

    while running.load(Ordering::Relaxed) {
        if !snapshot_rx.has_changed().unwrap_or(false) {
            thread::sleep(POLL_STEP);
            continue;
        }

        thread::sleep(WATCH_SETTLE);
        let snapshot = snapshot_rx.borrow_and_update().clone();
        print_snapshot(&snapshot, &mapping, pretty)?;
    }

    Ok(())
}

fn print_snapshot(snapshot: &ClusterSnapshot, mapping: &OutletMapping, pretty: bool) -> Result<()> {
    let report = SnapshotReport::build(snapshot, mapping);
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);
    Ok(())
}
