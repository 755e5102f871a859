//! Shared fixtures: an in-memory cluster standing in for YARN and the PDU.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use clustertop::core::cluster::{ClusterMetrics, ClusterSource, OutletReadings, RawNode};
use clustertop::{ClusterTopError, Result};
use futures_util::future::BoxFuture;
use serde_json::{json, Value};

/// Decode a node the way the HTTP source would.
pub fn raw_node(value: Value) -> RawNode {
    serde_json::from_value(value).unwrap()
}

pub fn gpu_node(id: &str) -> RawNode {
    raw_node(json!({
        "id": id,
        "state": "RUNNING",
        "nodeHostName": id.split(':').next().unwrap_or(id),
        "numContainers": 1,
        "availableResource": {"resourceInformations": {"resourceInformation": [
            {"name": "vcores", "value": 6},
            {"name": "yarn.io/gpu", "value": 1}
        ]}},
        "usedResource": {"resourceInformations": {"resourceInformation": [
            {"name": "vcores", "value": 2},
            {"name": "yarn.io/gpu", "value": 0}
        ]}}
    }))
}

#[derive(Default)]
pub struct FakeCluster {
    pub nodes: Mutex<Vec<RawNode>>,
    pub readings: Mutex<Value>,
    /// Per-call latency of the node endpoint, popped front first
    pub node_delays: Mutex<VecDeque<Duration>>,
    /// Per-call answers of the node endpoint, popped front first
    pub node_answers: Mutex<VecDeque<Vec<RawNode>>>,
    pub fail_nodes: AtomicBool,
    pub node_calls: AtomicUsize,
    pub outlet_calls: AtomicUsize,
    pub metric_calls: AtomicUsize,
}

impl FakeCluster {
    pub fn with_nodes(nodes: Vec<RawNode>, readings: Value) -> Self {
        Self {
            nodes: Mutex::new(nodes),
            readings: Mutex::new(readings),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.node_calls.load(Ordering::SeqCst),
            self.outlet_calls.load(Ordering::SeqCst),
            self.metric_calls.load(Ordering::SeqCst),
        )
    }
}

impl ClusterSource for FakeCluster {
    fn fetch_nodes(&self) -> BoxFuture<'_, Result<Vec<RawNode>>> {
        Box::pin(async move {
            self.node_calls.fetch_add(1, Ordering::SeqCst);
            let delay = self.node_delays.lock().unwrap().pop_front();
            let answer = self.node_answers.lock().unwrap().pop_front();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_nodes.load(Ordering::SeqCst) {
                return Err(ClusterTopError::status("/ws/v1/cluster/nodes", 503));
            }
            Ok(answer.unwrap_or_else(|| self.nodes.lock().unwrap().clone()))
        })
    }

    fn fetch_outlets(&self) -> BoxFuture<'_, Result<OutletReadings>> {
        Box::pin(async move {
            self.outlet_calls.fetch_add(1, Ordering::SeqCst);
            Ok(OutletReadings::from_json(&self.readings.lock().unwrap()))
        })
    }

    fn fetch_cluster_metrics(&self) -> BoxFuture<'_, Result<ClusterMetrics>> {
        Box::pin(async move {
            self.metric_calls.fetch_add(1, Ordering::SeqCst);
            let nodes = self.nodes.lock().unwrap().len() as u64;
            Ok(ClusterMetrics {
                total_nodes: nodes,
                active_nodes: nodes,
                ..Default::default()
            })
        })
    }
}
