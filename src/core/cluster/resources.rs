//! Wire types for the YARN ResourceManager REST API.
//!
//! Every field is defaulted so that one malformed node never prevents the
//! rest of the inventory from decoding. Node entries are decoded one by one;
//! an entry whose inventories do not decode keeps its identity with empty
//! inventories.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Quantities arrive as numbers, but some exporters quote them.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

fn lenient_nodes<'de, D>(deserializer: D) -> Result<Vec<RawNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<Value> = null_as_default(deserializer)?;
    Ok(entries.into_iter().filter_map(RawNode::from_value).collect())
}

/// One typed resource line (vcores, gpu, fpga, memory...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeResourceRecord {
    pub name: String,
    #[serde(deserialize_with = "lenient_quantity")]
    pub value: f64,
    pub units: String,
    pub resource_type: Option<String>,
    pub minimum_allocation: Option<f64>,
    pub maximum_allocation: Option<f64>,
}

impl NodeResourceRecord {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceInformations {
    #[serde(deserialize_with = "null_as_default")]
    pub resource_information: Vec<NodeResourceRecord>,
}

/// Aggregated resource block of a node (`availableResource` / `usedResource`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeResource {
    pub memory: f64,
    pub v_cores: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub resource_informations: ResourceInformations,
}

impl NodeResource {
    pub fn records(&self) -> &[NodeResourceRecord] {
        &self.resource_informations.resource_information
    }

    pub fn from_records(records: Vec<NodeResourceRecord>) -> Self {
        Self {
            resource_informations: ResourceInformations {
                resource_information: records,
            },
            ..Default::default()
        }
    }
}

/// A node descriptor as reported by `/ws/v1/cluster/nodes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawNode {
    pub id: String,
    pub rack: String,
    pub state: String,
    pub node_host_name: String,
    #[serde(rename = "nodeHTTPAddress")]
    pub node_http_address: String,
    pub last_health_update: i64,
    pub version: String,
    pub health_report: String,
    pub num_containers: u32,
    #[serde(rename = "usedMemoryMB")]
    pub used_memory_mb: f64,
    #[serde(rename = "availMemoryMB")]
    pub avail_memory_mb: f64,
    pub used_virtual_cores: f64,
    pub available_virtual_cores: f64,
    pub available_resource: Option<NodeResource>,
    pub used_resource: Option<NodeResource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeList {
    #[serde(deserialize_with = "lenient_nodes")]
    pub node: Vec<RawNode>,
}

impl RawNode {
    /// Decode one entry of the node list.
    ///
    /// Entries that are not objects are skipped. When the entry does not
    /// decode, its resource inventories are dropped and decoding is retried;
    /// failing that, only the id is kept.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            log::warn!("Skipping node entry that is not an object: {}", value);
            return None;
        }

        let error = match serde_json::from_value::<RawNode>(value.clone()) {
            Ok(node) => return Some(node),
            Err(e) => e,
        };

        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        log::warn!("Node {} has a malformed record, ignoring its inventories: {}", id, error);

        let mut stripped = value;
        if let Some(object) = stripped.as_object_mut() {
            object.remove("availableResource");
            object.remove("usedResource");
        }

        Some(serde_json::from_value(stripped).unwrap_or_else(|_| RawNode {
            id,
            ..Default::default()
        }))
    }
}

/// Top-level document of `/ws/v1/cluster/nodes`.
///
/// YARN answers `{"nodes": null}` when no NodeManager is registered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodesResponse {
    pub nodes: Option<NodeList>,
}

impl NodesResponse {
    pub fn into_nodes(self) -> Vec<RawNode> {
        self.nodes.map(|list| list.node).unwrap_or_default()
    }
}

/// `clusterMetrics` object of `/ws/v1/cluster/metrics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterMetrics {
    pub apps_submitted: u64,
    pub apps_completed: u64,
    pub apps_pending: u64,
    pub apps_running: u64,
    pub apps_failed: u64,
    pub apps_killed: u64,
    #[serde(rename = "reservedMB")]
    pub reserved_mb: u64,
    #[serde(rename = "availableMB")]
    pub available_mb: u64,
    #[serde(rename = "allocatedMB")]
    pub allocated_mb: u64,
    pub reserved_virtual_cores: u64,
    pub available_virtual_cores: u64,
    pub allocated_virtual_cores: u64,
    pub containers_allocated: u64,
    pub containers_reserved: u64,
    pub containers_pending: u64,
    #[serde(rename = "totalMB")]
    pub total_mb: u64,
    pub total_virtual_cores: u64,
    pub total_nodes: u64,
    pub lost_nodes: u64,
    pub unhealthy_nodes: u64,
    pub decommissioning_nodes: u64,
    pub decommissioned_nodes: u64,
    pub rebooted_nodes: u64,
    pub active_nodes: u64,
    pub shutdown_nodes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterMetricsResponse {
    pub cluster_metrics: ClusterMetrics,
}
