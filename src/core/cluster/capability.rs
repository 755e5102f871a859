//! Hardware capability classification of cluster nodes.
//!
//! A node "has" a capability when one of its available resources with a
//! positive quantity carries the capability's token in its name, and is
//! "using" it when a used resource carrying the token is non-zero. Matching
//! is substring based so vendor-suffixed names (`yarn.io/gpu-nvidia`) still
//! count.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::resources::{NodeResourceRecord, RawNode};

/// Resource families the dashboard distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Cpu,
    Gpu,
    Fpga,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Cpu, Capability::Gpu, Capability::Fpga];

    /// Substring identifying this family inside a resource name.
    pub fn token(self) -> &'static str {
        match self {
            Capability::Cpu => "vcores",
            Capability::Gpu => "yarn.io/gpu",
            Capability::Fpga => "yarn.io/fpga",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Capability::Cpu => "CPU",
            Capability::Gpu => "GPU",
            Capability::Fpga => "FPGA",
        }
    }
}

/// Capability and usage flags derived from a node's inventories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityFlags {
    pub available_modules: BTreeSet<String>,
    pub has_cpu: bool,
    pub has_gpu: bool,
    pub has_fpga: bool,
    pub using_cpu: bool,
    pub using_gpu: bool,
    pub using_fpga: bool,
}

impl CapabilityFlags {
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Cpu => self.has_cpu,
            Capability::Gpu => self.has_gpu,
            Capability::Fpga => self.has_fpga,
        }
    }

    pub fn using(&self, capability: Capability) -> bool {
        match capability {
            Capability::Cpu => self.using_cpu,
            Capability::Gpu => self.using_gpu,
            Capability::Fpga => self.using_fpga,
        }
    }

    /// Comma separated list of available module names
    pub fn modules_label(&self) -> String {
        self.available_modules
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Classify a node from its available and used resource inventories.
///
/// Never fails: empty inventories simply produce all-false flags.
pub fn classify(available: &[NodeResourceRecord], used: &[NodeResourceRecord]) -> CapabilityFlags {
    // A resource with zero capacity is not available, even if the schema lists it
    let available_modules: BTreeSet<String> = available
        .iter()
        .filter(|r| r.value > 0.0)
        .map(|r| r.name.clone())
        .collect();

    let has = |capability: Capability| {
        available_modules
            .iter()
            .any(|name| name.contains(capability.token()))
    };
    let using = |capability: Capability| {
        used.iter()
            .any(|r| r.name.contains(capability.token()) && r.value > 0.0)
    };

    CapabilityFlags {
        has_cpu: has(Capability::Cpu),
        has_gpu: has(Capability::Gpu),
        has_fpga: has(Capability::Fpga),
        using_cpu: using(Capability::Cpu),
        using_gpu: using(Capability::Gpu),
        using_fpga: using(Capability::Fpga),
        available_modules,
    }
}

/// A node as the topology and the UI see it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedNode {
    /// Stable identity, `host:port`
    pub id: String,
    pub host_name: String,
    pub rack: String,
    pub state: String,
    pub health_report: String,
    pub num_containers: u32,
    pub used_memory_mb: f64,
    pub avail_memory_mb: f64,
    pub flags: CapabilityFlags,
}

impl ClassifiedNode {
    pub fn from_raw(raw: &RawNode) -> Self {
        let available = raw
            .available_resource
            .as_ref()
            .map(|r| r.records())
            .unwrap_or_default();
        let used = raw
            .used_resource
            .as_ref()
            .map(|r| r.records())
            .unwrap_or_default();

        if raw.available_resource.is_none() || raw.used_resource.is_none() {
            log::debug!("Node {} is missing a resource inventory", raw.id);
        }

        Self {
            id: raw.id.clone(),
            host_name: raw.node_host_name.clone(),
            rack: raw.rack.clone(),
            state: raw.state.clone(),
            health_report: raw.health_report.clone(),
            num_containers: raw.num_containers,
            used_memory_mb: raw.used_memory_mb,
            avail_memory_mb: raw.avail_memory_mb,
            flags: classify(available, used),
        }
    }
}

/// Classify a whole inventory, preserving the order reported by YARN
pub fn classify_all(raw_nodes: &[RawNode]) -> Vec<ClassifiedNode> {
    raw_nodes.iter().map(ClassifiedNode::from_raw).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cluster::resources::NodeResource;

    fn rec(name: &str, value: f64) -> NodeResourceRecord {
        NodeResourceRecord::new(name, value)
    }

    #[test]
    fn test_cpu_only_node_with_empty_gpu_slot() {
        let available = vec![rec("vcores", 4.0), rec("yarn.io/gpu", 0.0)];
        let used = vec![rec("vcores", 2.0)];

        let flags = classify(&available, &used);

        assert!(flags.has_cpu);
        assert!(!flags.has_gpu);
        assert!(!flags.has_fpga);
        assert!(flags.using_cpu);
        assert!(!flags.using_gpu);
        assert!(!flags.using_fpga);
        assert_eq!(flags.modules_label(), "vcores");
    }

    #[test]
    fn test_vendor_suffixed_names_match() {
        let available = vec![rec("yarn.io/gpu-nvidia", 2.0), rec("yarn.io/fpga-xilinx", 1.0)];
        let used = vec![rec("yarn.io/fpga-xilinx", 1.0), rec("yarn.io/gpu-nvidia", 0.0)];

        let flags = classify(&available, &used);

        assert!(flags.has_gpu);
        assert!(flags.has_fpga);
        assert!(!flags.using_gpu);
        assert!(flags.using_fpga);
    }

    #[test]
    fn test_using_is_independent_of_available() {
        // Used inventory alone drives the usage flags
        let flags = classify(&[], &[rec("yarn.io/gpu", 1.0)]);
        assert!(!flags.has_gpu);
        assert!(flags.using_gpu);
    }

    #[test]
    fn test_flags_match_definition_for_every_capability() {
        let cases: Vec<(Vec<NodeResourceRecord>, Vec<NodeResourceRecord>)> = vec![
            (vec![], vec![]),
            (vec![rec("vcores", 1.0)], vec![rec("vcores", 0.0)]),
            (vec![rec("yarn.io/gpu", 3.0)], vec![rec("yarn.io/gpu", 1.0)]),
            (vec![rec("yarn.io/fpga", 0.0)], vec![rec("yarn.io/fpga", 2.0)]),
            (vec![rec("memory-mb", 1024.0)], vec![rec("memory-mb", 512.0)]),
            (
                vec![rec("vcores", 8.0), rec("yarn.io/gpu", 2.0), rec("yarn.io/fpga", 1.0)],
                vec![rec("vcores", 8.0), rec("yarn.io/gpu", 2.0), rec("yarn.io/fpga", 1.0)],
            ),
        ];

        for (available, used) in cases {
            let flags = classify(&available, &used);
            for capability in Capability::ALL {
                let expected_has = available
                    .iter()
                    .any(|r| r.name.contains(capability.token()) && r.value > 0.0);
                let expected_using = used
                    .iter()
                    .any(|r| r.name.contains(capability.token()) && r.value > 0.0);
                assert_eq!(flags.has(capability), expected_has, "{:?}", capability);
                assert_eq!(flags.using(capability), expected_using, "{:?}", capability);
            }
        }
    }

    #[test]
    fn test_malformed_node_is_still_classified() {
        let raw = RawNode {
            id: "broken:1".to_string(),
            ..Default::default()
        };

        let node = ClassifiedNode::from_raw(&raw);

        assert_eq!(node.id, "broken:1");
        assert_eq!(node.flags, CapabilityFlags::default());
        assert!(node.flags.available_modules.is_empty());
    }

    #[test]
    fn test_from_raw_uses_both_inventories() {
        let raw = RawNode {
            id: "n1:45454".to_string(),
            node_host_name: "n1".to_string(),
            available_resource: Some(NodeResource::from_records(vec![
                rec("vcores", 4.0),
                rec("yarn.io/fpga", 1.0),
            ])),
            used_resource: Some(NodeResource::from_records(vec![rec("yarn.io/fpga", 1.0)])),
            ..Default::default()
        };

        let node = ClassifiedNode::from_raw(&raw);

        assert!(node.flags.has_cpu);
        assert!(node.flags.has_fpga);
        assert!(node.flags.using_fpga);
        assert!(!node.flags.using_cpu);
        assert_eq!(node.host_name, "n1");
    }
}
