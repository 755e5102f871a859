//! Cluster monitoring core.
//!
//! Polls the YARN ResourceManager and the PDU exporter on one shared,
//! debounced cadence, classifies node capabilities, correlates nodes with
//! power outlets and keeps topology/selection state stable across
//! refreshes.

pub mod capability;
pub mod outlet;
pub mod refresh;
pub mod resources;
mod runtime;
mod snapshot;
pub mod source;
mod tasks;
pub mod topology;

pub use capability::{classify, classify_all, Capability, CapabilityFlags, ClassifiedNode};
pub use outlet::{
    correlate, OutletMapping, OutletPrefixes, OutletReadings, OutletRule, PowerSummary,
};
pub use refresh::{RefreshConfig, RefreshCoordinator, RefreshTick, RefreshTrigger};
pub use resources::{ClusterMetrics, NodeResource, NodeResourceRecord, RawNode};
pub use runtime::{apply_update, ClusterPipeline, ClusterRuntime};
pub use snapshot::{ClusterSnapshot, SourceStatus};
pub use source::{ClusterSource, HttpClusterSource};
pub use tasks::{SourceKind, SourceUpdate};
pub use topology::{reconcile, GraphEdge, GraphNode, TopologyGraph, TopologyState};
