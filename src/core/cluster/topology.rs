//! Topology and selection state.
//!
//! Every refresh replaces the node sequence wholesale. The only thing that
//! survives a refresh on purpose is the selected node id, and only while a
//! node with that id is still reported.

use serde::Serialize;

use super::capability::ClassifiedNode;
use super::outlet::{correlate, OutletMapping, OutletReadings, PowerSummary};

/// Id of the synthetic root every node hangs from.
pub const ROOT_ID: &str = "network";
pub const ROOT_LABEL: &str = "Network";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyState {
    nodes: Vec<ClassifiedNode>,
    selected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

/// Star graph: one root, one edge from the root to each node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopologyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl TopologyState {
    pub fn new(nodes: Vec<ClassifiedNode>) -> Self {
        Self {
            nodes,
            selected: None,
        }
    }

    pub fn nodes(&self) -> &[ClassifiedNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected node, always taken from the current snapshot
    pub fn selected_node(&self) -> Option<&ClassifiedNode> {
        let id = self.selected.as_deref()?;
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_deref()?;
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Select a node by id. Unknown ids leave the state untouched.
    pub fn select(&mut self, id: &str) -> bool {
        if self.contains(id) {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Move the selection one node down, selecting the first node if none is
    pub fn select_next(&mut self) {
        let next = match self.selected_index() {
            Some(i) if i + 1 < self.nodes.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        if let Some(node) = self.nodes.get(next) {
            self.selected = Some(node.id.clone());
        }
    }

    pub fn select_previous(&mut self) {
        let previous = match self.selected_index() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        if let Some(node) = self.nodes.get(previous) {
            self.selected = Some(node.id.clone());
        }
    }

    /// Derive the star graph drawn by the topology view.
    pub fn graph(&self) -> TopologyGraph {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        let mut edges = Vec::with_capacity(self.nodes.len());

        nodes.push(GraphNode {
            id: ROOT_ID.to_string(),
            label: ROOT_LABEL.to_string(),
        });

        for node in &self.nodes {
            nodes.push(GraphNode {
                id: node.id.clone(),
                label: node.id.clone(),
            });
            edges.push(GraphEdge {
                from: ROOT_ID.to_string(),
                to: node.id.clone(),
            });
        }

        TopologyGraph { nodes, edges }
    }

    /// Power readings of the selected node's outlet, if any.
    pub fn selected_power(
        &self,
        mapping: &OutletMapping,
        readings: &OutletReadings,
    ) -> Option<PowerSummary> {
        let node = self.selected_node()?;
        correlate(&node.id, mapping, readings)
    }
}

/// Merge a freshly polled node set into the previous state.
///
/// The node sequence is replaced; the selection is kept only if the fresh
/// set still reports a node with the selected id.
pub fn reconcile(previous: TopologyState, fresh: Vec<ClassifiedNode>) -> TopologyState {
    let selected = previous
        .selected
        .filter(|id| fresh.iter().any(|n| &n.id == id));

    if previous.nodes.len() != fresh.len() {
        log::debug!(
            "Topology changed from {} to {} nodes",
            previous.nodes.len(),
            fresh.len()
        );
    }

    TopologyState {
        nodes: fresh,
        selected,
    }
}
