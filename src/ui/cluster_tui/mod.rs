//! Terminal User Interface for cluster monitoring.
//!
//! Renders the node list, the star topology and the selected node's
//! details using ratatui.

mod app;
mod event_handler;
mod render;
mod widgets;

pub use app::{run_cluster_app, ClusterApp, ClusterAppConfig, View};
pub use event_handler::{MonitorCommand, MonitorEvent};
