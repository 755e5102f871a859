// UI module

pub mod cluster_tui;

pub use cluster_tui::{run_cluster_app, ClusterApp, ClusterAppConfig};
