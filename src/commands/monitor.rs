//! Cluster monitor command handler.
//!
//! Runs the live TUI dashboard over the configured endpoints.

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::error::ClusterTopError;
use crate::ui::cluster_tui::run_cluster_app;

/// Execute the monitor command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = super::load_config(matches)?;

    if let Some(&interval) = matches.get_one::<u64>("interval") {
        if interval == 0 {
            return Err(ClusterTopError::config("--interval must be positive").into());
        }
        config.refresh_interval_ms = interval;
    }

    log::debug!(
        "Monitoring {} and {}",
        config.resource_manager_url,
        config.power_url
    );

    run_cluster_app(&config).context("Failed to run cluster monitor")
}
