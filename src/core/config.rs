use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::cluster::{OutletMapping, OutletPrefixes, OutletRule, RefreshConfig};
use crate::error::ClusterTopError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the YARN ResourceManager REST API
    pub resource_manager_url: String,
    /// URL of the PDU telemetry exporter
    pub power_url: String,
    pub refresh_interval_ms: u64,
    /// Quiet period after a manual refresh before the interval restarts
    pub debounce_ms: u64,
    pub request_timeout_ms: u64,
    pub outlet_prefixes: OutletPrefixes,
    /// Hostname substring -> outlet id, first match wins
    pub outlets: Vec<OutletRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource_manager_url: "http://localhost:8088".to_string(),
            power_url: "http://localhost:58095/".to_string(),
            refresh_interval_ms: 10_000,
            debounce_ms: 300,
            request_timeout_ms: 5_000,
            outlet_prefixes: OutletPrefixes::default(),
            outlets: Vec::new(),
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No configuration at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;

        Ok(config)
    }

    /// Load from an explicit path if given, else from the default location
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, data).with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("clustertop").join("config.json"))
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        for url in [&self.resource_manager_url, &self.power_url] {
            let parsed = url::Url::parse(url)
                .map_err(|e| ClusterTopError::invalid_url(url.as_str(), e.to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ClusterTopError::invalid_url(
                    url.as_str(),
                    format!("unsupported scheme '{}'", parsed.scheme()),
                ));
            }
        }

        if self.refresh_interval_ms == 0 {
            return Err(ClusterTopError::config("refresh_interval_ms must be positive"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ClusterTopError::config("request_timeout_ms must be positive"));
        }
        if let Some(rule) = self.outlets.iter().find(|r| r.host.trim().is_empty()) {
            return Err(ClusterTopError::config(format!(
                "outlet {} has an empty host pattern",
                rule.outlet
            )));
        }

        Ok(())
    }

    pub fn refresh(&self) -> RefreshConfig {
        RefreshConfig {
            interval: Duration::from_millis(self.refresh_interval_ms),
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn outlet_mapping(&self) -> OutletMapping {
        let mapping = OutletMapping::new(self.outlets.clone(), self.outlet_prefixes.clone());
        for (a, b) in mapping.overlapping_keys() {
            log::warn!(
                "Outlet patterns '{}' and '{}' overlap; the one listed first wins",
                a,
                b
            );
        }
        mapping
    }
}
