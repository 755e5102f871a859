//! Correlation between compute nodes and PDU outlets.
//!
//! Several hosts may share one outlet (same shelf), so the mapping is a
//! many-to-one list of hostname substrings. Rules are kept in definition
//! order and the first rule whose key is contained in the node id wins.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One `hostname substring -> outlet id` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletRule {
    pub host: String,
    pub outlet: String,
}

impl OutletRule {
    pub fn new(host: impl Into<String>, outlet: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            outlet: outlet.into(),
        }
    }
}

/// Key prefixes of the three metric families exposed by the power endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutletPrefixes {
    pub current: String,
    pub energy: String,
    pub power: String,
}

impl Default for OutletPrefixes {
    fn default() -> Self {
        Self {
            current: "Current".to_string(),
            energy: "Energy".to_string(),
            power: "Power".to_string(),
        }
    }
}

/// Static outlet table, constant for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutletMapping {
    rules: Vec<OutletRule>,
    prefixes: OutletPrefixes,
}

impl OutletMapping {
    pub fn new(rules: Vec<OutletRule>, prefixes: OutletPrefixes) -> Self {
        Self { rules, prefixes }
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let rules = pairs
            .into_iter()
            .map(|(host, outlet)| OutletRule::new(host, outlet))
            .collect();
        Self::new(rules, OutletPrefixes::default())
    }

    pub fn rules(&self) -> &[OutletRule] {
        &self.rules
    }

    pub fn prefixes(&self) -> &OutletPrefixes {
        &self.prefixes
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Outlet id of the first rule whose key is contained in `node_id`
    pub fn outlet_for(&self, node_id: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| !rule.host.is_empty() && node_id.contains(rule.host.as_str()))
            .map(|rule| rule.outlet.as_str())
    }

    /// Pairs of keys where one contains the other.
    ///
    /// A node id matching the longer key also matches the shorter one, so
    /// the result depends on rule order for such pairs.
    pub fn overlapping_keys(&self) -> Vec<(String, String)> {
        let mut overlaps = Vec::new();
        for (i, a) in self.rules.iter().enumerate() {
            for b in self.rules.iter().skip(i + 1) {
                if a.host.contains(b.host.as_str()) || b.host.contains(a.host.as_str()) {
                    overlaps.push((a.host.clone(), b.host.clone()));
                }
            }
        }
        overlaps
    }
}

/// Latest payload of the power endpoint, keyed by `<prefix><outlet id>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutletReadings(HashMap<String, f64>);

impl OutletReadings {
    pub fn new(values: HashMap<String, f64>) -> Self {
        Self(values)
    }

    /// Build readings from the raw JSON document.
    ///
    /// Non numeric entries are dropped; numeric strings are accepted since
    /// some PDU exporters quote their values.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let values = match value.as_object() {
            Some(map) => map
                .iter()
                .filter_map(|(key, v)| {
                    let number = match v {
                        serde_json::Value::Number(n) => n.as_f64(),
                        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
                        _ => None,
                    };
                    number.map(|n| (key.clone(), n))
                })
                .collect(),
            None => {
                log::warn!("Power telemetry payload is not a JSON object, ignoring it");
                HashMap::new()
            }
        };
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn series(&self, prefix: &str, outlet_id: &str) -> Option<f64> {
        self.get(&format!("{}{}", prefix, outlet_id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw electrical readings of one outlet. `None` means the series was absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSummary {
    pub outlet_id: String,
    pub current: Option<f64>,
    pub energy: Option<f64>,
    pub power: Option<f64>,
}

fn format_reading(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.2} {}", v, unit),
        None => "unknown".to_string(),
    }
}

impl fmt::Display for PowerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Outlet {} | Power: {} | Energy: {} | Current: {}",
            self.outlet_id,
            format_reading(self.power, "W"),
            format_reading(self.energy, "kWh"),
            format_reading(self.current, "A"),
        )
    }
}

/// Look up the power readings of the outlet feeding `node_id`.
///
/// Returns `None` when no rule matches, which is an expected outcome for
/// hosts that are not metered.
pub fn correlate(
    node_id: &str,
    mapping: &OutletMapping,
    readings: &OutletReadings,
) -> Option<PowerSummary> {
    let outlet_id = mapping.outlet_for(node_id)?;
    let prefixes = mapping.prefixes();

    Some(PowerSummary {
        outlet_id: outlet_id.to_string(),
        current: readings.series(&prefixes.current, outlet_id),
        energy: readings.series(&prefixes.energy, outlet_id),
        power: readings.series(&prefixes.power, outlet_id),
    })
}
