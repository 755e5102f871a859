//! Merged view of the polled sources and their freshness.

use serde::Serialize;

use super::capability::ClassifiedNode;
use super::outlet::OutletReadings;
use super::resources::ClusterMetrics;

/// Freshness bookkeeping of one polled source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceStatus {
    /// Number of successful updates applied so far
    pub generation: u64,
    /// Refresh tick that produced the applied data
    pub tick: u64,
    /// Unix timestamp of the last applied update
    pub updated_at: Option<i64>,
    /// Error of the most recent failed fetch, cleared by the next success
    pub last_error: Option<String>,
}

impl SourceStatus {
    pub fn record_success(&mut self, tick: u64, now: i64) {
        self.generation += 1;
        self.tick = tick;
        self.updated_at = Some(now);
        self.last_error = None;
    }

    pub fn record_failure(&mut self, error: String) {
        self.last_error = Some(error);
    }

    /// True once the source produced either data or an error
    pub fn has_answered(&self) -> bool {
        self.generation > 0 || self.last_error.is_some()
    }
}

/// Latest merged view of every source.
///
/// Each field is replaced wholesale when its source answers; a failed fetch
/// leaves the previous data in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterSnapshot {
    pub timestamp: i64,
    pub nodes: Vec<ClassifiedNode>,
    pub readings: OutletReadings,
    pub metrics: Option<ClusterMetrics>,
    pub nodes_status: SourceStatus,
    pub outlets_status: SourceStatus,
    pub metrics_status: SourceStatus,
}

impl ClusterSnapshot {
    /// True once every source has answered at least once
    pub fn is_complete(&self) -> bool {
        self.nodes_status.generation > 0
            && self.outlets_status.generation > 0
            && self.metrics_status.generation > 0
    }

    /// True once every source has either answered or failed
    pub fn all_answered(&self) -> bool {
        self.nodes_status.has_answered()
            && self.outlets_status.has_answered()
            && self.metrics_status.has_answered()
    }

    pub fn errors(&self) -> Vec<(&'static str, &str)> {
        [
            ("nodes", &self.nodes_status),
            ("power", &self.outlets_status),
            ("metrics", &self.metrics_status),
        ]
        .into_iter()
        .filter_map(|(name, status)| status.last_error.as_deref().map(|e| (name, e)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completeness_tracks_every_source() {
        let mut snapshot = ClusterSnapshot::default();
        assert!(!snapshot.is_complete());
        assert!(!snapshot.all_answered());

        snapshot.nodes_status.record_success(1, 10);
        snapshot.outlets_status.record_failure("timeout".to_string());
        snapshot.metrics_status.record_success(1, 10);

        assert!(!snapshot.is_complete());
        assert!(snapshot.all_answered());
        assert_eq!(snapshot.errors(), vec![("power", "timeout")]);
    }
}
