//! Data sources polled on every refresh tick.

use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::outlet::OutletReadings;
use super::resources::{ClusterMetrics, ClusterMetricsResponse, NodesResponse, RawNode};
use crate::error::{ClusterTopError, Result};

const NODES_PATH: &str = "/ws/v1/cluster/nodes";
const METRICS_PATH: &str = "/ws/v1/cluster/metrics";

/// The three remote collaborators of the monitor.
///
/// Futures are boxed so sources can be shared as `Arc<dyn ClusterSource>`
/// and fetched from spawned tasks.
pub trait ClusterSource: Send + Sync + 'static {
    fn fetch_nodes(&self) -> BoxFuture<'_, Result<Vec<RawNode>>>;

    fn fetch_outlets(&self) -> BoxFuture<'_, Result<OutletReadings>>;

    fn fetch_cluster_metrics(&self) -> BoxFuture<'_, Result<ClusterMetrics>>;
}

/// HTTP source backed by the YARN ResourceManager and the PDU exporter.
pub struct HttpClusterSource {
    client: Client,
    nodes_url: String,
    metrics_url: String,
    power_url: String,
}

impl HttpClusterSource {
    pub fn new(resource_manager_url: &str, power_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("clustertop/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base = resource_manager_url.trim_end_matches('/');

        Ok(Self {
            client,
            nodes_url: format!("{}{}", base, NODES_PATH),
            metrics_url: format!("{}{}", base, METRICS_PATH),
            power_url: power_url.to_string(),
        })
    }

    pub fn nodes_url(&self) -> &str {
        &self.nodes_url
    }

    pub fn metrics_url(&self) -> &str {
        &self.metrics_url
    }

    pub fn power_url(&self) -> &str {
        &self.power_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClusterTopError::status(url, response.status().as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl ClusterSource for HttpClusterSource {
    fn fetch_nodes(&self) -> BoxFuture<'_, Result<Vec<RawNode>>> {
        Box::pin(async move {
            let response: NodesResponse = self.get_json(&self.nodes_url).await?;
            Ok(response.into_nodes())
        })
    }

    fn fetch_outlets(&self) -> BoxFuture<'_, Result<OutletReadings>> {
        Box::pin(async move {
            let payload: serde_json::Value = self.get_json(&self.power_url).await?;
            Ok(OutletReadings::from_json(&payload))
        })
    }

    fn fetch_cluster_metrics(&self) -> BoxFuture<'_, Result<ClusterMetrics>> {
        Box::pin(async move {
            let response: ClusterMetricsResponse = self.get_json(&self.metrics_url).await?;
            Ok(response.cluster_metrics)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let source = HttpClusterSource::new(
            "http://rm.local:8088/",
            "http://pdu.local:58095/",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(source.nodes_url(), "http://rm.local:8088/ws/v1/cluster/nodes");
        assert_eq!(source.metrics_url(), "http://rm.local:8088/ws/v1/cluster/metrics");
        assert_eq!(source.power_url(), "http://pdu.local:58095/");
    }
}
