use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use clustertop::core::cluster::{
    correlate, ClusterPipeline, ClusterSnapshot, OutletMapping, RefreshConfig,
};
use serde_json::json;
use tokio::sync::watch;
use tokio::time::timeout;

use super::support::{gpu_node, FakeCluster};

const WAIT: Duration = Duration::from_secs(60);

async fn wait_for<F>(rx: &mut watch::Receiver<Arc<ClusterSnapshot>>, done: F) -> Arc<ClusterSnapshot>
where
    F: Fn(&ClusterSnapshot) -> bool,
{
    timeout(WAIT, async {
        loop {
            if done(&rx.borrow_and_update()) {
                return rx.borrow().clone();
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_pipeline_merges_every_source() {
    let fake = Arc::new(FakeCluster::with_nodes(
        vec![gpu_node("gold3.cluster.local:45454"), gpu_node("blue1:45454")],
        json!({"Power4": 120.5, "Energy4": 3.25, "Current4": 0.5}),
    ));
    let pipeline = ClusterPipeline::spawn(fake.clone(), RefreshConfig::default());
    let mut rx = pipeline.snapshot_rx.clone();

    let snapshot = wait_for(&mut rx, |s| s.is_complete()).await;

    assert_eq!(snapshot.nodes.len(), 2);
    let gold = &snapshot.nodes[0];
    assert!(gold.flags.has_cpu && gold.flags.using_cpu);
    assert!(gold.flags.has_gpu && !gold.flags.using_gpu);
    assert!(!gold.flags.has_fpga);
    assert_eq!(snapshot.metrics.as_ref().unwrap().total_nodes, 2);

    let mapping = OutletMapping::from_pairs([("gold3", "4")]);
    let power = correlate(&gold.id, &mapping, &snapshot.readings).unwrap();
    assert_eq!(power.power, Some(120.5));
    assert!(correlate(&snapshot.nodes[1].id, &mapping, &snapshot.readings).is_none());

    pipeline.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_sources_share_one_cadence() {
    let fake = Arc::new(FakeCluster::default());
    let pipeline = ClusterPipeline::spawn(fake.clone(), RefreshConfig::default());

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(fake.calls(), (1, 1, 1));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(fake.calls(), (2, 2, 2));

    // A manual refresh ticks once more after the settling window
    pipeline.force_refresh();
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(fake.calls(), (3, 3, 3));

    pipeline.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_keeps_stale_nodes() {
    let fake = Arc::new(FakeCluster::with_nodes(vec![gpu_node("n1:1")], json!({})));
    let pipeline = ClusterPipeline::spawn(fake.clone(), RefreshConfig::default());
    let mut rx = pipeline.snapshot_rx.clone();
    wait_for(&mut rx, |s| s.is_complete()).await;

    fake.fail_nodes.store(true, Ordering::SeqCst);
    pipeline.force_refresh();
    let snapshot = wait_for(&mut rx, |s| s.nodes_status.last_error.is_some()).await;

    assert_eq!(snapshot.nodes.len(), 1);
    assert_eq!(snapshot.nodes[0].id, "n1:1");
    assert_eq!(snapshot.nodes_status.generation, 1);
    assert_eq!(snapshot.errors().len(), 1);
    assert_eq!(snapshot.errors()[0].0, "nodes");

    fake.fail_nodes.store(false, Ordering::SeqCst);
    pipeline.force_refresh();
    let snapshot = wait_for(&mut rx, |s| s.nodes_status.generation == 2).await;
    assert!(snapshot.errors().is_empty());

    pipeline.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_slow_answer_does_not_block_next_tick() {
    let fake = Arc::new(FakeCluster::default());
    // First request outlives the interval, the second one is instant
    fake.node_delays
        .lock()
        .unwrap()
        .extend([Duration::from_secs(15), Duration::ZERO]);
    fake.node_answers
        .lock()
        .unwrap()
        .extend([vec![gpu_node("slow:1")], vec![gpu_node("fast:1")]]);

    let pipeline = ClusterPipeline::spawn(fake.clone(), RefreshConfig::default());
    let mut rx = pipeline.snapshot_rx.clone();

    let first = wait_for(&mut rx, |s| s.nodes_status.generation == 1).await;
    assert_eq!(first.nodes[0].id, "fast:1");
    assert_eq!(first.nodes_status.tick, 2);

    // The late answer of tick 1 lands last and wins
    let second = wait_for(&mut rx, |s| s.nodes_status.generation == 2).await;
    assert_eq!(second.nodes[0].id, "slow:1");
    assert_eq!(second.nodes_status.tick, 1);

    pipeline.shutdown();
}
