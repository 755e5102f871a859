use clustertop::core::cluster::{
    classify_all, correlate, reconcile, resources::NodesResponse, OutletMapping, OutletReadings,
    TopologyState,
};
use serde_json::json;

const NODES_DOCUMENT: &str = r#"{
  "nodes": {"node": [
    {
      "id": "gold1.cluster.local:45454",
      "rack": "/default-rack",
      "state": "RUNNING",
      "nodeHostName": "gold1.cluster.local",
      "numContainers": 3,
      "usedMemoryMB": 3072,
      "availMemoryMB": 5120,
      "availableResource": {"memory": 5120, "vCores": 5, "resourceInformations": {"resourceInformation": [
        {"name": "memory-mb", "value": 5120, "units": "Mi"},
        {"name": "vcores", "value": 5},
        {"name": "yarn.io/fpga", "value": 1}
      ]}},
      "usedResource": {"memory": 3072, "vCores": 3, "resourceInformations": {"resourceInformation": [
        {"name": "memory-mb", "value": 3072, "units": "Mi"},
        {"name": "vcores", "value": 3},
        {"name": "yarn.io/fpga", "value": 1}
      ]}}
    },
    {
      "id": "silver2.cluster.local:45454",
      "state": "UNHEALTHY",
      "healthReport": "1/1 local-dirs are bad"
    }
  ]}
}"#;

#[test]
fn test_yarn_document_to_topology() {
    let response: NodesResponse = serde_json::from_str(NODES_DOCUMENT).unwrap();
    let nodes = classify_all(&response.into_nodes());

    assert_eq!(nodes.len(), 2);

    let gold = &nodes[0];
    assert!(gold.flags.has_cpu && gold.flags.using_cpu);
    assert!(gold.flags.has_fpga && gold.flags.using_fpga);
    assert!(!gold.flags.has_gpu && !gold.flags.using_gpu);
    assert_eq!(gold.flags.modules_label(), "memory-mb,vcores,yarn.io/fpga");

    // No inventories at all: still listed, nothing detected
    let silver = &nodes[1];
    assert_eq!(silver.health_report, "1/1 local-dirs are bad");
    assert!(silver.flags.available_modules.is_empty());
    assert!(!silver.flags.has_cpu);

    let mut state = TopologyState::new(nodes.clone());
    assert!(state.select("silver2.cluster.local:45454"));
    let graph = state.graph();
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.edges.len(), 2);

    // Next poll drops silver2 and the selection with it
    let state = reconcile(state, vec![gold.clone()]);
    assert_eq!(state.selected_id(), None);
    assert_eq!(state.len(), 1);
}

#[test]
fn test_empty_cluster_document() {
    let response: NodesResponse = serde_json::from_str(r#"{"nodes": null}"#).unwrap();
    assert!(classify_all(&response.into_nodes()).is_empty());
}

#[test]
fn test_shared_outlet_readings() {
    let mapping = OutletMapping::from_pairs([("gold1", "2"), ("gold2", "2"), ("silver", "5")]);
    let readings = OutletReadings::from_json(&json!({
        "Current2": 1.5,
        "Energy2": 40.0,
        "Power2": 310.0,
        "Power5": "95.5"
    }));

    let gold1 = correlate("gold1.cluster.local:45454", &mapping, &readings).unwrap();
    let gold2 = correlate("gold2.cluster.local:45454", &mapping, &readings).unwrap();
    assert_eq!(gold1, gold2);
    assert_eq!(gold1.current, Some(1.5));

    let silver = correlate("silver2.cluster.local:45454", &mapping, &readings).unwrap();
    assert_eq!(silver.power, Some(95.5));
    assert_eq!(silver.energy, None);
    assert_eq!(
        silver.to_string(),
        "Outlet 5 | Power: 95.50 W | Energy: unknown | Current: unknown"
    );
}

#[test]
fn test_malformed_node_keeps_rest_of_inventory() {
    let body = r#"{"nodes": {"node": [
        {"id": "good:1", "state": "RUNNING",
         "availableResource": {"resourceInformations": {"resourceInformation": [
            {"name": "vcores", "value": 4}
         ]}},
         "usedResource": {"resourceInformations": {"resourceInformation": [
            {"name": "vcores", "value": "2"}
         ]}}},
        {"id": "bad:1", "state": "RUNNING",
         "availableResource": {"resourceInformations": {"resourceInformation": null}},
         "usedResource": {"resourceInformations": {"resourceInformation": [
            {"name": "yarn.io/gpu", "value": {"oops": true}}
         ]}}},
        {"id": "broken:1", "availableResource": [1, 2, 3]}
    ]}}"#;

    let response: NodesResponse = serde_json::from_str(body).unwrap();
    let nodes = classify_all(&response.into_nodes());

    assert_eq!(nodes.len(), 3);

    let good = &nodes[0];
    assert_eq!(good.id, "good:1");
    assert!(good.flags.has_cpu && good.flags.using_cpu);

    for bad in &nodes[1..] {
        assert!(!bad.flags.has_cpu && !bad.flags.has_gpu && !bad.flags.has_fpga);
        assert!(!bad.flags.using_cpu && !bad.flags.using_gpu && !bad.flags.using_fpga);
        assert!(bad.flags.available_modules.is_empty());
    }
    assert_eq!(nodes[1].id, "bad:1");
    assert_eq!(nodes[2].id, "broken:1");

    let state = TopologyState::new(nodes);
    assert!(state.contains("bad:1") && state.contains("broken:1"));
}
