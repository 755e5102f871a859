use std::fs;

use clustertop::core::cluster::OutletRule;
use clustertop::Config;
use tempfile::TempDir;

#[test]
fn test_config_file_drives_mapping_and_cadence() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "resource_manager_url": "http://rm.cluster.local:8088/",
            "refresh_interval_ms": 2000,
            "outlet_prefixes": {"power": "Watts"},
            "outlets": [
                {"host": "gold", "outlet": "1"},
                {"host": "gold3", "outlet": "4"}
            ]
        }"#,
    )
    .unwrap();

    let config = Config::resolve(Some(&path)).unwrap();

    assert_eq!(config.refresh().interval.as_millis(), 2000);
    assert_eq!(config.refresh().debounce.as_millis(), 300);

    let mapping = config.outlet_mapping();
    // Listed first, so the shorter key wins
    assert_eq!(mapping.outlet_for("gold3.cluster.local"), Some("1"));
    assert_eq!(mapping.prefixes().power, "Watts");
    assert_eq!(mapping.prefixes().current, "Current");
}

#[test]
fn test_invalid_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(Config::resolve(Some(&path)).is_err());
}

#[test]
fn test_rejects_non_http_endpoint() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"power_url": "ftp://pdu/"}"#).unwrap();

    let err = Config::resolve(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("ftp://pdu/"));
}

#[test]
fn test_init_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clustertop").join("config.json");
    let config = Config {
        outlets: vec![OutletRule::new("blue", "3")],
        ..Default::default()
    };

    config.save_to(&path).unwrap();

    assert_eq!(Config::resolve(Some(&path)).unwrap(), config);
}
