use std::fs;

use rsp_core::{EngineConfig, RspError, ValueAnchor};
use tempfile::tempdir;

#[test]
fn defaults_match_documented_limits() {
    let config = EngineConfig::default();
    assert_eq!(config.max_bins, 1 << 28);
    assert_eq!(config.sparse_threshold, 0.9);
    assert_eq!(config.header_scan_lines, 100);
    assert!(config.validate().is_ok());
}

#[test]
fn missing_keys_take_defaults() {
    let config = EngineConfig::from_yaml_str("max_bins: 1000\n").unwrap();
    assert_eq!(config.max_bins, 1000);
    assert_eq!(config.sparse_threshold, 0.9);
}

#[test]
fn invalid_threshold_is_rejected() {
    let err = EngineConfig::from_yaml_str("sparse_threshold: 1.5\n");
    assert!(matches!(err, Err(RspError::Configuration(info)) if info.code == "invalid-config"));
}

#[test]
fn loads_from_file_and_reports_path_on_failure() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("engine.yaml");
    fs::write(&good, "header_scan_lines: 20\n").unwrap();
    assert_eq!(EngineConfig::from_path(&good).unwrap().header_scan_lines, 20);

    let bad = dir.path().join("broken.yaml");
    fs::write(&bad, "max_bins: [not, a, number]\n").unwrap();
    match EngineConfig::from_path(&bad) {
        Err(RspError::Configuration(info)) => {
            assert_eq!(info.code, "config-parse");
            assert!(info.context.contains_key("path"));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let missing = dir.path().join("absent.yaml");
    assert!(matches!(
        EngineConfig::from_path(&missing),
        Err(RspError::Io(info)) if info.code == "read-failed"
    ));
}

#[test]
fn centered_flag_parses() {
    assert_eq!("true".parse::<ValueAnchor>().unwrap(), ValueAnchor::BinCenters);
    assert_eq!("false".parse::<ValueAnchor>().unwrap(), ValueAnchor::BinEdges);
    assert!("maybe".parse::<ValueAnchor>().is_err());
    assert_eq!(ValueAnchor::BinEdges.to_string(), "false");
}
