//! Tests for the exclude filter

use std::sync::atomic::Ordering;

use super::*;
use inlet_protocol::Reading;
use serde_json::json;

fn set(assets: &[&str]) -> ReadingSet {
    assets
        .iter()
        .map(|a| Reading::new(*a, json!({"v": 1})))
        .collect()
}

#[test]
fn test_drops_configured_assets() {
    let filter =
        ExcludeFilter::new("exclude-cat", ExcludeConfig::new().with_asset("rig")).unwrap();

    let out = filter.process(set(&["rig", "pump", "rig", "valve"]));
    let assets: Vec<_> = out.iter().map(|r| r.asset_name()).collect();
    assert_eq!(assets, vec!["pump", "valve"]);

    assert_eq!(filter.metrics().readings_seen.load(Ordering::Relaxed), 4);
    assert_eq!(filter.metrics().readings_dropped.load(Ordering::Relaxed), 2);
    assert_eq!(filter.metrics().drop_rate(), 0.5);
}

#[test]
fn test_can_drop_entire_set() {
    let filter =
        ExcludeFilter::new("exclude-cat", ExcludeConfig::new().with_asset("rig")).unwrap();

    let out = filter.process(set(&["rig", "rig"]));
    assert!(out.is_empty());
}

#[test]
fn test_reconfigure_swaps_exclusions() {
    let filter =
        ExcludeFilter::new("exclude-cat", ExcludeConfig::new().with_asset("rig")).unwrap();

    filter.reconfigure(&json!({"assets": ["pump"]})).unwrap();

    let out = filter.process(set(&["rig", "pump"]));
    let assets: Vec<_> = out.iter().map(|r| r.asset_name()).collect();
    assert_eq!(assets, vec!["rig"]);
}
