//! Tests for ReadingSet

use super::*;
use serde_json::json;

fn reading(asset: &str) -> Reading {
    Reading::new(asset, json!({"v": 1}))
}

#[test]
fn test_empty_set() {
    let set = ReadingSet::empty();
    assert!(set.is_empty());
    assert_eq!(set.len(), 0);
}

#[test]
fn test_from_vec_and_back() {
    let set = ReadingSet::new(vec![reading("a"), reading("b")]);
    assert_eq!(set.len(), 2);

    let readings = set.into_vec();
    assert_eq!(readings[0].asset_name(), "a");
    assert_eq!(readings[1].asset_name(), "b");
}

#[test]
fn test_retain_drops_readings() {
    let mut set = ReadingSet::new(vec![reading("keep"), reading("drop"), reading("keep")]);
    set.retain(|r| r.asset_name() == "keep");
    assert_eq!(set.len(), 2);
    assert!(set.iter().all(|r| r.asset_name() == "keep"));
}

#[test]
fn test_iter_mut_rewrites_in_place() {
    let mut set = ReadingSet::new(vec![reading("x"), reading("y")]);
    for r in set.iter_mut() {
        r.set_asset_name("z");
    }
    assert!(set.iter().all(|r| r.asset_name() == "z"));
}

#[test]
fn test_collect_builds_replacement_set() {
    let set: ReadingSet = (0..3).map(|i| reading(&format!("asset{i}"))).collect();
    assert_eq!(set.len(), 3);
}
