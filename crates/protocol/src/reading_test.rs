//! Tests for the Reading type

use super::*;
use chrono::TimeZone;
use serde_json::json;

#[test]
fn test_new_generates_read_key() {
    let r1 = Reading::new("pump", json!({"rpm": 120}));
    let r2 = Reading::new("pump", json!({"rpm": 121}));

    assert_eq!(r1.asset_name(), "pump");
    assert!(!r1.read_key().is_empty());
    assert_ne!(r1.read_key(), r2.read_key());
}

#[test]
fn test_builder_overrides() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let reading = Reading::new("valve", json!({"open": true}))
        .with_read_key("key-1")
        .with_user_ts(ts);

    assert_eq!(reading.read_key(), "key-1");
    assert_eq!(reading.user_ts(), ts);
}

#[test]
fn test_set_asset_name() {
    let mut reading = Reading::new("old", json!({}));
    reading.set_asset_name("new");
    assert_eq!(reading.asset_name(), "new");
}

#[test]
fn test_payload_mut() {
    let mut reading = Reading::new("sensor", json!({"temp": 20.0}));
    reading.payload_mut()["temp"] = json!(21.5);
    assert_eq!(reading.payload()["temp"], json!(21.5));
}

#[test]
fn test_serde_round_trip() {
    let reading = Reading::new("motor", json!({"amps": 3.2})).with_read_key("rk");
    let encoded = serde_json::to_string(&reading).unwrap();
    let decoded: Reading = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, reading);
}
