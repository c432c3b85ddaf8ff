//! Wire-format tests
//!
//! The collection files were written by the previous client: camelCase
//! keys, human-readable status strings, ISO timestamps, and a few legacy
//! vocabularies that must still load. These tests pin that contract.

use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{FabricType, Roll, RollStatus};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn roll_json(extra: &str) -> String {
    format!(
        r#"{{
            "id": "7f8a2f76-6f97-4a52-b2c8-4bb1a8f0f3aa",
            "serialNumber": "R-101",
            "operatorName": "Asha",
            "loomNo": "L-14",
            "fabricType": "Slit",
            "color": "Natural",
            "isLaminated": false,
            "mtrs": "500",
            "gw": "550",
            "cw": "30",
            "nw": "520",
            "average": "1040",
            "varianceBand": "N/A",
            "status": "Ready for Lamination",
            "productionDate": "2025-04-01T08:30:00Z"
            {extra}
        }}"#
    )
}

#[test]
fn test_roll_round_trip() {
    let roll: Roll = serde_json::from_str(&roll_json("")).unwrap();
    assert_eq!(roll.serial_number, "R-101");
    assert_eq!(roll.fabric_type, FabricType::Slit);
    assert_eq!(roll.mtrs, dec("500"));
    assert_eq!(roll.status, RollStatus::ReadyForLamination);

    let json = serde_json::to_value(&roll).unwrap();
    assert_eq!(json["serialNumber"], "R-101");
    assert_eq!(json["status"], "Ready for Lamination");
    assert_eq!(json["varianceBand"], "N/A");
    // absent optionals are omitted, not null
    assert!(json.get("consumedBy").is_none());
    assert!(json.get("bagProduction").is_none());
}

#[test]
fn test_legacy_variance_key_is_accepted() {
    let json = roll_json("").replace("varianceBand", "variance");
    let roll: Roll = serde_json::from_str(&json).unwrap();
    assert_eq!(roll.variance_band, "N/A");
}

#[test]
fn test_legacy_lamination_string_is_accepted() {
    let json = roll_json("").replace(
        "\"isLaminated\": false",
        "\"lamination\": \"Lam active\"",
    );
    let roll: Roll = serde_json::from_str(&json).unwrap();
    assert!(roll.is_laminated);

    let json = roll_json("").replace(
        "\"isLaminated\": false",
        "\"lamination\": \"Unlammed\"",
    );
    let roll: Roll = serde_json::from_str(&json).unwrap();
    assert!(!roll.is_laminated);
}

#[test]
fn test_legacy_statuses_map_once_at_ingestion() {
    for legacy in ["Active Stock", "Received from Lamination"] {
        let json = roll_json("").replace("Ready for Lamination", legacy);
        let roll: Roll = serde_json::from_str(&json).unwrap();
        assert_eq!(roll.status, RollStatus::Laminated);

        // and the canonical spelling is what gets written back
        let out = serde_json::to_value(&roll).unwrap();
        assert_eq!(out["status"], "Laminated");
    }
}

#[test]
fn test_consumption_metadata_round_trips() {
    let extra = r#",
        "consumedBy": "WO: PID-2025-014",
        "soNumber": "SO-12",
        "callOut": "urgent",
        "bagProduction": { "noOfBags": 1200, "avgBagWeight": "0.43", "bagSize": "50x80" }
    "#;
    let json = roll_json(extra).replace("Ready for Lamination", "Consumed");
    let roll: Roll = serde_json::from_str(&json).unwrap();

    assert_eq!(roll.consumed_by.as_deref(), Some("WO: PID-2025-014"));
    assert_eq!(roll.call_out.as_deref(), Some("urgent"));
    let bags = roll.bag_production.as_ref().unwrap();
    assert_eq!(bags.no_of_bags, Some(1200));
    assert_eq!(bags.avg_bag_weight, Some(dec("0.43")));

    let out = serde_json::to_value(&roll).unwrap();
    assert_eq!(out["bagProduction"]["bagSize"], "50x80");
}

#[test]
fn test_timestamps_are_iso_strings() {
    let roll: Roll = serde_json::from_str(&roll_json("")).unwrap();
    let out = serde_json::to_value(&roll).unwrap();
    let raw = out["productionDate"].as_str().unwrap();
    assert!(raw.starts_with("2025-04-01T08:30:00"));
}

#[test]
fn test_unknown_status_is_rejected() {
    let json = roll_json("").replace("Ready for Lamination", "Mislaid");
    assert!(serde_json::from_str::<Roll>(&json).is_err());
}
