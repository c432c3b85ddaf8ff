//! Lifecycle state machine tests
//!
//! Rolls move Ready for Lamination -> Sent for Lamination -> Laminated ->
//! For Work Order -> In Progress, with Consumed as the only terminal
//! state. Invalid transitions must be rejected, never silently applied.

use chrono::Utc;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::{lifecycle, ConsumptionInfo, FabricType, Roll, RollStatus};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn roll(status: RollStatus) -> Roll {
    let mut roll = Roll {
        id: Uuid::new_v4(),
        serial_number: "R-42".to_string(),
        operator_name: "Meena".to_string(),
        loom_no: Some("L-2".to_string()),
        width: Some(dec("15")),
        gram: Some(dec("66")),
        fabric_type: FabricType::Slit,
        color: "Green".to_string(),
        is_laminated: false,
        mtrs: dec("500"),
        gw: dec("550"),
        cw: dec("30"),
        nw: Decimal::ZERO,
        average: Decimal::ZERO,
        variance_band: String::new(),
        status,
        production_date: Utc::now(),
        consumed_by: None,
        so_number: None,
        po_number: None,
        call_out: None,
        received_serial_number: None,
        bag_production: None,
    };
    roll.recompute_derived();
    roll
}

fn acme() -> ConsumptionInfo {
    ConsumptionInfo {
        consumed_by: "Acme".to_string(),
        so_number: None,
        po_number: None,
        bag_production: None,
    }
}

#[test]
fn test_full_forward_path() {
    let mut r = roll(RollStatus::ReadyForLamination);

    lifecycle::send_for_lamination(&mut r, "urgent").unwrap();
    assert_eq!(r.status, RollStatus::SentForLamination);
    assert_eq!(r.call_out.as_deref(), Some("urgent"));

    lifecycle::mark_received(&mut r).unwrap();
    assert_eq!(r.status, RollStatus::Laminated);
    assert!(r.is_laminated);

    lifecycle::send_for_work_order(&mut r).unwrap();
    assert_eq!(r.status, RollStatus::ForWorkOrder);

    lifecycle::begin_work_order(&mut r).unwrap();
    assert_eq!(r.status, RollStatus::InProgress);

    lifecycle::mark_consumed(&mut r, &acme()).unwrap();
    assert_eq!(r.status, RollStatus::Consumed);
}

#[test]
fn test_skipping_stages_is_rejected() {
    // cannot receive a roll that was never sent
    let mut r = roll(RollStatus::ReadyForLamination);
    assert!(lifecycle::mark_received(&mut r).is_err());
    assert_eq!(r.status, RollStatus::ReadyForLamination);

    // cannot designate an unlaminated roll for a work order
    let mut r = roll(RollStatus::SentForLamination);
    assert!(lifecycle::send_for_work_order(&mut r).is_err());

    // cannot claim a roll that was not designated
    let mut r = roll(RollStatus::Laminated);
    assert!(lifecycle::begin_work_order(&mut r).is_err());
}

#[test]
fn test_backward_transitions_are_rejected() {
    let mut r = roll(RollStatus::Laminated);
    assert!(lifecycle::send_for_lamination(&mut r, "again").is_err());
    assert_eq!(r.status, RollStatus::Laminated);
    // no call-out was attached by the failed attempt
    assert!(r.call_out.is_none());
}

#[test]
fn test_resend_is_rejected_not_resent() {
    let mut r = roll(RollStatus::ReadyForLamination);
    lifecycle::send_for_lamination(&mut r, "first").unwrap();

    let err = lifecycle::send_for_lamination(&mut r, "second").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Sent for Lamination"));
    assert_eq!(r.call_out.as_deref(), Some("first"));
}

#[test]
fn test_consumption_from_any_non_terminal_state() {
    for status in [
        RollStatus::ReadyForLamination,
        RollStatus::SentForLamination,
        RollStatus::Laminated,
        RollStatus::ForWorkOrder,
        RollStatus::InProgress,
        RollStatus::PartiallyConsumed,
    ] {
        let mut r = roll(status);
        lifecycle::mark_consumed(&mut r, &acme()).unwrap();
        assert_eq!(r.status, RollStatus::Consumed);
        assert_eq!(r.consumed_by.as_deref(), Some("Acme"));
    }
}

#[test]
fn test_full_consumption_keeps_quantities() {
    let mut r = roll(RollStatus::Laminated);
    lifecycle::mark_consumed(&mut r, &acme()).unwrap();
    assert_eq!(r.mtrs, dec("500"));
    assert_eq!(r.gw, dec("550"));
    assert_eq!(r.cw, dec("30"));
    assert_eq!(r.nw, dec("520"));
}

#[test]
fn test_terminal_state_rejects_everything() {
    let mut r = roll(RollStatus::Consumed);
    assert!(lifecycle::send_for_lamination(&mut r, "x").is_err());
    assert!(lifecycle::mark_received(&mut r).is_err());
    assert!(lifecycle::send_for_work_order(&mut r).is_err());
    assert!(lifecycle::begin_work_order(&mut r).is_err());
    assert!(lifecycle::mark_consumed(&mut r, &acme()).is_err());
    assert!(lifecycle::ensure_splittable(&r).is_err());
    assert_eq!(r.status, RollStatus::Consumed);
}

#[test]
fn test_consumption_metadata_is_attached() {
    let info = ConsumptionInfo {
        consumed_by: "Acme".to_string(),
        so_number: Some("SO-12".to_string()),
        po_number: Some("PO-7".to_string()),
        bag_production: Some(shared::BagProduction {
            no_of_bags: Some(1200),
            avg_bag_weight: Some(dec("0.43")),
            bag_size: Some("50x80".to_string()),
        }),
    };

    let mut r = roll(RollStatus::InProgress);
    lifecycle::mark_consumed(&mut r, &info).unwrap();
    assert_eq!(r.so_number.as_deref(), Some("SO-12"));
    assert_eq!(r.po_number.as_deref(), Some("PO-7"));
    let bags = r.bag_production.unwrap();
    assert_eq!(bags.no_of_bags, Some(1200));
}
