//! Validation utilities for the LoomTrack platform

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{ChildPid, Roll};

// ============================================================================
// Roll Validations
// ============================================================================

/// A roll is valid only when its required descriptive fields are present
/// and no quantity is negative.
pub fn validate_roll(roll: &Roll) -> Result<(), &'static str> {
    if roll.serial_number.trim().is_empty() {
        return Err("Roll number is required");
    }
    if roll.operator_name.trim().is_empty() {
        return Err("Operator name is required");
    }
    validate_quantities(roll.mtrs, roll.gw, roll.cw)?;
    if let Some(width) = roll.width {
        if width <= Decimal::ZERO {
            return Err("Width must be positive");
        }
    }
    if let Some(gram) = roll.gram {
        if gram <= Decimal::ZERO {
            return Err("Gram must be positive");
        }
    }
    Ok(())
}

/// Quantity fields must never be negative.
pub fn validate_quantities(mtrs: Decimal, gw: Decimal, cw: Decimal) -> Result<(), &'static str> {
    if mtrs < Decimal::ZERO {
        return Err("Meters cannot be negative");
    }
    if gw < Decimal::ZERO {
        return Err("Gross weight cannot be negative");
    }
    if cw < Decimal::ZERO {
        return Err("Core weight cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Work Order Validations
// ============================================================================

/// Each roll may be claimed at most once within a work order.
pub fn child_roll_ids_unique(children: &[ChildPid]) -> bool {
    let mut seen: Vec<Uuid> = Vec::with_capacity(children.len());
    for child in children {
        if seen.contains(&child.roll_id) {
            return false;
        }
        seen.push(child.roll_id);
    }
    true
}

pub fn validate_work_order_fields(
    customer_name: &str,
    parent_pid: &str,
    children: &[ChildPid],
) -> Result<(), &'static str> {
    if customer_name.trim().is_empty() {
        return Err("Customer name is required");
    }
    if parent_pid.trim().is_empty() {
        return Err("Parent PID is required");
    }
    if children.is_empty() {
        return Err("At least one child PID is required");
    }
    if children.iter().any(|c| c.pid.trim().is_empty()) {
        return Err("Child PID is required");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FabricType, RollStatus};
    use chrono::Utc;

    fn roll() -> Roll {
        Roll {
            id: Uuid::new_v4(),
            serial_number: "R-1".to_string(),
            operator_name: "Asha".to_string(),
            loom_no: None,
            width: None,
            gram: None,
            fabric_type: FabricType::Slit,
            color: "Natural".to_string(),
            is_laminated: false,
            mtrs: Decimal::from(500),
            gw: Decimal::from(550),
            cw: Decimal::from(30),
            nw: Decimal::from(520),
            average: Decimal::from(1040),
            variance_band: "N/A".to_string(),
            status: RollStatus::ReadyForLamination,
            production_date: Utc::now(),
            consumed_by: None,
            so_number: None,
            po_number: None,
            call_out: None,
            received_serial_number: None,
            bag_production: None,
        }
    }

    fn child(pid: &str, roll_id: Uuid) -> ChildPid {
        ChildPid {
            pid: pid.to_string(),
            roll_id,
            roll_serial_number: None,
            completed: false,
        }
    }

    #[test]
    fn test_validate_roll_ok() {
        assert!(validate_roll(&roll()).is_ok());
    }

    #[test]
    fn test_validate_roll_missing_fields() {
        let mut r = roll();
        r.serial_number = "  ".to_string();
        assert!(validate_roll(&r).is_err());

        let mut r = roll();
        r.operator_name = String::new();
        assert!(validate_roll(&r).is_err());
    }

    #[test]
    fn test_validate_roll_negative_quantity() {
        let mut r = roll();
        r.cw = Decimal::from(-1);
        assert_eq!(validate_roll(&r), Err("Core weight cannot be negative"));
    }

    #[test]
    fn test_validate_roll_nonpositive_spec() {
        let mut r = roll();
        r.width = Some(Decimal::ZERO);
        assert_eq!(validate_roll(&r), Err("Width must be positive"));
    }

    #[test]
    fn test_child_roll_ids_unique() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(child_roll_ids_unique(&[child("C-1", a), child("C-2", b)]));
        assert!(!child_roll_ids_unique(&[child("C-1", a), child("C-2", a)]));
        assert!(child_roll_ids_unique(&[]));
    }

    #[test]
    fn test_validate_work_order_fields() {
        let a = Uuid::new_v4();
        assert!(validate_work_order_fields("Acme", "PID-1", &[child("C-1", a)]).is_ok());
        assert!(validate_work_order_fields("", "PID-1", &[child("C-1", a)]).is_err());
        assert!(validate_work_order_fields("Acme", "PID-1", &[]).is_err());
        assert!(validate_work_order_fields("Acme", "PID-1", &[child(" ", a)]).is_err());
    }
}
