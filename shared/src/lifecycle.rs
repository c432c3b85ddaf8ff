//! Roll lifecycle state machine
//!
//! Rolls move through a fixed sequence:
//! Ready for Lamination -> Sent for Lamination -> Laminated ->
//! (For Work Order -> In Progress | Consumed), with Partially Consumed
//! reachable from any state that still has quantity after a split and
//! Consumed the only terminal state.
//!
//! Every guard here rejects an invalid call with an error instead of
//! mutating; callers must not rely on UI-level disabling.

use thiserror::Error;

use crate::models::{ConsumptionInfo, Roll, RollStatus};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("roll {serial} is '{status}' and cannot {event}")]
    InvalidTransition {
        serial: String,
        status: RollStatus,
        event: &'static str,
    },
}

fn reject(roll: &Roll, event: &'static str) -> LifecycleError {
    LifecycleError::InvalidTransition {
        serial: roll.serial_number.clone(),
        status: roll.status,
        event,
    }
}

/// Ready for Lamination -> Sent for Lamination, recording the call-out
/// note that travels with the dispatch.
pub fn send_for_lamination(roll: &mut Roll, call_out: &str) -> Result<(), LifecycleError> {
    if roll.status != RollStatus::ReadyForLamination {
        return Err(reject(roll, "be sent for lamination"));
    }
    roll.status = RollStatus::SentForLamination;
    roll.call_out = Some(call_out.to_string());
    Ok(())
}

/// Sent for Lamination -> Laminated, in place.
pub fn mark_received(roll: &mut Roll) -> Result<(), LifecycleError> {
    if roll.status != RollStatus::SentForLamination {
        return Err(reject(roll, "be received from lamination"));
    }
    roll.status = RollStatus::Laminated;
    roll.is_laminated = true;
    Ok(())
}

/// Laminated -> For Work Order.
pub fn send_for_work_order(roll: &mut Roll) -> Result<(), LifecycleError> {
    if roll.status != RollStatus::Laminated {
        return Err(reject(roll, "be designated for a work order"));
    }
    roll.status = RollStatus::ForWorkOrder;
    Ok(())
}

/// For Work Order -> In Progress, when a work order claims the roll.
pub fn begin_work_order(roll: &mut Roll) -> Result<(), LifecycleError> {
    if roll.status != RollStatus::ForWorkOrder {
        return Err(reject(roll, "be placed into a work order"));
    }
    roll.status = RollStatus::InProgress;
    Ok(())
}

/// Any non-terminal state -> Consumed.
///
/// Full consumption keeps the quantities as they stand; only partial
/// splits zero a roll out. The consumption metadata is attached here.
pub fn mark_consumed(roll: &mut Roll, info: &ConsumptionInfo) -> Result<(), LifecycleError> {
    if roll.status.is_terminal() {
        return Err(reject(roll, "be consumed again"));
    }
    roll.status = RollStatus::Consumed;
    roll.attach_consumption(info);
    Ok(())
}

/// Guard for the partial-consumption splitter: the roll must still be in
/// a state with remaining quantity.
pub fn ensure_splittable(roll: &Roll) -> Result<(), LifecycleError> {
    if roll.status.is_terminal() {
        return Err(reject(roll, "be partially consumed"));
    }
    Ok(())
}
