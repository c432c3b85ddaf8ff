//! Partial-consumption splitter
//!
//! Splits a roll into a consumed portion and an updated remainder. The
//! remainder keeps the original id and core weight (the core tube stays
//! on the remainder); the consumed portion becomes a fresh Consumed roll
//! under the same serial number.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::lifecycle::{ensure_splittable, LifecycleError};
use crate::measurement::average_out_of_band;
use crate::models::{ConsumptionInfo, Roll, RollStatus};

/// The measured portion being consumed out of a roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedPart {
    pub mtrs: Decimal,
    pub gw: Decimal,
    pub cw: Decimal,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("cannot consume more {field} than available ({available})")]
    ExceedsAvailable {
        field: &'static str,
        requested: Decimal,
        available: Decimal,
    },
    #[error("consumed {field} must not be negative")]
    NegativeQuantity { field: &'static str },
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Result of a split: the shrunken original and the new consumed record.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub remainder: Roll,
    pub consumed: Roll,
    /// True when the consumed portion's average falls outside the
    /// variance band of the fabric specification.
    pub average_out_of_band: bool,
}

/// Split `part` out of `original`.
///
/// Fails without producing anything when the roll is terminal or the
/// part exceeds what is available; on success both returned rolls carry
/// freshly derived measurements. When the remainder reaches zero meters
/// and zero gross weight it is forced to Consumed with all quantities
/// zeroed.
pub fn split_partial(
    original: &Roll,
    part: &ConsumedPart,
    info: &ConsumptionInfo,
) -> Result<SplitOutcome, SplitError> {
    ensure_splittable(original)?;
    check_part(part, original)?;

    let mut remainder = original.clone();
    remainder.mtrs -= part.mtrs;
    remainder.gw -= part.gw;
    remainder.recompute_derived();
    if remainder.mtrs <= Decimal::ZERO && remainder.gw <= Decimal::ZERO {
        remainder.status = RollStatus::Consumed;
        remainder.mtrs = Decimal::ZERO;
        remainder.gw = Decimal::ZERO;
        remainder.cw = Decimal::ZERO;
        remainder.recompute_derived();
        remainder.attach_consumption(info);
    } else {
        remainder.status = RollStatus::PartiallyConsumed;
    }

    let mut consumed = original.clone();
    consumed.id = Uuid::new_v4();
    consumed.mtrs = part.mtrs;
    consumed.gw = part.gw;
    consumed.cw = part.cw;
    consumed.recompute_derived();
    consumed.status = RollStatus::Consumed;
    consumed.production_date = Utc::now();
    consumed.attach_consumption(info);

    let out_of_band = average_out_of_band(consumed.average, original.width, original.gram);

    Ok(SplitOutcome {
        remainder,
        consumed,
        average_out_of_band: out_of_band,
    })
}

fn check_part(part: &ConsumedPart, original: &Roll) -> Result<(), SplitError> {
    for (field, requested) in [("mtrs", part.mtrs), ("gw", part.gw), ("cw", part.cw)] {
        if requested < Decimal::ZERO {
            return Err(SplitError::NegativeQuantity { field });
        }
    }
    for (field, requested, available) in [
        ("mtrs", part.mtrs, original.mtrs),
        ("gw", part.gw, original.gw),
        ("cw", part.cw, original.cw),
    ] {
        if requested > available {
            return Err(SplitError::ExceedsAvailable {
                field,
                requested,
                available,
            });
        }
    }
    Ok(())
}
