//! Fabric roll models
//!
//! Wire format note: the collection files predate this backend and were
//! written by the previous client with camelCase keys and human-readable
//! status strings, so the serde attributes here preserve that format.
//! Legacy vocabularies ("Active Stock", "Lam active", ...) are accepted
//! on deserialization only and are never written back out.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::measurement::derive_measurements;

/// A single fabric roll, or a split portion of one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roll {
    pub id: Uuid,
    pub serial_number: String,
    pub operator_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loom_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Decimal>,
    /// Grams per square meter of the fabric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gram: Option<Decimal>,
    pub fabric_type: FabricType,
    pub color: String,
    #[serde(
        alias = "lamination",
        default,
        deserialize_with = "deserialize_lamination"
    )]
    pub is_laminated: bool,

    // Measurements
    pub mtrs: Decimal,
    pub gw: Decimal,
    pub cw: Decimal,
    pub nw: Decimal,
    pub average: Decimal,
    #[serde(alias = "variance")]
    pub variance_band: String,

    // Lifecycle
    pub status: RollStatus,
    pub production_date: DateTime<Utc>,

    // Consumption metadata, present once a roll is consumed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    /// Dispatch note attached when the roll was sent for lamination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_out: Option<String>,
    /// Serial the lamination plant returned the roll under, if renamed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_serial_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bag_production: Option<BagProduction>,
}

impl Roll {
    /// Recompute `nw`, `average` and the variance band from the current
    /// quantities. Every mutation of `mtrs`/`gw`/`cw` goes through this.
    pub fn recompute_derived(&mut self) {
        let derived = derive_measurements(self.mtrs, self.gw, self.cw, self.width, self.gram);
        self.nw = derived.nw;
        self.average = derived.average;
        self.variance_band = derived.variance_band;
    }

    /// Attach consumption metadata without touching quantities.
    pub fn attach_consumption(&mut self, info: &ConsumptionInfo) {
        self.consumed_by = Some(info.consumed_by.clone());
        if info.so_number.is_some() {
            self.so_number = info.so_number.clone();
        }
        if info.po_number.is_some() {
            self.po_number = info.po_number.clone();
        }
        if info.bag_production.is_some() {
            self.bag_production = info.bag_production.clone();
        }
    }
}

/// Roll lifecycle states.
///
/// The closed canonical set; earlier data files used a few alternate
/// spellings which map onto these at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollStatus {
    #[serde(rename = "Ready for Lamination", alias = "ReadyForLamination")]
    ReadyForLamination,
    #[serde(rename = "Sent for Lamination", alias = "SentForLamination")]
    SentForLamination,
    #[serde(
        rename = "Laminated",
        alias = "Active Stock",
        alias = "Received from Lamination"
    )]
    Laminated,
    #[serde(rename = "For Work Order", alias = "ForWorkOrder")]
    ForWorkOrder,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    #[serde(rename = "Partially Consumed", alias = "PartiallyConsumed")]
    PartiallyConsumed,
    Consumed,
}

impl RollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RollStatus::ReadyForLamination => "Ready for Lamination",
            RollStatus::SentForLamination => "Sent for Lamination",
            RollStatus::Laminated => "Laminated",
            RollStatus::ForWorkOrder => "For Work Order",
            RollStatus::InProgress => "In Progress",
            RollStatus::PartiallyConsumed => "Partially Consumed",
            RollStatus::Consumed => "Consumed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Ready for Lamination" => Some(RollStatus::ReadyForLamination),
            "Sent for Lamination" => Some(RollStatus::SentForLamination),
            "Laminated" | "Active Stock" | "Received from Lamination" => {
                Some(RollStatus::Laminated)
            }
            "For Work Order" => Some(RollStatus::ForWorkOrder),
            "In Progress" => Some(RollStatus::InProgress),
            "Partially Consumed" => Some(RollStatus::PartiallyConsumed),
            "Consumed" => Some(RollStatus::Consumed),
            _ => None,
        }
    }

    /// Consumed is the sole terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RollStatus::Consumed)
    }
}

impl std::fmt::Display for RollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fabric construction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FabricType {
    Slit,
    Tube,
}

impl std::fmt::Display for FabricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FabricType::Slit => write!(f, "Slit"),
            FabricType::Tube => write!(f, "Tube"),
        }
    }
}

/// Bag production details recorded when a roll is consumed into bags.
/// Attached as an optional record rather than flattened onto every roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BagProduction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_of_bags: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_bag_weight: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bag_size: Option<String>,
}

/// Metadata attached to a roll (or split portion) when it is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionInfo {
    pub consumed_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bag_production: Option<BagProduction>,
}

/// Older files stored lamination as a two-valued string; newer ones as a
/// boolean. Accept both, emit only the boolean.
fn deserialize_lamination<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Legacy(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Flag(flag) => Ok(flag),
        Raw::Legacy(s) => match s.as_str() {
            "Lam active" | "Laminated" => Ok(true),
            "Unlammed" | "Unlaminated" => Ok(false),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["Lam active", "Unlammed", "Laminated", "Unlaminated"],
            )),
        },
    }
}
