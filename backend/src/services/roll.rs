//! Roll service: entry, lifecycle operations and partial consumption

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::{
    derive_measurements, lifecycle, split_partial, validate_roll, BagProduction, ConsumedPart,
    ConsumptionInfo, FabricType, Roll, RollStatus,
};

use crate::error::{AppError, AppResult};
use crate::repository::Repository;

/// Roll service for entry and status management
#[derive(Clone)]
pub struct RollService {
    repo: Repository,
}

/// Input for logging a new roll
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRollInput {
    #[validate(length(min = 1, message = "Roll number is required"))]
    pub serial_number: String,
    #[validate(length(min = 1, message = "Operator name is required"))]
    pub operator_name: String,
    #[serde(default)]
    pub loom_no: Option<String>,
    #[serde(default)]
    pub width: Option<Decimal>,
    #[serde(default)]
    pub gram: Option<Decimal>,
    pub fabric_type: FabricType,
    pub color: String,
    #[serde(default)]
    pub is_laminated: bool,
    pub mtrs: Decimal,
    pub gw: Decimal,
    pub cw: Decimal,
}

/// List filters; all optional, matching the admin table filters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollFilter {
    pub status: Option<String>,
    pub laminated: Option<bool>,
    /// true: only consumed rolls; false: only remaining rolls.
    pub consumed: Option<bool>,
}

/// Input for marking rolls received back from lamination
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReceivedInput {
    pub ids: Vec<Uuid>,
    #[serde(default)]
    pub new_serial_number: Option<String>,
    #[serde(default)]
    pub received_serial_number: Option<String>,
}

/// Input for consuming part of one roll
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConsumeInput {
    pub mtrs: Decimal,
    pub gw: Decimal,
    pub cw: Decimal,
    pub consumed_by: String,
    #[serde(default)]
    pub so_number: Option<String>,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub bag_production: Option<BagProduction>,
}

/// Result of a partial consumption
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConsumeResponse {
    pub remainder: Roll,
    pub consumed: Roll,
    pub average_out_of_band: bool,
}

impl RollService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Log a new roll at the start of the lifecycle.
    pub async fn create_roll(&self, input: CreateRollInput) -> AppResult<Roll> {
        let roll = build_roll(input, RollStatus::ReadyForLamination)?;
        self.repo
            .mutate(|rolls, _| {
                rolls.push(roll.clone());
                Ok(roll.clone())
            })
            .await
    }

    /// All rolls matching the given filters.
    pub async fn list_rolls(&self, filter: &RollFilter) -> AppResult<Vec<Roll>> {
        let status = match &filter.status {
            Some(s) => Some(
                RollStatus::from_str(s)
                    .ok_or_else(|| AppError::ValidationError(format!("Unknown status: {}", s)))?,
            ),
            None => None,
        };

        let rolls = self.repo.rolls().await;
        Ok(rolls
            .into_iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .filter(|r| filter.laminated.map_or(true, |lam| r.is_laminated == lam))
            .filter(|r| {
                filter
                    .consumed
                    .map_or(true, |c| (r.status == RollStatus::Consumed) == c)
            })
            .collect())
    }

    /// Consumed rolls carrying bag-production details.
    pub async fn bags_produced(&self) -> AppResult<Vec<Roll>> {
        let rolls = self.repo.rolls().await;
        Ok(rolls
            .into_iter()
            .filter(|r| r.status == RollStatus::Consumed && r.bag_production.is_some())
            .collect())
    }

    /// Send rolls out for lamination with a call-out note.
    pub async fn send_for_lamination(&self, ids: &[Uuid], call_out: &str) -> AppResult<Vec<Roll>> {
        require_ids(ids)?;
        let ids = ids.to_vec();
        let call_out = call_out.to_string();
        self.repo
            .mutate(move |rolls, _| {
                ensure_all_present(rolls, &ids)?;
                let mut updated = Vec::with_capacity(ids.len());
                for roll in rolls.iter_mut().filter(|r| ids.contains(&r.id)) {
                    lifecycle::send_for_lamination(roll, &call_out)?;
                    updated.push(roll.clone());
                }
                Ok(updated)
            })
            .await
    }

    /// Mark rolls received back from lamination.
    ///
    /// A single roll received under a new serial replays the rename path:
    /// the source roll is consumed with a lamination note and a fresh
    /// laminated roll is created under the new serial. Everything else is
    /// an in-place flip to Laminated.
    pub async fn mark_received(&self, input: MarkReceivedInput) -> AppResult<Vec<Roll>> {
        require_ids(&input.ids)?;
        let rename = match (&input.new_serial_number, &input.received_serial_number) {
            (Some(new_serial), Some(received)) if input.ids.len() == 1 => {
                Some((new_serial.clone(), received.clone()))
            }
            _ => None,
        };

        let ids = input.ids.clone();
        self.repo
            .mutate(move |rolls, _| {
                ensure_all_present(rolls, &ids)?;

                if let Some((new_serial, received)) = rename {
                    let source = rolls
                        .iter_mut()
                        .find(|r| r.id == ids[0])
                        .expect("presence checked above");
                    if source.status != RollStatus::SentForLamination {
                        return Err(AppError::InvalidStateTransition(format!(
                            "roll {} is '{}' and cannot be received from lamination",
                            source.serial_number, source.status
                        )));
                    }

                    let mut renamed = source.clone();
                    renamed.id = Uuid::new_v4();
                    renamed.serial_number = new_serial.clone();
                    renamed.received_serial_number = Some(received.clone());
                    renamed.production_date = chrono::Utc::now();
                    renamed.is_laminated = true;
                    renamed.status = RollStatus::Laminated;

                    source.status = RollStatus::Consumed;
                    source.consumed_by = Some(format!(
                        "Lam:\nNew Roll No. {}\nReceived Roll No: {}",
                        new_serial, received
                    ));

                    let updated = vec![source.clone(), renamed.clone()];
                    rolls.push(renamed);
                    return Ok(updated);
                }

                let mut updated = Vec::with_capacity(ids.len());
                for roll in rolls.iter_mut().filter(|r| ids.contains(&r.id)) {
                    lifecycle::mark_received(roll)?;
                    updated.push(roll.clone());
                }
                Ok(updated)
            })
            .await
    }

    /// Consume several sent-for-lamination rolls into one new laminated
    /// roll. The sources record the combined serials they went into.
    pub async fn collaborate_and_create(
        &self,
        ids: &[Uuid],
        new_roll: CreateRollInput,
    ) -> AppResult<Roll> {
        require_ids(ids)?;
        let mut created = build_roll(new_roll, RollStatus::Laminated)?;
        created.is_laminated = true;

        let ids = ids.to_vec();
        self.repo
            .mutate(move |rolls, _| {
                ensure_all_present(rolls, &ids)?;

                let sources: Vec<&Roll> =
                    rolls.iter().filter(|r| ids.contains(&r.id)).collect();
                if let Some(bad) = sources
                    .iter()
                    .find(|r| r.status != RollStatus::SentForLamination)
                {
                    return Err(AppError::InvalidStateTransition(format!(
                        "roll {} is '{}' and cannot be collaborated",
                        bad.serial_number, bad.status
                    )));
                }
                let consumed_by = sources
                    .iter()
                    .map(|r| r.serial_number.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");

                let info = ConsumptionInfo {
                    consumed_by,
                    so_number: None,
                    po_number: None,
                    bag_production: None,
                };
                for roll in rolls.iter_mut().filter(|r| ids.contains(&r.id)) {
                    lifecycle::mark_consumed(roll, &info)?;
                }

                rolls.push(created.clone());
                Ok(created.clone())
            })
            .await
    }

    /// Designate laminated rolls for work orders.
    pub async fn send_for_work_order(&self, ids: &[Uuid]) -> AppResult<Vec<Roll>> {
        require_ids(ids)?;
        let ids = ids.to_vec();
        self.repo
            .mutate(move |rolls, _| {
                ensure_all_present(rolls, &ids)?;
                let mut updated = Vec::with_capacity(ids.len());
                for roll in rolls.iter_mut().filter(|r| ids.contains(&r.id)) {
                    lifecycle::send_for_work_order(roll)?;
                    updated.push(roll.clone());
                }
                Ok(updated)
            })
            .await
    }

    /// Fully consume rolls, keeping their quantities as recorded.
    pub async fn mark_consumed(
        &self,
        ids: &[Uuid],
        info: ConsumptionInfo,
    ) -> AppResult<Vec<Roll>> {
        require_ids(ids)?;
        if info.consumed_by.trim().is_empty() {
            return Err(AppError::Validation {
                field: "consumedBy".to_string(),
                message: "Consumer name is required".to_string(),
            });
        }
        let ids = ids.to_vec();
        self.repo
            .mutate(move |rolls, _| {
                ensure_all_present(rolls, &ids)?;
                let mut updated = Vec::with_capacity(ids.len());
                for roll in rolls.iter_mut().filter(|r| ids.contains(&r.id)) {
                    lifecycle::mark_consumed(roll, &info)?;
                    updated.push(roll.clone());
                }
                Ok(updated)
            })
            .await
    }

    /// Split a consumed portion out of one roll.
    pub async fn partial_consume(
        &self,
        id: Uuid,
        input: PartialConsumeInput,
    ) -> AppResult<PartialConsumeResponse> {
        if input.consumed_by.trim().is_empty() {
            return Err(AppError::Validation {
                field: "consumedBy".to_string(),
                message: "Consumer name is required".to_string(),
            });
        }

        let part = ConsumedPart {
            mtrs: input.mtrs,
            gw: input.gw,
            cw: input.cw,
        };
        let info = ConsumptionInfo {
            consumed_by: input.consumed_by,
            so_number: input.so_number,
            po_number: input.po_number,
            bag_production: input.bag_production,
        };

        self.repo
            .mutate(move |rolls, _| {
                let index = rolls
                    .iter()
                    .position(|r| r.id == id)
                    .ok_or_else(|| AppError::NotFound(format!("Roll {}", id)))?;

                let outcome = split_partial(&rolls[index], &part, &info)?;
                rolls[index] = outcome.remainder.clone();
                rolls.push(outcome.consumed.clone());

                Ok(PartialConsumeResponse {
                    remainder: outcome.remainder,
                    consumed: outcome.consumed,
                    average_out_of_band: outcome.average_out_of_band,
                })
            })
            .await
    }

    /// Replace the whole roll collection (raw storage contract).
    pub async fn replace_all(&self, new_rolls: Vec<Roll>) -> AppResult<usize> {
        let count = new_rolls.len();
        self.repo
            .mutate(move |rolls, _| {
                *rolls = new_rolls;
                Ok(count)
            })
            .await
    }

    /// Restore the previous snapshot of both collections.
    pub async fn undo(&self) -> AppResult<()> {
        self.repo.undo().await
    }
}

/// Build a validated roll with derived measurements.
fn build_roll(input: CreateRollInput, status: RollStatus) -> AppResult<Roll> {
    input
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let derived = derive_measurements(input.mtrs, input.gw, input.cw, input.width, input.gram);
    let roll = Roll {
        id: Uuid::new_v4(),
        serial_number: input.serial_number,
        operator_name: input.operator_name,
        loom_no: input.loom_no,
        width: input.width,
        gram: input.gram,
        fabric_type: input.fabric_type,
        color: input.color,
        is_laminated: input.is_laminated,
        mtrs: input.mtrs,
        gw: input.gw,
        cw: input.cw,
        nw: derived.nw,
        average: derived.average,
        variance_band: derived.variance_band,
        status,
        production_date: chrono::Utc::now(),
        consumed_by: None,
        so_number: None,
        po_number: None,
        call_out: None,
        received_serial_number: None,
        bag_production: None,
    };

    validate_roll(&roll).map_err(|msg| AppError::ValidationError(msg.to_string()))?;
    Ok(roll)
}

fn require_ids(ids: &[Uuid]) -> AppResult<()> {
    if ids.is_empty() {
        return Err(AppError::ValidationError(
            "At least one roll must be selected".to_string(),
        ));
    }
    Ok(())
}

fn ensure_all_present(rolls: &[Roll], ids: &[Uuid]) -> AppResult<()> {
    for id in ids {
        if !rolls.iter().any(|r| r.id == *id) {
            return Err(AppError::NotFound(format!("Roll {}", id)));
        }
    }
    Ok(())
}
