//! Work-order service: grouping rolls for customer orders and resolving
//! their consumption

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::{
    child_roll_ids_unique, lifecycle, split_partial, validate_work_order_fields, BagProduction,
    ChildPid, ConsumedPart, ConsumptionInfo, Roll, WorkOrder,
};

use crate::error::{AppError, AppResult};
use crate::repository::Repository;

/// Work-order service
#[derive(Clone)]
pub struct WorkOrderService {
    repo: Repository,
}

/// Input for creating a work order
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkOrderInput {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "Parent PID is required"))]
    pub parent_pid: String,
    pub child_pids: Vec<ChildPidInput>,
}

/// One child line: a production id bound to a roll
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildPidInput {
    pub pid: String,
    pub roll_id: Uuid,
}

/// Per-roll consumption outcome when a work order is resolved
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOutcome {
    pub roll_id: Uuid,
    #[serde(flatten)]
    pub outcome: ConsumptionOutcome,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsumptionOutcome {
    /// Consume the whole roll, quantities as recorded.
    Full,
    /// Consume a measured portion; the remainder stays in the pool.
    Partial { part: ConsumedPart },
}

/// Input for resolving a work order
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeWorkOrderInput {
    pub outcomes: Vec<RollOutcome>,
    #[serde(default)]
    pub so_number: Option<String>,
    #[serde(default)]
    pub po_number: Option<String>,
    #[serde(default)]
    pub bag_production: Option<BagProduction>,
}

/// Result of resolving a work order
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeWorkOrderResponse {
    pub work_order_id: Uuid,
    pub parent_pid: String,
    pub rolls: Vec<Roll>,
}

impl WorkOrderService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Vec<WorkOrder> {
        self.repo.work_orders().await
    }

    /// Create a work order over for-work-order rolls, moving them to
    /// In Progress. Each roll may be claimed by at most one child PID.
    pub async fn create(&self, input: CreateWorkOrderInput) -> AppResult<WorkOrder> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let children: Vec<ChildPid> = input
            .child_pids
            .iter()
            .map(|c| ChildPid {
                pid: c.pid.clone(),
                roll_id: c.roll_id,
                roll_serial_number: None,
                completed: false,
            })
            .collect();

        validate_work_order_fields(&input.customer_name, &input.parent_pid, &children)
            .map_err(|msg| AppError::ValidationError(msg.to_string()))?;

        if !child_roll_ids_unique(&children) {
            let duplicate = first_duplicate(&children)
                .map(|id| id.to_string())
                .unwrap_or_default();
            return Err(AppError::DuplicateRoll(duplicate));
        }

        let order = WorkOrder {
            id: Uuid::new_v4(),
            customer_name: input.customer_name,
            parent_pid: input.parent_pid,
            created_at: chrono::Utc::now(),
            child_pids: children,
        };

        self.repo
            .mutate(move |rolls, work_orders| {
                let mut order = order;
                for child in order.child_pids.iter_mut() {
                    let roll = rolls
                        .iter_mut()
                        .find(|r| r.id == child.roll_id)
                        .ok_or_else(|| AppError::NotFound(format!("Roll {}", child.roll_id)))?;
                    lifecycle::begin_work_order(roll)?;
                    child.roll_serial_number = Some(roll.serial_number.clone());
                }
                work_orders.push(order.clone());
                Ok(order)
            })
            .await
    }

    /// Flip one child PID's completion flag. Unknown work-order ids and
    /// unknown pids are a no-op and do not touch the undo history.
    pub async fn toggle_child(&self, work_order_id: Uuid, pid: &str) -> AppResult<bool> {
        let known = self
            .list()
            .await
            .iter()
            .any(|wo| wo.id == work_order_id && wo.child_pids.iter().any(|c| c.pid == pid));
        if !known {
            return Ok(false);
        }

        let pid = pid.to_string();
        self.repo
            .mutate(move |_, work_orders| {
                let toggled = work_orders
                    .iter_mut()
                    .find(|wo| wo.id == work_order_id)
                    .map(|wo| wo.toggle_child(&pid))
                    .unwrap_or(false);
                Ok(toggled)
            })
            .await
    }

    /// Resolve a work order: every referenced roll gets a full or partial
    /// consumption outcome and the order itself is removed.
    pub async fn consume(
        &self,
        work_order_id: Uuid,
        input: ConsumeWorkOrderInput,
    ) -> AppResult<ConsumeWorkOrderResponse> {
        self.repo
            .mutate(move |rolls, work_orders| {
                let position = work_orders
                    .iter()
                    .position(|wo| wo.id == work_order_id)
                    .ok_or_else(|| AppError::NotFound(format!("Work order {}", work_order_id)))?;
                let order = work_orders[position].clone();

                for child in &order.child_pids {
                    if !input.outcomes.iter().any(|o| o.roll_id == child.roll_id) {
                        return Err(AppError::Validation {
                            field: "outcomes".to_string(),
                            message: format!(
                                "No consumption outcome given for roll {}",
                                child.roll_id
                            ),
                        });
                    }
                }
                for outcome in &input.outcomes {
                    if !order.child_pids.iter().any(|c| c.roll_id == outcome.roll_id) {
                        return Err(AppError::Validation {
                            field: "outcomes".to_string(),
                            message: format!(
                                "Roll {} does not belong to work order {}",
                                outcome.roll_id, order.parent_pid
                            ),
                        });
                    }
                }

                let info = ConsumptionInfo {
                    consumed_by: format!("WO: {}", order.parent_pid),
                    so_number: input.so_number.clone(),
                    po_number: input.po_number.clone(),
                    bag_production: input.bag_production.clone(),
                };

                let mut affected = Vec::new();
                for outcome in &input.outcomes {
                    let index = rolls
                        .iter()
                        .position(|r| r.id == outcome.roll_id)
                        .ok_or_else(|| {
                            AppError::NotFound(format!("Roll {}", outcome.roll_id))
                        })?;

                    match &outcome.outcome {
                        ConsumptionOutcome::Full => {
                            lifecycle::mark_consumed(&mut rolls[index], &info)?;
                            affected.push(rolls[index].clone());
                        }
                        ConsumptionOutcome::Partial { part } => {
                            let split = split_partial(&rolls[index], part, &info)?;
                            rolls[index] = split.remainder.clone();
                            affected.push(split.remainder);
                            affected.push(split.consumed.clone());
                            rolls.push(split.consumed);
                        }
                    }
                }

                work_orders.remove(position);

                Ok(ConsumeWorkOrderResponse {
                    work_order_id,
                    parent_pid: order.parent_pid,
                    rolls: affected,
                })
            })
            .await
    }

    /// Replace the whole work-order collection (raw storage contract).
    pub async fn replace_all(&self, new_orders: Vec<WorkOrder>) -> AppResult<usize> {
        let count = new_orders.len();
        self.repo
            .mutate(move |_, work_orders| {
                *work_orders = new_orders;
                Ok(count)
            })
            .await
    }
}

fn first_duplicate(children: &[ChildPid]) -> Option<Uuid> {
    for (i, child) in children.iter().enumerate() {
        if children[..i].iter().any(|c| c.roll_id == child.roll_id) {
            return Some(child.roll_id);
        }
    }
    None
}
