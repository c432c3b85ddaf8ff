//! Raw collection handlers
//!
//! The whole-collection storage contract: GET returns the full array,
//! POST replaces it. Kept for the spreadsheet-era tooling that syncs the
//! files wholesale; day-to-day mutations go through the operation
//! endpoints instead.

use axum::{extract::State, Json};
use serde::Serialize;

use shared::{Roll, WorkOrder};

use crate::error::AppResult;
use crate::services::{RollService, WorkOrderService};
use crate::AppState;

#[derive(Serialize)]
pub struct ReplacedResponse {
    pub replaced: usize,
}

/// Full roll collection
pub async fn get_rolls(State(state): State<AppState>) -> Json<Vec<Roll>> {
    Json(state.repo.rolls().await)
}

/// Replace the full roll collection
pub async fn replace_rolls(
    State(state): State<AppState>,
    Json(rolls): Json<Vec<Roll>>,
) -> AppResult<Json<ReplacedResponse>> {
    let service = RollService::new(state.repo.clone());
    let replaced = service.replace_all(rolls).await?;
    Ok(Json(ReplacedResponse { replaced }))
}

/// Full work-order collection
pub async fn get_work_orders(State(state): State<AppState>) -> Json<Vec<WorkOrder>> {
    Json(state.repo.work_orders().await)
}

/// Replace the full work-order collection
pub async fn replace_work_orders(
    State(state): State<AppState>,
    Json(work_orders): Json<Vec<WorkOrder>>,
) -> AppResult<Json<ReplacedResponse>> {
    let service = WorkOrderService::new(state.repo.clone());
    let replaced = service.replace_all(work_orders).await?;
    Ok(Json(ReplacedResponse { replaced }))
}
