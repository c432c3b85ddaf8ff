//! Work-order HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use shared::WorkOrder;

use crate::error::AppResult;
use crate::services::work_order::{
    ConsumeWorkOrderInput, ConsumeWorkOrderResponse, CreateWorkOrderInput,
};
use crate::services::WorkOrderService;
use crate::AppState;

#[derive(Serialize)]
pub struct ToggleResponse {
    pub toggled: bool,
}

/// List all open work orders
pub async fn list_work_orders(State(state): State<AppState>) -> Json<Vec<WorkOrder>> {
    let service = WorkOrderService::new(state.repo.clone());
    Json(service.list().await)
}

/// Create a work order over for-work-order rolls
pub async fn create_work_order(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkOrderInput>,
) -> AppResult<(StatusCode, Json<WorkOrder>)> {
    let service = WorkOrderService::new(state.repo.clone());
    let order = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Toggle one child PID's completion flag
pub async fn toggle_child_completion(
    State(state): State<AppState>,
    Path((work_order_id, pid)): Path<(Uuid, String)>,
) -> AppResult<Json<ToggleResponse>> {
    let service = WorkOrderService::new(state.repo.clone());
    let toggled = service.toggle_child(work_order_id, &pid).await?;
    Ok(Json(ToggleResponse { toggled }))
}

/// Resolve a work order with per-roll consumption outcomes
pub async fn consume_work_order(
    State(state): State<AppState>,
    Path(work_order_id): Path<Uuid>,
    Json(input): Json<ConsumeWorkOrderInput>,
) -> AppResult<Json<ConsumeWorkOrderResponse>> {
    let service = WorkOrderService::new(state.repo.clone());
    let outcome = service.consume(work_order_id, input).await?;
    Ok(Json(outcome))
}
