//! Roll lifecycle HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::{ConsumptionInfo, Roll};

use crate::error::AppResult;
use crate::services::roll::{
    CreateRollInput, MarkReceivedInput, PartialConsumeInput, PartialConsumeResponse, RollFilter,
};
use crate::services::RollService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendForLaminationInput {
    pub ids: Vec<Uuid>,
    #[serde(default)]
    pub call_out: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdsInput {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkConsumedInput {
    pub ids: Vec<Uuid>,
    #[serde(flatten)]
    pub consumption: ConsumptionInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborateInput {
    pub ids: Vec<Uuid>,
    pub new_roll: CreateRollInput,
}

/// List rolls, optionally filtered by status, lamination or consumption.
pub async fn list_rolls(
    State(state): State<AppState>,
    Query(filter): Query<RollFilter>,
) -> AppResult<Json<Vec<Roll>>> {
    let service = RollService::new(state.repo.clone());
    let rolls = service.list_rolls(&filter).await?;
    Ok(Json(rolls))
}

/// Log a new roll
pub async fn create_roll(
    State(state): State<AppState>,
    Json(input): Json<CreateRollInput>,
) -> AppResult<(StatusCode, Json<Roll>)> {
    let service = RollService::new(state.repo.clone());
    let roll = service.create_roll(input).await?;
    Ok((StatusCode::CREATED, Json(roll)))
}

/// Bag production log: consumed rolls with bag details
pub async fn bags_produced(State(state): State<AppState>) -> AppResult<Json<Vec<Roll>>> {
    let service = RollService::new(state.repo.clone());
    let rolls = service.bags_produced().await?;
    Ok(Json(rolls))
}

/// Send selected rolls for lamination
pub async fn send_for_lamination(
    State(state): State<AppState>,
    Json(input): Json<SendForLaminationInput>,
) -> AppResult<Json<Vec<Roll>>> {
    let service = RollService::new(state.repo.clone());
    let rolls = service
        .send_for_lamination(&input.ids, &input.call_out)
        .await?;
    Ok(Json(rolls))
}

/// Mark selected rolls received back from lamination
pub async fn mark_received(
    State(state): State<AppState>,
    Json(input): Json<MarkReceivedInput>,
) -> AppResult<Json<Vec<Roll>>> {
    let service = RollService::new(state.repo.clone());
    let rolls = service.mark_received(input).await?;
    Ok(Json(rolls))
}

/// Combine sent-for-lamination rolls into one new laminated roll
pub async fn collaborate(
    State(state): State<AppState>,
    Json(input): Json<CollaborateInput>,
) -> AppResult<(StatusCode, Json<Roll>)> {
    let service = RollService::new(state.repo.clone());
    let roll = service
        .collaborate_and_create(&input.ids, input.new_roll)
        .await?;
    Ok((StatusCode::CREATED, Json(roll)))
}

/// Designate laminated rolls for work orders
pub async fn send_for_work_order(
    State(state): State<AppState>,
    Json(input): Json<IdsInput>,
) -> AppResult<Json<Vec<Roll>>> {
    let service = RollService::new(state.repo.clone());
    let rolls = service.send_for_work_order(&input.ids).await?;
    Ok(Json(rolls))
}

/// Fully consume selected rolls
pub async fn mark_consumed(
    State(state): State<AppState>,
    Json(input): Json<MarkConsumedInput>,
) -> AppResult<Json<Vec<Roll>>> {
    let service = RollService::new(state.repo.clone());
    let rolls = service.mark_consumed(&input.ids, input.consumption).await?;
    Ok(Json(rolls))
}

/// Consume part of one roll
pub async fn partial_consume(
    State(state): State<AppState>,
    Path(roll_id): Path<Uuid>,
    Json(input): Json<PartialConsumeInput>,
) -> AppResult<Json<PartialConsumeResponse>> {
    let service = RollService::new(state.repo.clone());
    let outcome = service.partial_consume(roll_id, input).await?;
    Ok(Json(outcome))
}

/// Restore the previous snapshot of both collections
pub async fn undo(State(state): State<AppState>) -> AppResult<StatusCode> {
    let service = RollService::new(state.repo.clone());
    service.undo().await?;
    Ok(StatusCode::NO_CONTENT)
}
