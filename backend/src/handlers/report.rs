//! Reporting handlers: AI summary, CSV export and the dispatch note

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::external::summary::{SummaryRequest, SummaryResponse};
use crate::external::SummaryClient;
use crate::services::SpreadsheetService;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchNoteInput {
    pub ids: Vec<Uuid>,
}

/// Generate a text summary of the current loom data via the external
/// text-generation service.
pub async fn generate_summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> AppResult<Json<SummaryResponse>> {
    let client = SummaryClient::new(
        state.config.summary.api_endpoint.clone(),
        state.config.summary.api_key.clone(),
    );
    let response = client.generate(request).await?;
    Ok(Json(response))
}

/// Export the full roll collection as CSV
pub async fn export_csv(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let service = SpreadsheetService::new(state.repo.clone());
    let csv = service.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"loom-data.csv\"",
            ),
        ],
        csv,
    ))
}

/// Render a plain-text dispatch note for selected rolls
pub async fn dispatch_note(
    State(state): State<AppState>,
    Json(input): Json<DispatchNoteInput>,
) -> AppResult<impl IntoResponse> {
    let service = SpreadsheetService::new(state.repo.clone());
    let note = service.dispatch_note(&input.ids).await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], note))
}

/// Import spreadsheet rows into the roll collection
pub async fn import_rolls(
    State(state): State<AppState>,
    Json(rows): Json<Vec<serde_json::Value>>,
) -> AppResult<Json<ImportResponse>> {
    let service = SpreadsheetService::new(state.repo.clone());
    let imported = service.import(rows).await?;
    Ok(Json(ImportResponse {
        imported: imported.len(),
    }))
}

#[derive(serde::Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}
