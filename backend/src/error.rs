//! Error handling for the LoomTrack backend
//!
//! Every failure surfaces as a coded JSON body so the operator UI can
//! map it to a toast without parsing prose.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use shared::{LifecycleError, SplitError};

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Import rejected: {} invalid rows", .0.len())]
    ImportRejected(Vec<RowError>),

    #[error("Duplicate roll in work order: {0}")]
    DuplicateRoll(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient quantity: cannot consume {requested} {field}, only {available} available")]
    InsufficientQuantity {
        field: String,
        requested: String,
        available: String,
    },

    #[error("Nothing to undo")]
    NothingToUndo,

    // External service errors
    #[error("Summary service error: {0}")]
    SummaryServiceError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    InternalError(#[from] anyhow::Error),
}

/// A single rejected row of a spreadsheet import.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {} ({})", self.row, self.message, self.field)
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        AppError::InvalidStateTransition(err.to_string())
    }
}

impl From<SplitError> for AppError {
    fn from(err: SplitError) -> Self {
        match err {
            SplitError::ExceedsAvailable {
                field,
                requested,
                available,
            } => AppError::InsufficientQuantity {
                field: field.to_string(),
                requested: requested.to_string(),
                available: available.to_string(),
            },
            SplitError::NegativeQuantity { field } => AppError::Validation {
                field: field.to_string(),
                message: "Consumed quantity must not be negative".to_string(),
            },
            SplitError::Lifecycle(inner) => inner.into(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<RowError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                    rows: None,
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                    rows: None,
                },
            ),
            AppError::ImportRejected(rows) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "IMPORT_REJECTED".to_string(),
                    message: format!("{} rows failed validation; nothing was imported", rows.len()),
                    field: None,
                    rows: Some(rows.clone()),
                },
            ),
            AppError::DuplicateRoll(serial) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "DUPLICATE_ROLL".to_string(),
                    message: format!(
                        "Roll {} is already claimed by another child PID in this work order",
                        serial
                    ),
                    field: Some("childPids".to_string()),
                    rows: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                    rows: None,
                },
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_STATE_TRANSITION".to_string(),
                    message: msg.clone(),
                    field: None,
                    rows: None,
                },
            ),
            AppError::InsufficientQuantity {
                field,
                requested,
                available,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_QUANTITY".to_string(),
                    message: format!(
                        "Cannot consume {} {}, only {} available",
                        requested, field, available
                    ),
                    field: Some(field.clone()),
                    rows: None,
                },
            ),
            AppError::NothingToUndo => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "NOTHING_TO_UNDO".to_string(),
                    message: "No snapshot available to undo".to_string(),
                    field: None,
                    rows: None,
                },
            ),
            AppError::SummaryServiceError(msg) => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail {
                    code: "SUMMARY_SERVICE_ERROR".to_string(),
                    message: format!("Summary service error: {}", msg),
                    field: None,
                    rows: None,
                },
            ),
            AppError::StorageError(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "STORAGE_ERROR".to_string(),
                    message: format!("Storage error: {}", msg),
                    field: None,
                    rows: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message: format!("Configuration error: {}", msg),
                    field: None,
                    rows: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                    rows: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                    rows: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
