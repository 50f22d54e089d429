//! Error handling for the Stockbook backend
//!
//! Every failure is rendered as `{"error": {"code", "message", ...}}` with a
//! status code matching its category.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::StockError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Stock errors
    #[error("Insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("No stock available")]
    NoStock,

    #[error("Invalid adjustment: cannot remove {requested} from {current:?}")]
    InvalidAdjustment { current: Option<i32>, requested: i32 },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for a field-level validation failure
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::InvalidQuantity(_) | StockError::QuantityOverflow => {
                AppError::validation("quantity", err.to_string())
            }
            StockError::NoStock => AppError::NoStock,
            StockError::InsufficientStock {
                available,
                requested,
            } => AppError::InsufficientStock {
                available,
                requested,
            },
            StockError::InvalidAdjustment { current, requested } => {
                AppError::InvalidAdjustment { current, requested }
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let first = errors
            .field_errors()
            .into_iter()
            .min_by_key(|(field, _)| *field);

        match first {
            Some((field, field_errors)) => {
                let message = field_errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                AppError::validation(field, message)
            }
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_stock: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortage: Option<i32>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
            available_stock: None,
            current_quantity: None,
            requested_quantity: None,
            shortage: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// PostgreSQL SQLSTATE codes that map to client-visible statuses
fn database_error_detail(err: &sqlx::Error) -> (StatusCode, ErrorDetail) {
    if let sqlx::Error::RowNotFound = err {
        return (
            StatusCode::NOT_FOUND,
            ErrorDetail::new("NOT_FOUND", "Record not found"),
        );
    }

    if let sqlx::Error::Database(db_err) = err {
        match db_err.code().as_deref() {
            Some("40001") | Some("40P01") => {
                return (
                    StatusCode::CONFLICT,
                    ErrorDetail::new(
                        "CONCURRENT_UPDATE",
                        "The record was modified concurrently, please retry",
                    ),
                )
            }
            Some("23505") => {
                return (
                    StatusCode::CONFLICT,
                    ErrorDetail::new("DUPLICATE_ENTRY", "A record with these values already exists"),
                )
            }
            Some("23503") => {
                return (
                    StatusCode::CONFLICT,
                    ErrorDetail::new(
                        "REFERENCE_CONFLICT",
                        "The record is referenced by other records or references a missing one",
                    ),
                )
            }
            Some("22003") => {
                return (
                    StatusCode::BAD_REQUEST,
                    ErrorDetail::new("VALIDATION_ERROR", "A numeric value is out of range"),
                )
            }
            Some("23514") => {
                return (
                    StatusCode::CONFLICT,
                    ErrorDetail::new("CONSTRAINT_VIOLATION", "The change violates a data constraint"),
                )
            }
            _ => {}
        }
    }

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_CREDENTIALS", "Invalid credentials"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_TOKEN", "Token is not valid"),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone()),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone()).with_field(field.clone()),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", msg.clone()),
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "DUPLICATE_ENTRY",
                    format!("A record with this {} already exists", field),
                )
                .with_field(field.clone()),
            ),
            AppError::Conflict { resource, message } => (
                StatusCode::CONFLICT,
                ErrorDetail::new("CONFLICT", message.clone()).with_field(resource.clone()),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::InsufficientStock {
                available,
                requested,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    available_stock: Some(*available),
                    requested_quantity: Some(*requested),
                    shortage: Some(requested - available),
                    ..ErrorDetail::new("INSUFFICIENT_STOCK", "Insufficient stock available")
                },
            ),
            AppError::NoStock => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    available_stock: Some(0),
                    ..ErrorDetail::new("NO_STOCK", "No stock available for this product")
                },
            ),
            AppError::InvalidAdjustment { current, requested } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    current_quantity: Some(current.unwrap_or(0)),
                    requested_quantity: Some(*requested),
                    ..ErrorDetail::new(
                        "INVALID_ADJUSTMENT",
                        match current {
                            Some(_) => "Cannot decrease stock below zero",
                            None => "No stock record found for this product",
                        },
                    )
                },
            ),
            AppError::DatabaseError(err) => database_error_detail(err),
            AppError::Internal(_) | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!(status = %status, "Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
