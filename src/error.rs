//! Error taxonomy shared by services and handlers.

use axum::{http::StatusCode, Json};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::submission::SubmissionStatus;
use crate::models::ErrorResponse;
use crate::repositories::RepositoryError;

/// Input rejected before anything is persisted.
///
/// `field` points at the offending value, including the entry index for
/// list inputs (e.g. `trees[2].diameter_cm`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("authentication required")]
    Unauthorized,

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("cannot move submission from {from} to {to}")]
    InvalidTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("Insufficient balance for withdrawal: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    #[error("database error: {0}")]
    Database(#[source] sea_orm::DbErr),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => AppError::NotFound(what.to_string()),
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            RepositoryError::InsufficientBalance {
                requested,
                available,
            } => AppError::InsufficientBalance {
                requested,
                available,
            },
            RepositoryError::Database(e) => AppError::Database(e),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition { .. } | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: AppError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", err);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, err);
        }

        (
            status,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Result type of every JSON handler
pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Handler result for endpoints answering `201 Created`
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), (StatusCode, Json<ErrorResponse>)>;
