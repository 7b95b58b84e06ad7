use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

use crate::auth::policy::DenyReason;
use crate::types::ValidationError;

#[derive(Debug, ThisError)]
pub enum LockboxError {
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(DenyReason),

    #[error("{field} already exists")]
    Conflict { field: &'static str },

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("{0}")]
    Validation(String),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LockboxError {
    pub fn not_found(resource: &'static str) -> Self {
        LockboxError::NotFound { resource }
    }

    /// Translate a unique-constraint violation into `Conflict` on `field`;
    /// any other database error passes through.
    pub fn from_unique(err: SqlxError, field: &'static str) -> Self {
        let is_unique = err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation());
        if is_unique {
            LockboxError::Conflict { field }
        } else {
            LockboxError::Database(err)
        }
    }
}

impl From<ValidationError> for LockboxError {
    fn from(e: ValidationError) -> Self {
        LockboxError::Validation(e.message)
    }
}

impl From<figment::Error> for LockboxError {
    fn from(e: figment::Error) -> Self {
        LockboxError::Config(Box::new(e))
    }
}

impl IntoResponse for LockboxError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            LockboxError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody {
                    code: "UNAUTHENTICATED".to_string(),
                    message: "Authentication required.".to_string(),
                },
            ),
            LockboxError::Forbidden(reason) => (
                StatusCode::FORBIDDEN,
                ApiErrorBody {
                    code: "FORBIDDEN".to_string(),
                    message: reason.to_string(),
                },
            ),
            LockboxError::Conflict { field } => (
                StatusCode::CONFLICT,
                ApiErrorBody {
                    code: "CONFLICT".to_string(),
                    message: format!("{field} already exists"),
                },
            ),
            LockboxError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{resource} not found"),
                },
            ),
            LockboxError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "VALIDATION".to_string(),
                    message,
                },
            ),
            LockboxError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ApiErrorBody {
                    code: "PAYLOAD_TOO_LARGE".to_string(),
                    message: "request body too large".to_string(),
                },
            ),
            internal @ (LockboxError::Database(_)
            | LockboxError::Hashing(_)
            | LockboxError::Config(_)
            | LockboxError::Io(_)) => {
                error!(error = %internal, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody {
                        code: "INTERNAL_ERROR".to_string(),
                        message: "An internal server error occurred.".to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
