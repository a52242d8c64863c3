//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Grocery API                        │
//! │                                                                         │
//! │  Till (browser)              Rust Backend                               │
//! │  ──────────────              ────────────                               │
//! │                                                                         │
//! │  fetch('/dailybill/save-bill')                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler: Result<T, ApiError>                                    │  │
//! │  │         │                                                        │  │
//! │  │         ├── bad JSON?          JsonRejection    ──┐              │  │
//! │  │         ├── bad input?         ValidationError  ──┤              │  │
//! │  │         ├── store failure?     DbError          ──┼──► ApiError ►│  │
//! │  │         └── bill not issued?   IssueBillError   ──┘              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄──── 400 { "success": false,                                          │
//! │               "code": "VALIDATION_ERROR",                               │
//! │               "message": "items must contain at least one entry" }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store internals are logged, never sent to the client.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use grocery_core::{CoreError, ValidationError};
use grocery_db::{DbError, IssueBillError};

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "success": false,
///   "code": "NOT_FOUND",
///   "message": "Product not found: RICE-5KG"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Bad credentials (401)
    Unauthorized,

    /// Store unreachable or locked (503)
    ServiceUnavailable,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Wire body of an error response.
#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    code: ErrorCode,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            code: self.code,
            message: &self.message,
        };
        (self.code.status(), Json(body)).into_response()
    }
}

/// Malformed or mismatched JSON bodies are the client's fault.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::ConstraintViolation { message } => {
                error!("Constraint violation: {}", message);
                ApiError::validation("Invalid value")
            }
            err if err.is_unavailable() => {
                error!(error = %err, "Database unavailable");
                ApiError::new(ErrorCode::ServiceUnavailable, "Database unavailable")
            }
            other => {
                error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => v.into(),
            exhausted @ CoreError::SequenceExhausted { .. } => ApiError::internal(exhausted.to_string()),
        }
    }
}

/// Converts bill issuing errors to API errors.
///
/// A `Conflict` reaching this point already survived its one retry.
impl From<IssueBillError> for ApiError {
    fn from(err: IssueBillError) -> Self {
        match err {
            IssueBillError::Validation(v) => v.into(),
            IssueBillError::Conflict { prefix, bill_id } => {
                error!(prefix = %prefix, bill_id = %bill_id, "Bill id conflict persisted after retry");
                ApiError::internal("Could not allocate a bill number, please try again")
            }
            IssueBillError::Exhausted { prefix } => {
                error!(prefix = %prefix, "Bill numbers exhausted");
                ApiError::internal(format!("Bill numbers for {} are exhausted", prefix))
            }
            IssueBillError::StoreUnavailable {
                prefix,
                bill_id,
                source,
            } => {
                error!(prefix = %prefix, bill_id = ?bill_id, error = %source, "Bill store failure");
                if source.is_unavailable() {
                    ApiError::new(ErrorCode::ServiceUnavailable, "Bill store unavailable")
                } else {
                    ApiError::new(ErrorCode::DatabaseError, "Failed to save bill")
                }
            }
        }
    }
}
