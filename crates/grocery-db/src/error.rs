//! # Database Error Types
//!
//! Error types for database operations and bill issuing.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├──► IssueBillError ← What the bill sequencer reports            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (grocery-api) ← Serialized for the till                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use grocery_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate product code
    /// - Registering an email twice
    /// - Two writers minting the same bill id
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// CHECK / NOT NULL / FOREIGN KEY violation.
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created or opened
    /// - File permissions issue
    /// - Pool already closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Another writer held the database lock past the busy timeout.
    #[error("Database is busy: {0}")]
    Busy(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value could not be decoded (corrupt JSON column, bad date).
    #[error("Corrupt {entity} row: {message}")]
    Corrupt { entity: String, message: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether this is a unique constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }

    /// Whether the store could not be reached or locked in time.
    ///
    /// These are the failures a client may retry later; everything else is
    /// either a caller mistake or a bug.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_) | DbError::Busy(_) | DbError::PoolExhausted
        )
    }

    /// Fills in the field and value of a UniqueViolation raised by sqlx,
    /// which only knows the `table.column` SQLite reports.
    pub fn with_duplicate_value(self, field: &str, value: &str) -> Self {
        match self {
            DbError::UniqueViolation { .. } => DbError::duplicate(field, value),
            other => other,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze kind/message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::Io / PoolClosed→ DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite messages:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // Lock contention:   "database is locked" (SQLITE_BUSY)
                if db_err.is_unique_violation() || msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if db_err.is_check_violation()
                    || db_err.is_foreign_key_violation()
                    || msg.contains("constraint failed")
                {
                    DbError::ConstraintViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("database is locked") || msg.contains("database is busy") {
                    DbError::Busy(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(io_err) => DbError::ConnectionFailed(io_err.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Bill Issuing Errors
// =============================================================================

/// Why a bill could not be issued.
///
/// Every variant means nothing was persisted: the counter row and the bill
/// row are written in one transaction that is rolled back on failure.
///
/// ```text
/// ┌──────────────────┬────────────────────────────┬──────────────────────┐
/// │ Variant          │ Cause                      │ Caller should        │
/// ├──────────────────┼────────────────────────────┼──────────────────────┤
/// │ Validation       │ empty lines, negative total│ fix input            │
/// │ Conflict         │ bill_id already taken      │ retry once           │
/// │ Exhausted        │ month past 999999          │ give up              │
/// │ StoreUnavailable │ db down, locked, I/O error │ surface, retry later │
/// └──────────────────┴────────────────────────────┴──────────────────────┘
/// ```
#[derive(Debug, Error)]
pub enum IssueBillError {
    /// Input was rejected before the store was touched.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The minted bill id already exists (counter and bill table disagree).
    #[error("Bill id {bill_id} already exists")]
    Conflict { prefix: String, bill_id: String },

    /// The month's counter has run past the six-digit suffix.
    #[error("Bill numbers for {prefix} are exhausted")]
    Exhausted { prefix: String },

    /// The store failed; the transaction was rolled back.
    #[error("Bill store unavailable: {source}")]
    StoreUnavailable {
        prefix: String,
        bill_id: Option<String>,
        #[source]
        source: DbError,
    },
}

impl IssueBillError {
    /// Whether retrying the same request once may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IssueBillError::Conflict { .. })
    }
}

impl From<CoreError> for IssueBillError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => IssueBillError::Validation(v),
            CoreError::SequenceExhausted { prefix, .. } => IssueBillError::Exhausted { prefix },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
