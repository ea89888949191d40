//! Core error types for the Kakebo engine.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger engine.
///
/// Database-specific errors are wrapped in string form to keep this type
/// database-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Ledger operation failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Typed failures raised by the money-safe operations.
///
/// These are the engine's contract with its callers: validation failures abort
/// the surrounding transaction before any mutation, and the execution engine
/// converts failures from scheduled runs into failed execution records instead
/// of letting them escape the sweep loop.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The entity does not exist or is not owned by the calling user.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// An amount, share count, or price was zero or negative where a
    /// strictly positive value is required.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The source account balance is below the required debit.
    #[error("insufficient balance in account {account_id}: available {available}, required {required}")]
    InsufficientBalance {
        account_id: String,
        available: Decimal,
        required: Decimal,
    },

    /// An account of the wrong type was used for an operation (credit account
    /// as a transfer source, investment account as a plain transfer target,
    /// non-investment account in a trade).
    #[error("invalid account role: {0}")]
    InvalidAccountRole(String),

    /// Missing or out-of-range execution day for a weekly/monthly plan, or an
    /// execution day supplied for a daily plan.
    #[error("invalid frequency configuration: {0}")]
    InvalidFrequencyConfig(String),

    /// Reconciliation was requested but the asserted balance already matches
    /// the stored balance exactly.
    #[error("stored balance already matches the actual balance, no adjustment needed")]
    NoAdjustmentNeeded,

    /// The referenced transaction has no refundable remainder left.
    #[error("transaction {0} has already been fully refunded")]
    AlreadyFullyRefunded(String),

    /// The requested refund is larger than what remains refundable.
    #[error("refund amount {requested} exceeds refundable remainder {refundable}")]
    RefundExceedsRefundable {
        requested: Decimal,
        refundable: Decimal,
    },
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
