//! Unified error types for the payroll engine.
//!
//! Every core operation returns [`Result`]. Precondition and validation
//! failures are raised before any write; storage failures surface as
//! [`Error::Database`] and mean the whole logical operation must be retried.

use crate::core::period::PeriodKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An operation was attempted out of the allowed state order
    #[error("Operation rejected for {key}: {message}")]
    PreconditionViolation { key: PeriodKey, message: String },

    /// Malformed or missing input
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A transfer batch had members without a satisfied precondition; nothing was written
    #[error(
        "Transfer batch for {month:02}/{year} rejected: unprocessed salaries {unprocessed:?}, already paid {already_paid:?}"
    )]
    BatchRejected {
        month: u32,
        year: i32,
        unprocessed: Vec<i64>,
        already_paid: Vec<i64>,
    },

    #[error("Employee not found: {id}")]
    EmployeeNotFound { id: i64 },

    #[error("Cash register not found: {id}")]
    CashRegisterNotFound { id: i64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Storage collaborator failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    pub(crate) fn precondition(key: PeriodKey, message: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            key,
            message: message.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True when the failure came from the storage layer rather than from a rule.
    #[must_use]
    pub const fn is_collaborator_failure(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
