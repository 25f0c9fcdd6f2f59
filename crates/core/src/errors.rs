//! Error taxonomy of the NAV engine.
//!
//! Storage layers map their driver errors onto [`DatabaseError`]; everything
//! the engine itself rejects is a validation, allocation or period error.

use thiserror::Error;

use crate::allocation::AllocationError;
use crate::periods::PeriodError;

pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
///
/// Reconciliation mismatches are not errors: they are reported through
/// [`crate::reconciliation::ReconciliationResult`] and only block period close.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage failure: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Allocation rejected: {0}")]
    Allocation(#[from] AllocationError),

    #[error("Period operation rejected: {0}")]
    Period(#[from] PeriodError),
}

impl Error {
    /// True when the error signals a write against a closed period.
    pub fn is_immutability_violation(&self) -> bool {
        matches!(self, Error::Period(PeriodError::Locked { .. }))
    }

    /// True for errors caused by the caller's input rather than by the system.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Allocation(_))
    }
}

/// Storage failures as seen by the engine.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate period for a club-month, or a second close snapshot
    #[error("Duplicate record: {0}")]
    UniqueViolation(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

impl ValidationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ValidationError::InvalidInput(message.into())
    }
}
