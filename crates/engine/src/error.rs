//! The module contains the errors the engine can throw.
//!
//! The reservation path distinguishes:
//!
//! - [`CarUnavailable`] when the car is already rented.
//! - [`InsufficientBalance`] when the user cannot pay for the rental.
//! - [`InvalidDateRange`] when the rental does not end after it starts.
//! - [`Conflict`] when a concurrent write won the race on the same row.
//!
//! Malformed names, emails and passwords are [`InvalidInput`]; money values
//! out of range are [`InvalidAmount`].
//!
//!  [`CarUnavailable`]: EngineError::CarUnavailable
//!  [`InsufficientBalance`]: EngineError::InsufficientBalance
//!  [`InvalidDateRange`]: EngineError::InvalidDateRange
//!  [`Conflict`]: EngineError::Conflict
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`InvalidAmount`]: EngineError::InvalidAmount
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
    #[error("Car unavailable: {0}")]
    CarUnavailable(String),
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for failures that may succeed when the whole unit of
    /// work is replayed.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidDateRange(a), Self::InvalidDateRange(b)) => a == b,
            (Self::CarUnavailable(a), Self::CarUnavailable(b)) => a == b,
            (Self::InsufficientBalance(a), Self::InsufficientBalance(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Config(a), Self::Config(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
