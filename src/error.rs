//! Error types for mapty.

use thiserror::Error;

/// A form or record value that cannot become a workout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("cadence must be a whole number of steps/min (got {value})")]
    CadenceNotWhole { value: f64 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid workout: {0}")]
    Validation(#[from] ValidationError),

    #[error("workout id already present: {0}")]
    DuplicateId(String),

    #[error("no workout with id {0}")]
    NotFound(String),

    #[error("corrupt persisted record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("could not get your position: {0}")]
    Geolocation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
