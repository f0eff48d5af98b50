//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Validation`] returned when a record or a setting breaks an invariant.
//! - [`InsufficientData`] returned when the basis month has no income to
//!   allocate.
//! - [`KeyNotFound`] returned when an item is not found.
//! - [`ImportFormat`] returned when an imported payload is not a snapshot.
//!
//! A dangling category reference on an expense is never an error: lookups
//! fall back to the "Other" label instead.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InsufficientData`]: EngineError::InsufficientData
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ImportFormat`]: EngineError::ImportFormat
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid value: {0}")]
    Validation(String),
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("Invalid import: {0}")]
    ImportFormat(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InsufficientData(a), Self::InsufficientData(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidMonth(a), Self::InvalidMonth(b)) => a == b,
            (Self::ImportFormat(a), Self::ImportFormat(b)) => a == b,
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
