//! Core error types used across the system

use thiserror::Error;

/// Core error type for the kernel
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Value out of range: {field} = {value}")]
    OutOfRange { field: String, value: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn out_of_range(field: impl Into<String>, value: impl std::fmt::Display) -> Self {
        CoreError::OutOfRange {
            field: field.into(),
            value: value.to_string(),
        }
    }
}
