//! Risk domain errors
//!
//! Record-level data problems are not errors here: they are collected as
//! [`DataQualityIssue`](crate::validation::DataQualityIssue)s and reported
//! alongside the results. `RiskError` covers requests that cannot be served.

use thiserror::Error;

use core_kernel::{CoreError, PortError};

/// Errors that can occur in the risk domain
#[derive(Debug, Error)]
pub enum RiskError {
    /// A categorical label did not match any known value
    #[error("Unknown {kind}: '{value}'")]
    UnknownCategory { kind: String, value: String },

    /// A segment filter is internally inconsistent
    #[error("Invalid segment filter: {0}")]
    InvalidFilter(String),

    /// A score outside 0..=5 was supplied
    #[error("Risk score {0} is outside 0..=5")]
    ScoreOutOfRange(u8),

    /// The portfolio source failed
    #[error("Portfolio source error: {0}")]
    Source(#[from] PortError),

    /// A kernel-level validation failed
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl RiskError {
    /// Creates an unknown category error
    pub fn unknown_category(kind: impl Into<String>, value: impl Into<String>) -> Self {
        RiskError::UnknownCategory {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Creates an invalid filter error
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        RiskError::InvalidFilter(message.into())
    }
}
