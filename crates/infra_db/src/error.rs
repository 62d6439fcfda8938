//! Database error types
//!
//! This module defines the error types that can occur during database operations
//! and their translation into the port errors the domain layer understands.

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A result row could not be decoded
    #[error("Failed to decode row: {0}")]
    DecodeFailed(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

/// Converts SQLx errors to more specific DatabaseError variants
impl From<&sqlx::Error> for DatabaseError {
    fn from(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) | sqlx::Error::ColumnNotFound(_) => {
                DatabaseError::DecodeFailed(error.to_string())
            }
            sqlx::Error::Database(db_err) => DatabaseError::QueryFailed(db_err.message().to_string()),
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

/// Translates database failures for callers behind the port boundary
///
/// Connection problems stay transient so the API can answer 503 rather
/// than 500.
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        let classified = match error {
            DatabaseError::SqlError(ref inner) => DatabaseError::from(inner),
            other => other,
        };

        match classified {
            DatabaseError::ConnectionFailed(message) => PortError::connection(message),
            DatabaseError::PoolExhausted => PortError::connection("connection pool exhausted"),
            DatabaseError::DecodeFailed(message) => PortError::Transformation { message },
            DatabaseError::QueryFailed(message) => PortError::query(message),
            DatabaseError::SqlError(inner) => PortError::internal(inner.to_string()),
        }
    }
}
