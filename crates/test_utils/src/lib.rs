//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! risk analytics test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built portfolio records with known scores
//! - `builders`: Builder for portfolio records
//! - `database`: PostgreSQL test container with the portfolio tables
//! - `assertions`: Assertion helpers for rates and aggregation output
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
