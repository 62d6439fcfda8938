//! Core Kernel - Foundational types for the risk analytics system
//!
//! This crate provides the building blocks shared by the domain, database and
//! API layers:
//! - Customer identifiers
//! - Rate, share and average arithmetic with report-wide rounding
//! - Port infrastructure (errors, health checks) for data source adapters

pub mod identifiers;
pub mod rate;
pub mod ports;
pub mod error;

pub use identifiers::CustomerId;
pub use rate::{round_half_away, ratio, percentage, average};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
