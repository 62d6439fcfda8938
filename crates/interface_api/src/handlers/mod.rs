//! Request handlers

pub mod aggregation;
pub mod health;
pub mod reports;
pub mod risk;
pub mod segments;
