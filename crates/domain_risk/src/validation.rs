//! Record validation and data quality reporting
//!
//! Two kinds of problems are tracked:
//!
//! - a missing attribute lowers the flag that needs it; the record is still
//!   scored and aggregated
//! - an out-of-range value, a mis-keyed join or a duplicate customer
//!   excludes the record from aggregation
//!
//! Neither is fatal. Every issue is counted in a [`DataQualityReport`] so a
//! report always says how many rows it did not use.

use serde::Serialize;
use thiserror::Error;

use core_kernel::CustomerId;
use crate::record::PortfolioRecord;

/// A problem found on one portfolio record
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityIssue {
    /// An attribute a flag depends on is absent
    #[error("Customer {customer_id} is missing {field}")]
    MissingAttribute {
        customer_id: CustomerId,
        field: &'static str,
    },

    /// A value lies outside its valid range
    #[error("Customer {customer_id} has {field} out of range: {value}")]
    InvalidRange {
        customer_id: CustomerId,
        field: &'static str,
        value: String,
    },

    /// A joined row carries a different customer key
    #[error("Customer {customer_id} joined to {table} row keyed {found}")]
    MismatchedKey {
        customer_id: CustomerId,
        table: &'static str,
        found: CustomerId,
    },

    /// The customer appeared earlier in the same input
    #[error("Customer {customer_id} appears more than once")]
    DuplicateCustomer { customer_id: CustomerId },
}

impl DataQualityIssue {
    /// Returns true when the record carrying this issue must not be aggregated
    pub fn excludes_record(&self) -> bool {
        !matches!(self, DataQualityIssue::MissingAttribute { .. })
    }

    pub fn customer_id(&self) -> CustomerId {
        match self {
            DataQualityIssue::MissingAttribute { customer_id, .. }
            | DataQualityIssue::InvalidRange { customer_id, .. }
            | DataQualityIssue::MismatchedKey { customer_id, .. }
            | DataQualityIssue::DuplicateCustomer { customer_id } => *customer_id,
        }
    }
}

/// Counts of what happened to the input of one scoring pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataQualityReport {
    /// Records scored and available for aggregation
    pub scored: u64,
    /// Records excluded from aggregation
    pub excluded: u64,
    /// Missing attributes across scored records
    pub missing_attributes: u64,
    /// Every issue found, in input order
    pub issues: Vec<DataQualityIssue>,
}

impl DataQualityReport {
    /// Records one record's issues
    pub fn record(&mut self, issues: Vec<DataQualityIssue>) {
        if issues.iter().any(DataQualityIssue::excludes_record) {
            self.excluded += 1;
        } else {
            self.scored += 1;
            self.missing_attributes += issues.len() as u64;
        }
        self.issues.extend(issues);
    }

    /// Returns true when every input record was used with all attributes present
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Inspects one record for missing attributes, bad ranges and mis-keyed joins
pub fn inspect_record(record: &PortfolioRecord) -> Vec<DataQualityIssue> {
    let id = record.customer.id;
    let mut issues = Vec::new();

    let missing = |field: &'static str| DataQualityIssue::MissingAttribute {
        customer_id: id,
        field,
    };
    let out_of_range = |field: &'static str, value: String| DataQualityIssue::InvalidRange {
        customer_id: id,
        field,
        value,
    };

    if record.claim.customer_id != id {
        issues.push(DataQualityIssue::MismatchedKey {
            customer_id: id,
            table: "claims",
            found: record.claim.customer_id,
        });
    }

    match record.customer.credit_score {
        None => issues.push(missing("credit_score")),
        Some(score) if !score.is_finite() || !(0.0..=1.0).contains(&score) => {
            issues.push(out_of_range("credit_score", score.to_string()))
        }
        Some(_) => {}
    }
    if record.customer.age_band.is_none() {
        issues.push(missing("age_band"));
    }

    match &record.vehicle {
        None => {
            issues.push(missing("vehicle_year"));
            issues.push(missing("annual_mileage"));
        }
        Some(vehicle) => {
            if vehicle.customer_id != id {
                issues.push(DataQualityIssue::MismatchedKey {
                    customer_id: id,
                    table: "vehicles",
                    found: vehicle.customer_id,
                });
            }
            if vehicle.vehicle_year.is_none() {
                issues.push(missing("vehicle_year"));
            }
            match vehicle.annual_mileage {
                None => issues.push(missing("annual_mileage")),
                Some(mileage) if mileage < 0 => {
                    issues.push(out_of_range("annual_mileage", mileage.to_string()))
                }
                Some(_) => {}
            }
        }
    }

    match &record.history {
        None => {
            issues.push(missing("driving_experience"));
            issues.push(missing("speeding_violations"));
            issues.push(missing("dui_count"));
        }
        Some(history) => {
            if history.customer_id != id {
                issues.push(DataQualityIssue::MismatchedKey {
                    customer_id: id,
                    table: "driving_history",
                    found: history.customer_id,
                });
            }
            if history.driving_experience.is_none() {
                issues.push(missing("driving_experience"));
            }
            match history.speeding_violations {
                None => issues.push(missing("speeding_violations")),
                Some(count) if count < 0 => {
                    issues.push(out_of_range("speeding_violations", count.to_string()))
                }
                Some(_) => {}
            }
            match history.dui_count {
                None => issues.push(missing("dui_count")),
                Some(count) if count < 0 => {
                    issues.push(out_of_range("dui_count", count.to_string()))
                }
                Some(_) => {}
            }
        }
    }

    issues
}
