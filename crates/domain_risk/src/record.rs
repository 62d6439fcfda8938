//! Portfolio records
//!
//! These are the read-only entities supplied by the data source: one row per
//! customer from each of the customers, vehicles, driving_history and claims
//! tables, all keyed by the same customer identifier. Any attribute may be
//! absent on a row; the flag evaluator treats an absent attribute as "not
//! risky" rather than failing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::CustomerId;
use crate::error::RiskError;

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant, )+
        }

        impl $name {
            /// All values in their natural reporting order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the label used by the source dataset
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = RiskError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|value| value.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| RiskError::unknown_category($kind, s))
            }
        }
    };
}

categorical! {
    /// Customer age band
    AgeBand, "age band" {
        Age16To25 => "16-25",
        Age26To39 => "26-39",
        Age40To64 => "40-64",
        Age65Plus => "65+",
    }
}

categorical! {
    /// Customer income band
    IncomeBand, "income band" {
        Poverty => "poverty",
        WorkingClass => "working class",
        MiddleClass => "middle class",
        UpperClass => "upper class",
    }
}

categorical! {
    /// Years of driving experience, banded
    ExperienceBand, "driving experience" {
        Years0To9 => "0-9y",
        Years10To19 => "10-19y",
        Years20To29 => "20-29y",
        Years30Plus => "30y+",
    }
}

/// A customer row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier
    pub id: CustomerId,
    /// Age band
    pub age_band: Option<AgeBand>,
    /// Income band
    pub income_band: Option<IncomeBand>,
    /// Normalized credit score, expected within 0.0..=1.0
    pub credit_score: Option<f64>,
    /// Gender as recorded by the source
    pub gender: Option<String>,
    /// Postal code
    pub postal_code: Option<String>,
}

impl Customer {
    /// Creates a customer with every attribute absent
    pub fn new(id: CustomerId) -> Self {
        Self {
            id,
            age_band: None,
            income_band: None,
            credit_score: None,
            gender: None,
            postal_code: None,
        }
    }
}

/// A vehicle row, keyed by the owning customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Owning customer
    pub customer_id: CustomerId,
    /// Vehicle type (sedan, sports car, ...)
    pub vehicle_type: Option<String>,
    /// Model year
    pub vehicle_year: Option<i32>,
    /// Annual mileage; negative values are rejected during validation
    pub annual_mileage: Option<i64>,
}

impl Vehicle {
    /// Creates a vehicle row with every attribute absent
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            vehicle_type: None,
            vehicle_year: None,
            annual_mileage: None,
        }
    }
}

/// A driving history row, keyed by the customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivingHistory {
    /// Customer
    pub customer_id: CustomerId,
    /// Driving experience band
    pub driving_experience: Option<ExperienceBand>,
    /// Number of speeding violations
    pub speeding_violations: Option<i32>,
    /// Number of DUI convictions
    pub dui_count: Option<i32>,
}

impl DrivingHistory {
    /// Creates a driving history row with every attribute absent
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            driving_experience: None,
            speeding_violations: None,
            dui_count: None,
        }
    }
}

/// A claims row: whether the customer filed a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Customer
    pub customer_id: CustomerId,
    /// True when a claim was filed
    pub outcome: bool,
}

/// One customer joined with its vehicle, driving history and claim rows
///
/// Vehicle and driving history are left-joined and may be absent; the claim
/// row is inner-joined and always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRecord {
    pub customer: Customer,
    pub vehicle: Option<Vehicle>,
    pub history: Option<DrivingHistory>,
    pub claim: Claim,
}

impl PortfolioRecord {
    /// Creates a record for a customer with no vehicle or history rows
    pub fn new(customer: Customer, outcome: bool) -> Self {
        let claim = Claim {
            customer_id: customer.id,
            outcome,
        };
        Self {
            customer,
            vehicle: None,
            history: None,
            claim,
        }
    }

    /// Attaches the vehicle row
    pub fn with_vehicle(mut self, vehicle: Vehicle) -> Self {
        self.vehicle = Some(vehicle);
        self
    }

    /// Attaches the driving history row
    pub fn with_history(mut self, history: DrivingHistory) -> Self {
        self.history = Some(history);
        self
    }

    /// The customer identifier
    pub fn id(&self) -> CustomerId {
        self.customer.id
    }

    /// The claim outcome
    pub fn outcome(&self) -> bool {
        self.claim.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorical_parsing_is_case_insensitive() {
        assert_eq!("16-25".parse::<AgeBand>().unwrap(), AgeBand::Age16To25);
        assert_eq!("Working Class".parse::<IncomeBand>().unwrap(), IncomeBand::WorkingClass);
        assert_eq!(" 30y+ ".parse::<ExperienceBand>().unwrap(), ExperienceBand::Years30Plus);
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let err = "teenager".parse::<AgeBand>().unwrap_err();
        assert!(err.to_string().contains("age band"));
        assert!(err.to_string().contains("teenager"));
    }

    #[test]
    fn test_band_order_follows_reporting_order() {
        assert!(AgeBand::Age16To25 < AgeBand::Age65Plus);
        assert!(IncomeBand::Poverty < IncomeBand::UpperClass);
        assert_eq!(ExperienceBand::ALL.len(), 4);
    }

    #[test]
    fn test_bands_serialize_with_dataset_labels() {
        assert_eq!(serde_json::to_string(&AgeBand::Age65Plus).unwrap(), "\"65+\"");
        assert_eq!(serde_json::to_string(&IncomeBand::MiddleClass).unwrap(), "\"middle class\"");
    }

    #[test]
    fn test_record_builder_keeps_claim_keyed_to_customer() {
        let record = PortfolioRecord::new(Customer::new(CustomerId::new(7)), true);
        assert_eq!(record.claim.customer_id, CustomerId::new(7));
        assert!(record.outcome());
        assert!(record.vehicle.is_none());
    }
}
