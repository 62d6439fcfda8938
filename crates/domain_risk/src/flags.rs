//! Risk flag evaluation
//!
//! Five independent, equally weighted indicators. Each one reads only the
//! attributes it names, and none of them can see the claim row: the
//! evaluator takes the customer, vehicle and history rows separately, so the
//! outcome a score is later validated against cannot feed into it.
//!
//! | Flag | Raised when |
//! |---|---|
//! | speeding_risk | more than 5 speeding violations |
//! | dui_risk | at least one DUI |
//! | low_credit_risk | credit score below 0.5 |
//! | vehicle_risk | vehicle older than 2015 and over 15,000 miles a year |
//! | young_driver_risk | aged 16-25 with 0-9 years of experience |
//!
//! A missing attribute leaves its flag lowered.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::{AgeBand, Customer, DrivingHistory, ExperienceBand, Vehicle};

pub const MAX_SPEEDING_VIOLATIONS: i32 = 5;
pub const MIN_DUI_COUNT: i32 = 1;
pub const LOW_CREDIT_BELOW: f64 = 0.5;
pub const OLD_VEHICLE_BEFORE_YEAR: i32 = 2015;
pub const HIGH_ANNUAL_MILEAGE_ABOVE: i64 = 15_000;

/// The five risk flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFlag {
    SpeedingRisk,
    DuiRisk,
    LowCreditRisk,
    VehicleRisk,
    YoungDriverRisk,
}

impl RiskFlag {
    /// All flags in reporting order
    pub const ALL: [RiskFlag; 5] = [
        RiskFlag::SpeedingRisk,
        RiskFlag::DuiRisk,
        RiskFlag::LowCreditRisk,
        RiskFlag::VehicleRisk,
        RiskFlag::YoungDriverRisk,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RiskFlag::SpeedingRisk => "speeding_risk",
            RiskFlag::DuiRisk => "dui_risk",
            RiskFlag::LowCreditRisk => "low_credit_risk",
            RiskFlag::VehicleRisk => "vehicle_risk",
            RiskFlag::YoungDriverRisk => "young_driver_risk",
        }
    }
}

impl fmt::Display for RiskFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The evaluated flags for one customer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiskFlags {
    pub speeding_risk: bool,
    pub dui_risk: bool,
    pub low_credit_risk: bool,
    pub vehicle_risk: bool,
    pub young_driver_risk: bool,
}

impl RiskFlags {
    /// Returns whether the given flag is raised
    pub fn is_raised(&self, flag: RiskFlag) -> bool {
        match flag {
            RiskFlag::SpeedingRisk => self.speeding_risk,
            RiskFlag::DuiRisk => self.dui_risk,
            RiskFlag::LowCreditRisk => self.low_credit_risk,
            RiskFlag::VehicleRisk => self.vehicle_risk,
            RiskFlag::YoungDriverRisk => self.young_driver_risk,
        }
    }

    /// Lists the raised flags in reporting order
    pub fn raised(&self) -> Vec<RiskFlag> {
        RiskFlag::ALL
            .iter()
            .copied()
            .filter(|flag| self.is_raised(*flag))
            .collect()
    }

    /// Flags as 0/1 in reporting order
    pub fn as_bits(&self) -> [u8; 5] {
        RiskFlag::ALL.map(|flag| u8::from(self.is_raised(flag)))
    }
}

/// More than five speeding violations
pub fn speeding_risk(history: Option<&DrivingHistory>) -> bool {
    history
        .and_then(|h| h.speeding_violations)
        .is_some_and(|count| count > MAX_SPEEDING_VIOLATIONS)
}

/// At least one DUI
pub fn dui_risk(history: Option<&DrivingHistory>) -> bool {
    history
        .and_then(|h| h.dui_count)
        .is_some_and(|count| count >= MIN_DUI_COUNT)
}

/// Credit score below 0.5
pub fn low_credit_risk(customer: &Customer) -> bool {
    customer
        .credit_score
        .is_some_and(|score| score < LOW_CREDIT_BELOW)
}

/// Pre-2015 vehicle driven more than 15,000 a year
pub fn vehicle_risk(vehicle: Option<&Vehicle>) -> bool {
    let Some(vehicle) = vehicle else {
        return false;
    };
    match (vehicle.vehicle_year, vehicle.annual_mileage) {
        (Some(year), Some(mileage)) => {
            year < OLD_VEHICLE_BEFORE_YEAR && mileage > HIGH_ANNUAL_MILEAGE_ABOVE
        }
        _ => false,
    }
}

/// Aged 16-25 with under ten years of experience
pub fn young_driver_risk(customer: &Customer, history: Option<&DrivingHistory>) -> bool {
    let experience = history.and_then(|h| h.driving_experience);
    customer.age_band == Some(AgeBand::Age16To25) && experience == Some(ExperienceBand::Years0To9)
}

/// Evaluates all five flags for one customer
pub fn evaluate_flags(
    customer: &Customer,
    vehicle: Option<&Vehicle>,
    history: Option<&DrivingHistory>,
) -> RiskFlags {
    RiskFlags {
        speeding_risk: speeding_risk(history),
        dui_risk: dui_risk(history),
        low_credit_risk: low_credit_risk(customer),
        vehicle_risk: vehicle_risk(vehicle),
        young_driver_risk: young_driver_risk(customer, history),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::CustomerId;

    fn history(speeding: Option<i32>, duis: Option<i32>) -> DrivingHistory {
        DrivingHistory {
            customer_id: CustomerId::new(1),
            driving_experience: None,
            speeding_violations: speeding,
            dui_count: duis,
        }
    }

    #[test]
    fn test_speeding_threshold_is_strict() {
        assert!(!speeding_risk(Some(&history(Some(5), None))));
        assert!(speeding_risk(Some(&history(Some(6), None))));
    }

    #[test]
    fn test_single_dui_raises_flag() {
        assert!(!dui_risk(Some(&history(None, Some(0)))));
        assert!(dui_risk(Some(&history(None, Some(1)))));
    }

    #[test]
    fn test_missing_inputs_lower_the_flag() {
        let customer = Customer::new(CustomerId::new(1));
        assert!(!speeding_risk(None));
        assert!(!dui_risk(Some(&history(None, None))));
        assert!(!low_credit_risk(&customer));
        assert!(!vehicle_risk(None));
        assert!(!young_driver_risk(&customer, None));
    }

    #[test]
    fn test_vehicle_risk_needs_both_conditions() {
        let mut vehicle = Vehicle::new(CustomerId::new(1));
        vehicle.vehicle_year = Some(2010);
        vehicle.annual_mileage = Some(15_000);
        assert!(!vehicle_risk(Some(&vehicle)));

        vehicle.annual_mileage = Some(15_001);
        assert!(vehicle_risk(Some(&vehicle)));

        vehicle.vehicle_year = Some(2015);
        assert!(!vehicle_risk(Some(&vehicle)));

        vehicle.vehicle_year = None;
        assert!(!vehicle_risk(Some(&vehicle)));
    }

    #[test]
    fn test_raised_lists_in_reporting_order() {
        let flags = RiskFlags {
            young_driver_risk: true,
            speeding_risk: true,
            ..Default::default()
        };
        assert_eq!(flags.raised(), vec![RiskFlag::SpeedingRisk, RiskFlag::YoungDriverRisk]);
        assert_eq!(flags.as_bits(), [1, 0, 0, 0, 1]);
    }
}
